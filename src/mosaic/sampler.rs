//! Per-cell color signatures
//!
//! A cell is divided into `division x division` subcells in row-major order
//! and each subcell contributes the mean of its three channels. Subcell sides
//! are the integer quotients `width / division` and `height / division`;
//! pixels left over at the trailing edges are not sampled. Catalog vectors are
//! produced by the same routine, so the component layout always agrees.

use crate::io::configuration::{COLOR_CHANNELS, ChannelOrder};
use crate::io::error::{Result, invalid_parameter};
use crate::mosaic::grid::CellRect;
use image::RgbImage;

/// Computes query vectors from image regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSampler {
    division: u32,
    channel_order: ChannelOrder,
}

impl GridSampler {
    /// Sampler producing `3 * division^2` values per cell
    pub const fn new(division: u32, channel_order: ChannelOrder) -> Self {
        Self {
            division,
            channel_order,
        }
    }

    /// Subcells per cell side
    pub const fn division(&self) -> u32 {
        self.division
    }

    /// Length of each produced vector
    pub const fn dimension(&self) -> usize {
        COLOR_CHANNELS * (self.division as usize) * (self.division as usize)
    }

    /// Feature vector of one cell of `image`
    ///
    /// # Errors
    ///
    /// Returns an error if the division is zero, the cell is too small to hold
    /// one pixel per subcell, or the cell extends past the image
    pub fn sample(&self, image: &RgbImage, cell: &CellRect) -> Result<Vec<f64>> {
        if self.division == 0 {
            return Err(invalid_parameter(
                "gridDivision",
                &self.division,
                &"must be positive",
            ));
        }
        if !cell.fits_within(image.width(), image.height()) {
            return Err(invalid_parameter(
                "cell",
                &format!("{}x{}+{}+{}", cell.width, cell.height, cell.x, cell.y),
                &format!("outside {}x{} image", image.width(), image.height()),
            ));
        }

        let sub_width = cell.width / self.division;
        let sub_height = cell.height / self.division;
        if sub_width == 0 || sub_height == 0 {
            return Err(invalid_parameter(
                "gridDivision",
                &self.division,
                &format!("{}x{} cell has empty subcells", cell.width, cell.height),
            ));
        }

        let mut vector = Vec::with_capacity(self.dimension());
        for sub_row in 0..self.division {
            for sub_col in 0..self.division {
                let subcell = CellRect::from_bounds(
                    cell.x + sub_col * sub_width,
                    cell.y + sub_row * sub_height,
                    sub_width,
                    sub_height,
                );
                let means = channel_means(image, &subcell);
                for slot in 0..COLOR_CHANNELS {
                    let channel = self.channel_order.source_channel(slot);
                    vector.push(means.get(channel).copied().unwrap_or(0.0));
                }
            }
        }

        Ok(vector)
    }

    /// Feature vector of a whole image, treated as a single cell
    ///
    /// # Errors
    ///
    /// Returns an error if the image is smaller than the division
    pub fn sample_image(&self, image: &RgbImage) -> Result<Vec<f64>> {
        self.sample(
            image,
            &CellRect::from_bounds(0, 0, image.width(), image.height()),
        )
    }
}

// Caller guarantees the rectangle is inside the image and non-empty
fn channel_means(image: &RgbImage, rect: &CellRect) -> [f64; COLOR_CHANNELS] {
    let mut sums = [0.0_f64; COLOR_CHANNELS];
    let mut count = 0_u64;

    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            if let Some(pixel) = image.get_pixel_checked(x, y) {
                for (sum, &value) in sums.iter_mut().zip(pixel.0.iter()) {
                    *sum += f64::from(value);
                }
                count += 1;
            }
        }
    }

    if count == 0 {
        return sums;
    }
    let count = count as f64;
    sums.map(|sum| sum / count)
}
