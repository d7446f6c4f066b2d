//! Tile resampling and placement on the canvas

use crate::catalog::FeatureRecord;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::mosaic::grid::CellRect;
use image::{Rgb, RgbImage, imageops};
use std::borrow::Cow;

/// Source pixels and their coverage weights for one destination pixel
type AxisWeights = Vec<Vec<(u32, f64)>>;

/// Decode the tile image referenced by a catalog record
///
/// # Errors
///
/// Returns `TileLoad` if the image cannot be opened or decoded
pub fn load_tile(record: &FeatureRecord) -> Result<RgbImage> {
    image::open(record.path())
        .map(|img| img.to_rgb8())
        .map_err(|e| MosaicError::TileLoad {
            id: record.id,
            path: record.source_path.clone(),
            cell: None,
            source: e,
        })
}

/// Resample with area averaging
///
/// Each destination pixel is the mean of the source area it covers, with
/// partially covered source pixels weighted by their covered fraction. This
/// avoids aliasing when shrinking; when enlarging it degrades to
/// nearest-pixel sampling with blended seams.
pub fn resample_area(source: &RgbImage, width: u32, height: u32) -> RgbImage {
    if source.dimensions() == (width, height) {
        return source.clone();
    }
    let mut output = RgbImage::new(width, height);
    if source.width() == 0 || source.height() == 0 {
        return output;
    }

    let columns = axis_weights(source.width(), width);
    let rows = axis_weights(source.height(), height);

    for (y, row_weights) in rows.iter().enumerate() {
        for (x, column_weights) in columns.iter().enumerate() {
            let mut sums = [0.0_f64; 3];
            for &(sy, wy) in row_weights {
                for &(sx, wx) in column_weights {
                    if let Some(pixel) = source.get_pixel_checked(sx, sy) {
                        let weight = wx * wy;
                        for (sum, &value) in sums.iter_mut().zip(pixel.0.iter()) {
                            *sum = f64::from(value).mul_add(weight, *sum);
                        }
                    }
                }
            }
            let pixel = Rgb(sums.map(|sum| sum.round().clamp(0.0, 255.0) as u8));
            output.put_pixel(x as u32, y as u32, pixel);
        }
    }

    output
}

// Coverage of each source pixel by each destination pixel along one axis,
// normalized so every destination pixel's weights sum to one
fn axis_weights(source_len: u32, target_len: u32) -> AxisWeights {
    let scale = f64::from(source_len) / f64::from(target_len);
    (0..target_len)
        .map(|target| {
            let start = f64::from(target) * scale;
            let end = start + scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(source_len);

            let mut weights: Vec<(u32, f64)> = (first..last)
                .filter_map(|src| {
                    let covered = end.min(f64::from(src) + 1.0) - start.max(f64::from(src));
                    (covered > 0.0).then_some((src, covered))
                })
                .collect();

            let total: f64 = weights.iter().map(|&(_, w)| w).sum();
            if total > 0.0 {
                for (_, weight) in &mut weights {
                    *weight /= total;
                }
            }
            weights
        })
        .collect()
}

/// Overwrite `cell` on `canvas` with `tile` resampled to the cell size
///
/// Pixels outside the cell are left untouched. A tile already at cell size is
/// copied as is.
///
/// # Errors
///
/// Returns `InvalidParameter` if the cell extends past the canvas
pub fn place(canvas: &mut RgbImage, cell: &CellRect, tile: &RgbImage) -> Result<()> {
    if !cell.fits_within(canvas.width(), canvas.height()) {
        return Err(invalid_parameter(
            "cell",
            &format!("({}, {})", cell.col, cell.row),
            &format!(
                "{}x{}+{}+{} exceeds {}x{} canvas",
                cell.width,
                cell.height,
                cell.x,
                cell.y,
                canvas.width(),
                canvas.height()
            ),
        ));
    }

    let fitted = if tile.dimensions() == (cell.width, cell.height) {
        Cow::Borrowed(tile)
    } else {
        Cow::Owned(resample_area(tile, cell.width, cell.height))
    };
    imageops::replace(canvas, fitted.as_ref(), i64::from(cell.x), i64::from(cell.y));
    Ok(())
}
