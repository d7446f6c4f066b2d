//! Cell geometry of the mosaic grid

use crate::io::configuration::MosaicConfig;

/// Pixel rectangle of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    /// Grid column
    pub col: u32,
    /// Grid row
    pub row: u32,
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl CellRect {
    /// Rectangle at an arbitrary pixel position, outside any grid
    pub const fn from_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            col: 0,
            row: 0,
            x,
            y,
            width,
            height,
        }
    }

    /// Grid coordinates as `[col, row]`, the form used in diagnostics
    pub const fn coordinates(&self) -> [usize; 2] {
        [self.col as usize, self.row as usize]
    }

    /// Exclusive right edge
    pub const fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Whether the pixel lies inside the rectangle
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && (x as u64) < self.right() && y >= self.y && (y as u64) < self.bottom()
    }

    /// Whether the rectangle lies entirely inside a `width x height` image
    pub const fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Whether two rectangles share any pixel
    pub const fn overlaps(&self, other: &Self) -> bool {
        (self.x as u64) < other.right()
            && (other.x as u64) < self.right()
            && (self.y as u64) < other.bottom()
            && (other.y as u64) < self.bottom()
    }
}

/// Square `grid_count x grid_count` partition of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicGrid {
    grid_count: u32,
    cell_width: u32,
    cell_height: u32,
}

impl MosaicGrid {
    /// Grid described by a validated configuration
    pub const fn from_config(config: &MosaicConfig) -> Self {
        Self {
            grid_count: config.grid_count(),
            cell_width: config.grid_width,
            cell_height: config.grid_height,
        }
    }

    /// Cells per side
    pub const fn grid_count(&self) -> u32 {
        self.grid_count
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        (self.grid_count as usize) * (self.grid_count as usize)
    }

    /// Canvas covered by the grid (width, height)
    pub const fn canvas_size(&self) -> (u32, u32) {
        (
            self.grid_count * self.cell_width,
            self.grid_count * self.cell_height,
        )
    }

    /// Cell at grid coordinates
    pub const fn cell_at(&self, col: u32, row: u32) -> Option<CellRect> {
        if col >= self.grid_count || row >= self.grid_count {
            return None;
        }
        Some(CellRect {
            col,
            row,
            x: col * self.cell_width,
            y: row * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        })
    }

    /// Cell by row-major index
    pub const fn cell(&self, index: usize) -> Option<CellRect> {
        if self.grid_count == 0 {
            return None;
        }
        let count = self.grid_count as usize;
        self.cell_at((index % count) as u32, (index / count) as u32)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellRect> {
        let grid = *self;
        (0..grid.cell_count()).filter_map(move |index| grid.cell(index))
    }
}
