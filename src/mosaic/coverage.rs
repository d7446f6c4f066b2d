use bitvec::prelude::*;

/// Tracks which grid cells received a tile
///
/// Cells stay unset when every candidate tile failed to decode, leaving the
/// canvas blank there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellMask {
    bits: BitVec,
    columns: usize,
}

impl CellMask {
    /// Mask with every cell unset
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            bits: bitvec![0; columns * rows],
            columns,
        }
    }

    /// Mark the cell at `[col, row]` as filled
    pub fn mark(&mut self, [col, row]: [usize; 2]) {
        if col < self.columns {
            let index = row * self.columns + col;
            if index < self.bits.len() {
                self.bits.set(index, true);
            }
        }
    }

    /// Whether the cell at `[col, row]` was filled
    pub fn is_filled(&self, [col, row]: [usize; 2]) -> bool {
        col < self.columns
            && self
                .bits
                .get(row * self.columns + col)
                .is_some_and(|bit| *bit)
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the mask covers no cells
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether every cell was filled
    pub fn is_complete(&self) -> bool {
        self.bits.all()
    }

    /// Coordinates of unfilled cells in row-major order
    pub fn blank_cells(&self) -> Vec<[usize; 2]> {
        if self.columns == 0 {
            return Vec::new();
        }
        self.bits
            .iter_zeros()
            .map(|index| [index % self.columns, index / self.columns])
            .collect()
    }
}
