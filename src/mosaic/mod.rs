//! Mosaic composition
//!
//! This module contains:
//! - Grid geometry and per-cell color sampling
//! - Randomized nearest-tile matching
//! - Tile resampling and placement
//! - The run pipeline tying them together

/// Tile resampling and canvas placement
pub mod compositor;
/// Filled-cell tracking
pub mod coverage;
/// Cell geometry
pub mod grid;
/// Randomized nearest-tile selection
pub mod matcher;
/// Run orchestration and lifecycle
pub mod pipeline;
/// Per-cell feature vectors
pub mod sampler;

pub use grid::{CellRect, MosaicGrid};
pub use pipeline::{Composition, MosaicPipeline, Stage};
