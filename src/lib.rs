//! Photomosaic composition from a catalog of color-signed tile images
//!
//! A target image is split into a square grid of cells. Each cell is reduced to
//! a feature vector of per-subcell mean colors, matched against a kd-tree over
//! the catalog's precomputed vectors, and replaced by one of its nearest tiles
//! drawn at random, resampled to the cell size.

#![forbid(unsafe_code)]

/// Tile catalog records, CSV persistence and generation
pub mod catalog;
/// Nearest-neighbor index over feature vectors
pub mod index;
/// Input/output, configuration and error handling
pub mod io;
/// Grid sampling, matching, composition and the run pipeline
pub mod mosaic;

pub use io::error::{MosaicError, Result};
