//! Catalog generation from a directory of tile images

use crate::catalog::loader::check_row_path;
use crate::catalog::record::FeatureRecord;
use crate::io::configuration::{ChannelOrder, TILE_EXTENSIONS};
use crate::io::error::{MosaicError, Result};
use crate::io::image::load_rgb;
use crate::mosaic::sampler::GridSampler;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Records produced from a tile directory plus the files that were skipped
#[derive(Debug)]
pub struct CatalogBuild {
    /// One record per decodable tile, ids in file-name order
    pub records: Vec<FeatureRecord>,
    /// Files that could not be decoded, sampled or stored in a catalog row
    pub skipped: Vec<MosaicError>,
}

/// Computes feature vectors for tile images
///
/// Uses the same sampler as composition so that catalog and query vectors
/// share one layout.
#[derive(Debug, Clone, Copy)]
pub struct CatalogBuilder {
    sampler: GridSampler,
}

impl CatalogBuilder {
    /// Builder for vectors of `3 * division^2` values
    pub const fn new(division: u32, channel_order: ChannelOrder) -> Self {
        Self {
            sampler: GridSampler::new(division, channel_order),
        }
    }

    /// Tile images in `dir`, sorted by path
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read
    pub fn collect_tile_paths(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| MosaicError::FileSystem {
            path: dir.to_path_buf(),
            operation: "read tile directory",
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_tile = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    TILE_EXTENSIONS
                        .iter()
                        .any(|known| known.eq_ignore_ascii_case(ext))
                });
            if path.is_file() && is_tile {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Sample every tile; ids follow the order of `paths`, skipping failures
    ///
    /// Paths that a catalog row cannot hold are skipped before decoding, so
    /// every returned record can be written and loaded back.
    pub fn build(&self, paths: &[PathBuf]) -> CatalogBuild {
        let sampled: Vec<(PathBuf, Result<Vec<f64>>)> = paths
            .par_iter()
            .map(|path| {
                let vector = check_row_path(path)
                    .and_then(|()| load_rgb(path))
                    .and_then(|image| self.sampler.sample_image(&image));
                (path.clone(), vector)
            })
            .collect();

        let mut records = Vec::with_capacity(sampled.len());
        let mut skipped = Vec::new();
        for (path, vector) in sampled {
            match vector {
                Ok(vector) => {
                    let id = records.len();
                    records.push(FeatureRecord::new(id, path, vector));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping tile: {e}");
                    skipped.push(e);
                }
            }
        }

        tracing::info!(
            records = records.len(),
            skipped = skipped.len(),
            "catalog generated"
        );
        CatalogBuild { records, skipped }
    }

    /// Collect and sample every tile in `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read
    pub fn build_from_dir(&self, dir: &Path) -> Result<CatalogBuild> {
        let paths = Self::collect_tile_paths(dir)?;
        Ok(self.build(&paths))
    }
}
