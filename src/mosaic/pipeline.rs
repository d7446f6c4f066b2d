//! Mosaic run orchestration
//!
//! A run moves through
//! `Uninitialized -> CatalogLoaded -> IndexBuilt -> Composing -> Composed`,
//! or ends in `Failed` on a fatal error. Once an index exists it is released
//! exactly once, whether the run succeeds, fails, or the pipeline is dropped.

use crate::catalog::{Catalog, FeatureRecord};
use crate::index::FeatureIndex;
use crate::io::configuration::{MatchOptions, MosaicConfig};
use crate::io::error::{MosaicError, Result, WithCellContext};
use crate::io::progress::CellProgress;
use crate::mosaic::compositor::{load_tile, place, resample_area};
use crate::mosaic::coverage::CellMask;
use crate::mosaic::grid::{CellRect, MosaicGrid};
use crate::mosaic::matcher::{Matcher, seeded_rng};
use crate::mosaic::sampler::GridSampler;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fmt;
use std::mem::discriminant;

/// Pipeline lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Nothing loaded
    Uninitialized,
    /// Catalog accepted
    CatalogLoaded,
    /// Index built and queryable
    IndexBuilt,
    /// Placing the cell with this row-major index
    Composing {
        /// Row-major cell index
        cell: usize,
    },
    /// Every cell processed
    Composed,
    /// Index storage freed
    Released,
    /// Fatal error, with its message
    Failed(String),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::CatalogLoaded => write!(f, "CatalogLoaded"),
            Self::IndexBuilt => write!(f, "IndexBuilt"),
            Self::Composing { cell } => write!(f, "Composing({cell})"),
            Self::Composed => write!(f, "Composed"),
            Self::Released => write!(f, "Released"),
            Self::Failed(reason) => write!(f, "Failed({reason})"),
        }
    }
}

/// Recoverable problem reported for one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWarning {
    /// Grid coordinates `[col, row]`
    pub cell: [usize; 2],
    /// Description of the problem
    pub message: String,
}

/// Result of a successful composition
#[derive(Debug, Clone)]
pub struct Composition {
    /// Composed image
    pub canvas: RgbImage,
    /// Grid the canvas was composed on
    pub grid: MosaicGrid,
    /// Cells that received a tile
    pub filled: CellMask,
    /// Recoverable problems, in row-major cell order
    pub warnings: Vec<CellWarning>,
}

// Outcome of the per-cell work done before touching the canvas
struct CellWork {
    cell: CellRect,
    tile: Option<RgbImage>,
    failures: Vec<MosaicError>,
}

/// Drives one mosaic run from catalog to composed canvas
pub struct MosaicPipeline {
    config: MosaicConfig,
    options: MatchOptions,
    stage: Stage,
    history: Vec<Stage>,
    catalog: Option<Catalog>,
    index: Option<FeatureIndex>,
    rng: StdRng,
    progress: CellProgress,
}

impl MosaicPipeline {
    /// Create an uninitialized pipeline
    ///
    /// The run generator is seeded here, once, from `options.seed` or OS
    /// entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or options are invalid
    pub fn new(config: MosaicConfig, options: MatchOptions) -> Result<Self> {
        config.validate()?;
        options.validate()?;
        Ok(Self {
            config,
            options,
            stage: Stage::Uninitialized,
            history: vec![Stage::Uninitialized],
            catalog: None,
            index: None,
            rng: seeded_rng(options.seed),
            progress: CellProgress::hidden(),
        })
    }

    /// Report composition progress on `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: CellProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Current stage
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Stages visited so far; consecutive `Composing` steps appear once
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Terminal outcome once reached: `Composed` or `Failed`
    pub fn outcome(&self) -> Option<&Stage> {
        self.history
            .iter()
            .rev()
            .find(|stage| matches!(stage, Stage::Composed | Stage::Failed(_)))
    }

    /// Loaded catalog
    pub const fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// Built index, until released
    pub const fn index(&self) -> Option<&FeatureIndex> {
        self.index.as_ref()
    }

    /// Run geometry
    pub const fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Accept the catalog for this run
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the catalog dimension differs from the
    /// configured `3 * gridDivision^2`, or `InvalidState` if a catalog was
    /// already loaded
    pub fn load_catalog(&mut self, catalog: Catalog) -> Result<()> {
        self.expect_stage(&Stage::Uninitialized, "load a catalog")?;
        let expected = self.config.dimension();
        if catalog.dimension() != expected {
            return Err(self.fail(MosaicError::DimensionMismatch {
                expected,
                actual: catalog.dimension(),
            }));
        }
        if catalog.is_empty() {
            return Err(self.fail(MosaicError::EmptyCatalog));
        }
        self.catalog = Some(catalog);
        self.transition(Stage::CatalogLoaded);
        Ok(())
    }

    /// Pick a catalog tile uniformly at random, using the run generator
    ///
    /// Used as the target image when none is supplied.
    pub fn random_record(&mut self) -> Option<&FeatureRecord> {
        let catalog = self.catalog.as_ref()?;
        catalog.random_record(&mut self.rng)
    }

    /// Build the feature index over the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` before a catalog is loaded, or the build error
    /// (`CapacityExceeded`, `DimensionMismatch`, `EmptyCatalog`)
    pub fn build_index(&mut self) -> Result<()> {
        self.expect_stage(&Stage::CatalogLoaded, "build the index")?;
        let built = match &self.catalog {
            Some(catalog) => FeatureIndex::build(
                catalog.records(),
                self.config.dimension(),
                self.options.capacity,
            ),
            None => Err(MosaicError::EmptyCatalog),
        };
        match built {
            Ok(index) => {
                tracing::info!(records = index.len(), "feature index ready");
                self.index = Some(index);
                self.transition(Stage::IndexBuilt);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Compose the mosaic for `target`
    ///
    /// The target is resampled to the configured window when its size
    /// differs. Cells whose tiles cannot be decoded fall back to the next
    /// candidate in their neighbor pool and stay blank if none decodes; those
    /// cases are logged and returned as warnings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the index is built, or any fatal
    /// sampling or matching error. No canvas is produced on error.
    pub fn compose(&mut self, target: &RgbImage) -> Result<Composition> {
        self.expect_stage(&Stage::IndexBuilt, "compose")?;
        match self.compose_cells(target) {
            Ok(composition) => {
                self.transition(Stage::Composed);
                tracing::info!(
                    cells = composition.filled.len(),
                    filled = composition.filled.filled_count(),
                    warnings = composition.warnings.len(),
                    "mosaic composed"
                );
                Ok(composition)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Free the index; returns `true` the first time storage is released
    pub fn release(&mut self) -> bool {
        match self.index.take() {
            Some(mut index) => {
                index.release();
                self.transition(Stage::Released);
                true
            }
            None => false,
        }
    }

    /// Load, build, compose and release in one call
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; the index is released either way
    pub fn run(&mut self, catalog: Catalog, target: &RgbImage) -> Result<Composition> {
        let result = self
            .load_catalog(catalog)
            .and_then(|()| self.build_index())
            .and_then(|()| self.compose(target));
        self.release();
        result
    }

    fn compose_cells(&mut self, target: &RgbImage) -> Result<Composition> {
        let grid = MosaicGrid::from_config(&self.config);
        let sampler = GridSampler::new(self.config.grid_division, self.options.channel_order);
        let matcher = Matcher::from_options(&self.options)?;
        let target = fit_target(target, &self.config);

        let index = self.index.as_ref().ok_or(MosaicError::IndexNotBuilt)?;
        let catalog = self.catalog.as_ref().ok_or(MosaicError::EmptyCatalog)?;
        let cells: Vec<CellRect> = grid.cells().collect();
        let progress = &self.progress;
        progress.start(cells.len(), "composing");

        let context = CellContext {
            target: target.as_ref(),
            sampler: &sampler,
            matcher: &matcher,
            index,
            catalog,
            progress,
        };

        // Seeds are drawn row-major before any work starts, so the choice made
        // for a cell does not depend on scheduling or on the parallel setting
        let seeds: Vec<u64> = cells.iter().map(|_| self.rng.random()).collect();
        let process = |(cell, &seed): (&CellRect, &u64)| {
            context.process(cell, &mut StdRng::seed_from_u64(seed))
        };
        let work: Vec<Result<CellWork>> = if self.options.parallel {
            cells.par_iter().zip(seeds.par_iter()).map(process).collect()
        } else {
            cells.iter().zip(seeds.iter()).map(process).collect()
        };
        progress.finish();

        let work = work.into_iter().collect::<Result<Vec<_>>>()?;

        let (width, height) = grid.canvas_size();
        let mut canvas = RgbImage::new(width, height);
        let columns = grid.grid_count() as usize;
        let mut filled = CellMask::new(columns, columns);
        let mut warnings = Vec::new();

        for (position, item) in work.into_iter().enumerate() {
            self.transition(Stage::Composing { cell: position });
            let coordinates = item.cell.coordinates();

            for failure in &item.failures {
                tracing::warn!(
                    col = coordinates[0],
                    row = coordinates[1],
                    "{failure}"
                );
                warnings.push(CellWarning {
                    cell: coordinates,
                    message: failure.to_string(),
                });
            }

            match &item.tile {
                Some(tile) => {
                    place(&mut canvas, &item.cell, tile)?;
                    filled.mark(coordinates);
                }
                None => {
                    tracing::warn!(
                        col = coordinates[0],
                        row = coordinates[1],
                        "no candidate tile could be loaded, cell left blank"
                    );
                    warnings.push(CellWarning {
                        cell: coordinates,
                        message: "cell left blank".to_string(),
                    });
                }
            }
        }

        Ok(Composition {
            canvas,
            grid,
            filled,
            warnings,
        })
    }

    fn expect_stage(&self, expected: &Stage, operation: &'static str) -> Result<()> {
        if &self.stage == expected {
            Ok(())
        } else {
            Err(MosaicError::InvalidState {
                operation,
                stage: self.stage.to_string(),
            })
        }
    }

    fn fail(&mut self, error: MosaicError) -> MosaicError {
        self.transition(Stage::Failed(error.to_string()));
        error
    }

    fn transition(&mut self, next: Stage) {
        if discriminant(&self.stage) != discriminant(&next) {
            self.history.push(next.clone());
        }
        self.stage = next;
    }
}

impl Drop for MosaicPipeline {
    fn drop(&mut self) {
        self.release();
    }
}

// Shared read-only state for processing cells on any thread
struct CellContext<'a> {
    target: &'a RgbImage,
    sampler: &'a GridSampler,
    matcher: &'a Matcher,
    index: &'a FeatureIndex,
    catalog: &'a Catalog,
    progress: &'a CellProgress,
}

impl CellContext<'_> {
    fn process<R: Rng + ?Sized>(&self, cell: &CellRect, rng: &mut R) -> Result<CellWork> {
        let query = self.sampler.sample(self.target, cell)?;
        let selection = self.matcher.select(self.index, &query, rng)?;

        let mut failures = Vec::new();
        let mut tile = None;
        for neighbor in selection.fallback_order() {
            let Some(record) = self.catalog.get(neighbor.slot) else {
                continue;
            };
            match load_tile(record).with_cell(cell.coordinates()) {
                Ok(image) => {
                    tile = Some(resample_area(&image, cell.width, cell.height));
                    break;
                }
                Err(e) if e.is_recoverable() => failures.push(e),
                Err(e) => return Err(e),
            }
        }

        self.progress.cell_done();
        Ok(CellWork {
            cell: *cell,
            tile,
            failures,
        })
    }
}

/// Resample the target to the configured window size if it differs
pub fn fit_target<'a>(target: &'a RgbImage, config: &MosaicConfig) -> Cow<'a, RgbImage> {
    let window = (config.window_width, config.window_height);
    if target.dimensions() == window {
        Cow::Borrowed(target)
    } else {
        tracing::debug!(
            from_width = target.width(),
            from_height = target.height(),
            to_width = window.0,
            to_height = window.1,
            "resampling target to window"
        );
        Cow::Owned(resample_area(target, window.0, window.1))
    }
}
