//! Command-line interface for composing mosaics and generating catalogs

use crate::catalog::builder::CatalogBuilder;
use crate::catalog::loader::{load_catalog, write_catalog};
use crate::io::configuration::{
    ChannelOrder, DEFAULT_CAPACITY, DEFAULT_CATALOG_PATH, DEFAULT_CONFIG_PATH, DEFAULT_EPS,
    DEFAULT_NEIGHBORS, DEFAULT_OUTPUT_PATH, MatchOptions, MosaicConfig, PartialConfig,
};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::io::image::{load_rgb, save_png};
use crate::io::progress::CellProgress;
use crate::mosaic::pipeline::{Composition, MosaicPipeline};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "tilemosaic")]
#[command(
    author,
    version,
    about = "Rebuild an image as a mosaic of catalog tiles"
)]
/// Command-line arguments for the mosaic tool
pub struct Cli {
    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and all messages except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose a mosaic from a catalog
    Compose(ComposeArgs),
    /// Generate a catalog CSV from a directory of tile images
    Catalog(CatalogArgs),
}

/// Geometry overrides shared by both subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GeometryArgs {
    /// INI file with a [mosaic] section (default: mosaicData.ini if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target window width in pixels
    #[arg(long)]
    pub window_width: Option<u32>,

    /// Target window height in pixels
    #[arg(long)]
    pub window_height: Option<u32>,

    /// Cell width in pixels
    #[arg(long)]
    pub grid_width: Option<u32>,

    /// Cell height in pixels
    #[arg(long)]
    pub grid_height: Option<u32>,

    /// Subcells per cell side
    #[arg(short = 'd', long)]
    pub grid_division: Option<u32>,

    /// Channel order of catalog feature vectors
    #[arg(long, value_enum, default_value_t = ChannelOrder::Rgb)]
    pub channel_order: ChannelOrder,
}

impl GeometryArgs {
    /// Configuration file values overlaid with command-line values
    ///
    /// A missing default file is treated as empty; a missing file named with
    /// `--config` is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn partial_config(&self) -> Result<PartialConfig> {
        let from_file = match &self.config {
            Some(path) => PartialConfig::from_ini_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    PartialConfig::from_ini_file(default_path)?
                } else {
                    PartialConfig::default()
                }
            }
        };

        Ok(from_file.overlay(PartialConfig {
            window_width: self.window_width,
            window_height: self.window_height,
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            grid_division: self.grid_division,
        }))
    }
}

/// Arguments for `compose`
#[derive(Args, Debug, Clone)]
pub struct ComposeArgs {
    /// Geometry and configuration file
    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Catalog CSV (`id,path,v1,...,vD`)
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    pub catalog: PathBuf,

    /// Target image; a random catalog tile when omitted
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Neighbor pool size for randomized tile selection
    #[arg(short = 'k', long, default_value_t = DEFAULT_NEIGHBORS)]
    pub neighbors: usize,

    /// Approximation bound for nearest-neighbor search (0 = exact)
    #[arg(short, long, default_value_t = DEFAULT_EPS)]
    pub eps: f64,

    /// Maximum number of catalog records
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Random seed for reproducible output (OS entropy when omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Worker threads (1 composes sequentially; default uses all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl ComposeArgs {
    /// Matching controls selected on the command line
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            neighbors: self.neighbors,
            eps: self.eps,
            capacity: self.capacity,
            seed: self.seed,
            channel_order: self.geometry.channel_order,
            parallel: self.threads != Some(1),
        }
    }
}

/// Arguments for `catalog`
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Directory of tile images
    #[arg(value_name = "TILES")]
    pub tiles: PathBuf,

    /// Geometry and configuration file (only gridDivision is used)
    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Output catalog CSV
    #[arg(short, long, default_value = DEFAULT_CATALOG_PATH)]
    pub output: PathBuf,
}

/// Run the selected subcommand
///
/// # Errors
///
/// Returns the first fatal error of the subcommand
pub fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Compose(args) => compose(args, cli.quiet).map(|_| ()),
        Command::Catalog(args) => generate_catalog(args),
    }
}

/// Compose a mosaic and save it
///
/// # Errors
///
/// Returns an error if configuration, catalog, target or index building
/// fails, or the output cannot be written. Tiles that fail to decode are
/// logged and do not fail the run.
pub fn compose(args: &ComposeArgs, quiet: bool) -> Result<Composition> {
    let start_time = Instant::now();
    let config: MosaicConfig = args.geometry.partial_config()?.finish()?;
    tracing::info!(
        window_width = config.window_width,
        window_height = config.window_height,
        grid_width = config.grid_width,
        grid_height = config.grid_height,
        grid_division = config.grid_division,
        grid_count = config.grid_count(),
        "configuration"
    );

    let progress = if quiet {
        CellProgress::hidden()
    } else {
        CellProgress::new()
    };
    let mut pipeline = MosaicPipeline::new(config, args.match_options())?.with_progress(progress);

    let catalog = load_catalog(&args.catalog, config.dimension())?;
    pipeline.load_catalog(catalog)?;

    let target_path = match &args.target {
        Some(path) => path.clone(),
        None => {
            let record = pipeline.random_record().ok_or(MosaicError::EmptyCatalog)?;
            tracing::info!("no target given, using catalog tile\n{record}");
            record.source_path.clone()
        }
    };
    let target = load_rgb(&target_path)?;

    pipeline.build_index()?;
    let composition = match args.threads.filter(|&n| n > 1) {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| invalid_parameter("threads", &threads, &e))?;
            pool.install(|| pipeline.compose(&target))
        }
        None => pipeline.compose(&target),
    };
    pipeline.release();
    let composition = composition?;

    save_png(&composition.canvas, &args.output)?;
    tracing::info!(
        elapsed_ms = start_time.elapsed().as_millis(),
        blank_cells = composition.filled.blank_cells().len(),
        "done"
    );
    Ok(composition)
}

/// Generate a catalog CSV from a tile directory
///
/// # Errors
///
/// Returns an error if `gridDivision` is unavailable, the directory cannot be
/// read, no tile could be sampled, or the CSV cannot be written
pub fn generate_catalog(args: &CatalogArgs) -> Result<()> {
    let division = args
        .geometry
        .partial_config()?
        .grid_division
        .ok_or(MosaicError::MissingConfigValue {
            key: "gridDivision",
        })?;
    if division == 0 {
        return Err(invalid_parameter(
            "gridDivision",
            &division,
            &"must be positive",
        ));
    }

    let builder = CatalogBuilder::new(division, args.geometry.channel_order);
    let build = builder.build_from_dir(&args.tiles)?;
    if build.records.is_empty() {
        return Err(MosaicError::EmptyCatalog);
    }

    write_catalog(&args.output, &build.records)?;
    tracing::info!(
        path = %args.output.display(),
        records = build.records.len(),
        skipped = build.skipped.len(),
        "catalog written"
    );
    Ok(())
}
