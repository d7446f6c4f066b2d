//! Runtime configuration, INI loading and default constants

use crate::io::error::{MosaicError, Result, invalid_parameter};
use std::path::Path;

/// Color channels per subcell in a feature vector
pub const COLOR_CHANNELS: usize = 3;

/// Default size of the nearest-neighbor pool used for randomized selection
pub const DEFAULT_NEIGHBORS: usize = 10;
/// Default approximation bound (0 = exact search)
pub const DEFAULT_EPS: f64 = 0.0;
/// Default upper bound on catalog size accepted by the index
pub const DEFAULT_CAPACITY: usize = 1_000_000;

/// Points held by a kd-tree leaf before it is split
pub const KD_BUCKET_SIZE: usize = 8;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed canvas side in pixels
pub const MAX_CANVAS_DIMENSION: u32 = 20_000;

/// Default INI configuration file
pub const DEFAULT_CONFIG_PATH: &str = "mosaicData.ini";
/// INI section holding the mosaic geometry
pub const CONFIG_SECTION: &str = "mosaic";
/// Default catalog CSV
pub const DEFAULT_CATALOG_PATH: &str = "imagedata.csv";
/// Default composed output
pub const DEFAULT_OUTPUT_PATH: &str = "mosaic.png";

/// File extensions picked up when generating a catalog from a directory
pub const TILE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Width of the progress bar in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Channel order used when writing and comparing feature vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChannelOrder {
    /// Red, green, blue
    #[default]
    Rgb,
    /// Blue, green, red (catalogs produced by BGR image tooling)
    Bgr,
}

impl ChannelOrder {
    /// Map an output channel slot to the RGB pixel channel it reads
    pub const fn source_channel(self, slot: usize) -> usize {
        match self {
            Self::Rgb => slot,
            Self::Bgr => COLOR_CHANNELS - 1 - slot,
        }
    }
}

/// Mosaic geometry, fixed for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicConfig {
    /// Width of the target window in pixels
    pub window_width: u32,
    /// Height of the target window in pixels
    pub window_height: u32,
    /// Width of one grid cell in pixels
    pub grid_width: u32,
    /// Height of one grid cell in pixels
    pub grid_height: u32,
    /// Subcells per cell side used for color sampling
    pub grid_division: u32,
}

impl MosaicConfig {
    /// Validate and construct a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any value is zero, the grid does not fit inside the
    /// window, or a cell is too small for the requested division
    pub fn new(
        window_width: u32,
        window_height: u32,
        grid_width: u32,
        grid_height: u32,
        grid_division: u32,
    ) -> Result<Self> {
        let config = Self {
            window_width,
            window_height,
            grid_width,
            grid_height,
            grid_division,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check all geometry invariants
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first violated constraint
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("windowWidth", self.window_width),
            ("windowHeight", self.window_height),
            ("gridWidth", self.grid_width),
            ("gridHeight", self.grid_height),
            ("gridDivision", self.grid_division),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(invalid_parameter(name, &value, &"must be positive"));
            }
        }

        if self.window_width > MAX_CANVAS_DIMENSION || self.window_height > MAX_CANVAS_DIMENSION {
            return Err(invalid_parameter(
                "window",
                &format!("{}x{}", self.window_width, self.window_height),
                &format!("exceeds maximum dimension {MAX_CANVAS_DIMENSION}"),
            ));
        }

        if self.grid_width > self.window_width {
            return Err(invalid_parameter(
                "gridWidth",
                &self.grid_width,
                &format!("larger than windowWidth {}", self.window_width),
            ));
        }

        // Rows reuse the column count, so they must also fit vertically
        let rows_height = u64::from(self.grid_count()) * u64::from(self.grid_height);
        if rows_height > u64::from(self.window_height) {
            return Err(invalid_parameter(
                "gridHeight",
                &self.grid_height,
                &format!(
                    "{} rows need {rows_height}px but windowHeight is {}",
                    self.grid_count(),
                    self.window_height
                ),
            ));
        }

        if self.grid_division > self.grid_width || self.grid_division > self.grid_height {
            return Err(invalid_parameter(
                "gridDivision",
                &self.grid_division,
                &format!(
                    "subcells would be empty in a {}x{} cell",
                    self.grid_width, self.grid_height
                ),
            ));
        }

        Ok(())
    }

    /// Cells per side of the square grid
    pub const fn grid_count(&self) -> u32 {
        self.window_width / self.grid_width
    }

    /// Feature vector length (3 channels per subcell)
    pub const fn dimension(&self) -> usize {
        COLOR_CHANNELS * (self.grid_division as usize) * (self.grid_division as usize)
    }

    /// Size of the composed canvas (width, height)
    pub const fn canvas_size(&self) -> (u32, u32) {
        (
            self.grid_count() * self.grid_width,
            self.grid_count() * self.grid_height,
        )
    }
}

/// Configuration values gathered from a file or the command line
///
/// Layers are merged with [`PartialConfig::overlay`] before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialConfig {
    /// `windowWidth`
    pub window_width: Option<u32>,
    /// `windowHeight`
    pub window_height: Option<u32>,
    /// `gridWidth`
    pub grid_width: Option<u32>,
    /// `gridHeight`
    pub grid_height: Option<u32>,
    /// `gridDivision`
    pub grid_division: Option<u32>,
}

impl PartialConfig {
    /// Read the `[mosaic]` section of an INI file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value is malformed
    pub fn from_ini_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "read configuration",
            source: e,
        })?;
        Self::from_ini_str(&text, path)
    }

    /// Parse INI text; only keys inside the `[mosaic]` section are used
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for lines that are neither sections, comments nor
    /// `key = value` pairs, and for values that are not positive integers
    pub fn from_ini_str(text: &str, path: &Path) -> Result<Self> {
        let mut config = Self::default();
        let mut section = String::new();

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let name = name.strip_suffix(']').ok_or_else(|| MosaicError::ConfigParse {
                    path: path.to_path_buf(),
                    line: line_number,
                    reason: format!("unterminated section header '{line}'"),
                })?;
                name.trim().clone_into(&mut section);
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| MosaicError::ConfigParse {
                path: path.to_path_buf(),
                line: line_number,
                reason: format!("expected 'key = value', found '{line}'"),
            })?;

            if section != CONFIG_SECTION {
                continue;
            }

            let key = key.trim();
            let slot = match key {
                "windowWidth" => &mut config.window_width,
                "windowHeight" => &mut config.window_height,
                "gridWidth" => &mut config.grid_width,
                "gridHeight" => &mut config.grid_height,
                "gridDivision" => &mut config.grid_division,
                _ => {
                    tracing::debug!(key, line = line_number, "ignoring unknown configuration key");
                    continue;
                }
            };

            let value = value.trim();
            let parsed = value
                .parse::<u32>()
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| MosaicError::ConfigParse {
                    path: path.to_path_buf(),
                    line: line_number,
                    reason: format!("'{key}' must be a positive integer, found '{value}'"),
                })?;
            *slot = Some(parsed);
        }

        Ok(config)
    }

    /// Values from `other` take precedence where present
    #[must_use]
    pub fn overlay(self, other: Self) -> Self {
        Self {
            window_width: other.window_width.or(self.window_width),
            window_height: other.window_height.or(self.window_height),
            grid_width: other.grid_width.or(self.grid_width),
            grid_height: other.grid_height.or(self.grid_height),
            grid_division: other.grid_division.or(self.grid_division),
        }
    }

    /// Require every value and validate the resulting geometry
    ///
    /// # Errors
    ///
    /// Returns `MissingConfigValue` for the first absent key, or the
    /// validation error from [`MosaicConfig::new`]
    pub fn finish(self) -> Result<MosaicConfig> {
        let require = |value: Option<u32>, key: &'static str| {
            value.ok_or(MosaicError::MissingConfigValue { key })
        };
        MosaicConfig::new(
            require(self.window_width, "windowWidth")?,
            require(self.window_height, "windowHeight")?,
            require(self.grid_width, "gridWidth")?,
            require(self.grid_height, "gridHeight")?,
            require(self.grid_division, "gridDivision")?,
        )
    }
}

/// Matching and scheduling controls for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Neighbor pool size for randomized selection
    pub neighbors: usize,
    /// Approximation bound for index queries
    pub eps: f64,
    /// Maximum catalog size accepted by the index
    pub capacity: usize,
    /// Fixed seed for reproducible runs; OS entropy when absent
    pub seed: Option<u64>,
    /// Channel order shared by the catalog and the sampler
    pub channel_order: ChannelOrder,
    /// Process cells on the rayon pool
    pub parallel: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            eps: DEFAULT_EPS,
            capacity: DEFAULT_CAPACITY,
            seed: None,
            channel_order: ChannelOrder::Rgb,
            parallel: true,
        }
    }
}

impl MatchOptions {
    /// Validate the numeric controls
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a zero pool size or capacity, or a
    /// negative or non-finite `eps`
    pub fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(invalid_parameter("k", &self.neighbors, &"must be at least 1"));
        }
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(invalid_parameter(
                "eps",
                &self.eps,
                &"must be a finite value >= 0",
            ));
        }
        if self.capacity == 0 {
            return Err(invalid_parameter(
                "capacity",
                &self.capacity,
                &"must be at least 1",
            ));
        }
        Ok(())
    }
}
