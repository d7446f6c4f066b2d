//! Error types and cell context for mosaic operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// Target or tile-directory image could not be decoded
    ImageLoad {
        /// Image that was opened
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// A catalog tile image could not be decoded during composition
    ///
    /// Recoverable: the cell falls back to the next candidate or stays blank.
    TileLoad {
        /// Catalog id of the tile
        id: usize,
        /// Path recorded in the catalog
        path: PathBuf,
        /// Grid coordinates (col, row) of the cell being composed, when known
        cell: Option<[usize; 2]>,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Composed canvas could not be written
    ImageExport {
        /// Output path
        path: PathBuf,
        /// Encoder or write error
        source: image::ImageError,
    },

    /// Reading or writing a catalog, configuration file or directory failed
    FileSystem {
        /// File or directory involved
        path: PathBuf,
        /// What was being done, e.g. "read catalog"
        operation: &'static str,
        /// I/O error
        source: std::io::Error,
    },

    /// Geometry, matching option or cell argument out of range
    InvalidParameter {
        /// Parameter or configuration key name
        parameter: &'static str,
        /// Rejected value as text
        value: String,
        /// Constraint that was violated
        reason: String,
    },

    /// A required configuration value was neither in the file nor on the command line
    MissingConfigValue {
        /// Configuration key
        key: &'static str,
    },

    /// Configuration file could not be parsed
    ConfigParse {
        /// Path of the configuration file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Description of the problem
        reason: String,
    },

    /// Catalog row could not be parsed
    CatalogParse {
        /// Path of the catalog file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Description of the problem
        reason: String,
    },

    /// Catalog contains no records
    EmptyCatalog,

    /// Feature vector length differs from the configured dimension
    DimensionMismatch {
        /// Configured dimension (3 * division^2)
        expected: usize,
        /// Length actually found
        actual: usize,
    },

    /// Catalog holds more records than the index capacity allows
    CapacityExceeded {
        /// Number of records offered
        count: usize,
        /// Configured capacity bound
        capacity: usize,
    },

    /// Query issued against an index whose storage was released
    IndexNotBuilt,

    /// Nearest-neighbor query produced no candidates
    EmptyResultSet,

    /// Pipeline operation invoked out of order
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// Stage the pipeline was in
        stage: String,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::TileLoad {
                id,
                path,
                cell,
                source,
            } => {
                write!(f, "TileLoadError: tile {id} '{}'", path.display())?;
                if let Some([col, row]) = cell {
                    write!(f, " at cell ({col}, {row})")?;
                }
                write!(f, ": {source}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::MissingConfigValue { key } => {
                write!(f, "Missing configuration value '{key}'")
            }
            Self::ConfigParse { path, line, reason } => {
                write!(
                    f,
                    "Invalid configuration '{}' line {line}: {reason}",
                    path.display()
                )
            }
            Self::CatalogParse { path, line, reason } => {
                write!(
                    f,
                    "Invalid catalog row '{}' line {line}: {reason}",
                    path.display()
                )
            }
            Self::EmptyCatalog => write!(f, "EmptyCatalog: no catalog records to index"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "DimensionMismatch: expected {expected}, got {actual}")
            }
            Self::CapacityExceeded { count, capacity } => {
                write!(
                    f,
                    "CapacityExceeded: {count} records exceed capacity {capacity}"
                )
            }
            Self::IndexNotBuilt => write!(f, "IndexNotBuilt: index storage is not available"),
            Self::EmptyResultSet => write!(f, "EmptyResultSet: query returned no neighbors"),
            Self::InvalidState { operation, stage } => {
                write!(f, "Cannot {operation} while pipeline is {stage}")
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. }
            | Self::ImageExport { source, .. }
            | Self::TileLoad { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl MosaicError {
    /// Whether composition may continue past this error
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::TileLoad { .. })
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Attaches grid coordinates to per-cell errors
pub trait WithCellContext<T> {
    /// Record the (col, row) of the cell being composed
    ///
    /// # Errors
    ///
    /// Propagates the original error with the cell coordinates applied
    fn with_cell(self, cell: [usize; 2]) -> Result<T>;
}

impl<T, E> WithCellContext<T> for std::result::Result<T, E>
where
    E: Into<MosaicError>,
{
    fn with_cell(self, cell: [usize; 2]) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only tile decode failures are reported per cell
            if let MosaicError::TileLoad { cell: slot, .. } = &mut error {
                *slot = Some(cell);
            }
            error
        })
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
