//! Tile catalog: records, CSV persistence and generation

/// Catalog generation from tile directories
pub mod builder;
/// Catalog CSV reading and writing
pub mod loader;
/// Feature records and the validated catalog
pub mod record;

pub use record::{Catalog, FeatureRecord};
