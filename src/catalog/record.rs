//! Catalog records and the validated catalog collection

use crate::io::configuration::COLOR_CHANNELS;
use crate::io::error::{MosaicError, Result};
use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};

/// One candidate tile with its precomputed color signature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Catalog id
    pub id: usize,
    /// Path of the tile image
    pub source_path: PathBuf,
    /// Per-subcell channel means, row-major, 3 values per subcell
    pub vector: Vec<f64>,
}

impl FeatureRecord {
    /// Create a record
    pub fn new(id: usize, source_path: impl Into<PathBuf>, vector: Vec<f64>) -> Self {
        Self {
            id,
            source_path: source_path.into(),
            vector,
        }
    }

    /// Path of the tile image
    pub fn path(&self) -> &Path {
        &self.source_path
    }

    /// Format as a catalog CSV row (`id,path,v1,...,vD`)
    pub fn to_csv_row(&self) -> String {
        let mut row = format!("{},{}", self.id, self.source_path.display());
        for value in &self.vector {
            row.push(',');
            row.push_str(&value.to_string());
        }
        row
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[index]: {}", self.id)?;
        write!(f, "[path]: {}", self.source_path.display())?;
        for subcell in self.vector.chunks(COLOR_CHANNELS) {
            let values: Vec<String> = subcell.iter().map(ToString::to_string).collect();
            write!(f, "\n{}", values.join(","))?;
        }
        Ok(())
    }
}

/// Ordered, validated collection of feature records
///
/// Every record's vector has the catalog dimension and the catalog is never
/// empty.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<FeatureRecord>,
    dimension: usize,
}

impl Catalog {
    /// Validate records against `dimension`
    ///
    /// # Errors
    ///
    /// Returns `EmptyCatalog` for no records, or `DimensionMismatch` for the
    /// first record whose vector length differs from `dimension`
    pub fn new(records: Vec<FeatureRecord>, dimension: usize) -> Result<Self> {
        if records.is_empty() {
            return Err(MosaicError::EmptyCatalog);
        }
        if let Some(record) = records.iter().find(|r| r.vector.len() != dimension) {
            return Err(MosaicError::DimensionMismatch {
                expected: dimension,
                actual: record.vector.len(),
            });
        }
        Ok(Self { records, dimension })
    }

    /// All records in catalog order
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Record at a catalog position
    pub fn get(&self, slot: usize) -> Option<&FeatureRecord> {
        self.records.get(slot)
    }

    /// Number of records
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed catalog
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Feature vector length shared by all records
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Pick a record uniformly at random
    pub fn random_record<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&FeatureRecord> {
        if self.records.is_empty() {
            return None;
        }
        self.records.get(rng.random_range(0..self.records.len()))
    }
}
