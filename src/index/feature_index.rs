//! Owning nearest-neighbor index over catalog feature vectors

use crate::catalog::FeatureRecord;
use crate::index::kdtree::KdTree;
use crate::index::neighbors::Neighbor;
use crate::io::configuration::KD_BUCKET_SIZE;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use ndarray::Array2;

#[derive(Debug)]
struct IndexStorage {
    tree: KdTree,
    ids: Vec<usize>,
}

/// Immutable k-NN index built once from catalog records
///
/// The index owns all of its storage. [`FeatureIndex::release`] frees it
/// explicitly; dropping the index frees it as well. Queries take `&self`, so a
/// built index can be shared between worker threads.
#[derive(Debug)]
pub struct FeatureIndex {
    storage: Option<IndexStorage>,
    dimension: usize,
}

impl FeatureIndex {
    /// Build the index over `records`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `records` is empty (`EmptyCatalog`)
    /// - any vector length differs from `dimension` (`DimensionMismatch`)
    /// - there are more than `capacity` records (`CapacityExceeded`)
    /// - `dimension` is zero
    pub fn build(records: &[FeatureRecord], dimension: usize, capacity: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(invalid_parameter(
                "dimension",
                &dimension,
                &"must be at least 1",
            ));
        }
        if records.is_empty() {
            return Err(MosaicError::EmptyCatalog);
        }
        if let Some(record) = records.iter().find(|r| r.vector.len() != dimension) {
            return Err(MosaicError::DimensionMismatch {
                expected: dimension,
                actual: record.vector.len(),
            });
        }
        if records.len() > capacity {
            return Err(MosaicError::CapacityExceeded {
                count: records.len(),
                capacity,
            });
        }

        let flat: Vec<f64> = records
            .iter()
            .flat_map(|r| r.vector.iter().copied())
            .collect();
        let points = Array2::from_shape_vec((records.len(), dimension), flat).map_err(|e| {
            invalid_parameter("records", &records.len(), &format!("point matrix: {e}"))
        })?;
        let ids = records.iter().map(|r| r.id).collect();

        let tree = KdTree::build(points, KD_BUCKET_SIZE);
        tracing::debug!(
            points = tree.len(),
            dimension,
            depth = tree.depth(),
            "feature index built"
        );

        Ok(Self {
            storage: Some(IndexStorage { tree, ids }),
            dimension,
        })
    }

    /// Find up to `k` nearest records, nearest first
    ///
    /// With `eps = 0` the result is exact; with `eps > 0` each neighbor is
    /// within a factor `1 + eps` of the true neighbor at the same rank.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the index has been released (`IndexNotBuilt`)
    /// - `vector` length differs from the index dimension (`DimensionMismatch`)
    /// - any component of `vector` is NaN or infinite
    /// - `k` is zero or `eps` is negative or not finite
    pub fn query(&self, vector: &[f64], k: usize, eps: f64) -> Result<Vec<Neighbor>> {
        let storage = self.storage.as_ref().ok_or(MosaicError::IndexNotBuilt)?;
        if vector.len() != self.dimension {
            return Err(MosaicError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if let Some(value) = vector.iter().find(|v| !v.is_finite()) {
            return Err(invalid_parameter("vector", value, &"components must be finite"));
        }
        if k == 0 {
            return Err(invalid_parameter("k", &k, &"must be at least 1"));
        }
        if !eps.is_finite() || eps < 0.0 {
            return Err(invalid_parameter("eps", &eps, &"must be a finite value >= 0"));
        }

        Ok(storage
            .tree
            .search(vector, k, eps)
            .into_iter()
            .map(|(slot, distance)| Neighbor {
                id: storage.ids.get(slot).copied().unwrap_or(slot),
                slot,
                distance,
            })
            .collect())
    }

    /// Free the index storage; later queries fail with `IndexNotBuilt`
    ///
    /// Returns `true` if storage was released by this call.
    pub fn release(&mut self) -> bool {
        self.storage.take().is_some()
    }

    /// Whether the index still owns its storage
    pub const fn is_built(&self) -> bool {
        self.storage.is_some()
    }

    /// Number of indexed records (0 once released)
    pub fn len(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.tree.len())
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature vector length the index was built for
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}
