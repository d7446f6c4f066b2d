//! Spatial index over catalog feature vectors
//!
//! This module contains:
//! - The owning feature index with build, query and release
//! - The kd-tree it is built on
//! - Bounded neighbor collection used during search

/// Owning index with explicit release
pub mod feature_index;
/// Balanced kd-tree with approximate search
pub mod kdtree;
/// Neighbor results and the bounded candidate heap
pub mod neighbors;

pub use feature_index::FeatureIndex;
pub use neighbors::Neighbor;
