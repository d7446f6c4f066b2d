//! Randomized selection among the nearest catalog tiles
//!
//! Always taking the single closest tile repeats the same image across large
//! regions of similar color. The matcher draws uniformly from the `k` nearest
//! neighbors instead.

use crate::index::{FeatureIndex, Neighbor};
use crate::io::configuration::MatchOptions;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Neighbor pool for one query and the member that was drawn
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Neighbors returned by the index, nearest first
    pub pool: Vec<Neighbor>,
    /// Position of the drawn neighbor in `pool`
    pub chosen: usize,
}

impl Selection {
    /// The drawn neighbor
    pub fn neighbor(&self) -> Option<&Neighbor> {
        self.pool.get(self.chosen)
    }

    /// Catalog id of the drawn neighbor
    pub fn id(&self) -> Option<usize> {
        self.neighbor().map(|n| n.id)
    }

    /// The drawn neighbor followed by the rest of the pool, nearest first
    pub fn fallback_order(&self) -> impl Iterator<Item = &Neighbor> {
        self.neighbor().into_iter().chain(
            self.pool
                .iter()
                .enumerate()
                .filter(move |(position, _)| *position != self.chosen)
                .map(|(_, neighbor)| neighbor),
        )
    }
}

/// Resolves a query vector to one catalog tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    neighbors: usize,
    eps: f64,
}

impl Matcher {
    /// Matcher drawing from the `neighbors` nearest tiles
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `neighbors` is zero or `eps` is negative
    /// or not finite
    pub fn new(neighbors: usize, eps: f64) -> Result<Self> {
        if neighbors == 0 {
            return Err(invalid_parameter("k", &neighbors, &"must be at least 1"));
        }
        if !eps.is_finite() || eps < 0.0 {
            return Err(invalid_parameter("eps", &eps, &"must be a finite value >= 0"));
        }
        Ok(Self { neighbors, eps })
    }

    /// Matcher configured from run options
    ///
    /// # Errors
    ///
    /// Same as [`Matcher::new`]
    pub fn from_options(options: &MatchOptions) -> Result<Self> {
        Self::new(options.neighbors, options.eps)
    }

    /// Neighbor pool size
    pub const fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// Approximation bound passed to the index
    pub const fn eps(&self) -> f64 {
        self.eps
    }

    /// Query the index and draw one neighbor uniformly from the pool
    ///
    /// A catalog smaller than `k` simply yields a smaller pool.
    ///
    /// # Errors
    ///
    /// Returns `EmptyResultSet` if the index returns no neighbors, or any
    /// error from [`FeatureIndex::query`]
    pub fn select<R: Rng + ?Sized>(
        &self,
        index: &FeatureIndex,
        query: &[f64],
        rng: &mut R,
    ) -> Result<Selection> {
        let pool = index.query(query, self.neighbors, self.eps)?;
        if pool.is_empty() {
            return Err(MosaicError::EmptyResultSet);
        }
        let chosen = rng.random_range(0..pool.len());
        Ok(Selection { pool, chosen })
    }

    /// Catalog id chosen for `query`
    ///
    /// # Errors
    ///
    /// Same as [`Matcher::select`]
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        index: &FeatureIndex,
        query: &[f64],
        rng: &mut R,
    ) -> Result<usize> {
        self.select(index, query, rng)?
            .id()
            .ok_or(MosaicError::EmptyResultSet)
    }
}

/// Run generator: fixed seed when given, otherwise OS entropy
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}
