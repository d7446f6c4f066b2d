//! Bounded candidate set for k-nearest-neighbor search

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One query result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Catalog id of the record
    pub id: usize,
    /// Position of the record in the catalog the index was built from
    pub slot: usize,
    /// Squared Euclidean distance to the query
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    slot: usize,
}

// Max-heap on (distance, slot) so the worst candidate sits on top
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.slot.cmp(&other.slot))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Keeps the k closest slots seen so far
///
/// Ties on distance are resolved toward the lower slot, which keeps results
/// independent of traversal order.
#[derive(Debug)]
pub struct NeighborHeap {
    heap: BinaryHeap<Candidate>,
    k: usize,
}

impl NeighborHeap {
    /// Create an empty heap holding at most `k` candidates
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k + 1),
            k,
        }
    }

    /// Number of candidates currently held
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no candidate has been accepted
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Current k-th best distance, or infinity while the heap is not full
    pub fn bound(&self) -> f64 {
        if self.heap.len() < self.k {
            f64::INFINITY
        } else {
            self.heap.peek().map_or(f64::INFINITY, |worst| worst.distance)
        }
    }

    /// Offer a candidate; it is kept only if it improves the current set
    pub fn offer(&mut self, slot: usize, distance: f64) {
        if self.k == 0 {
            return;
        }
        let candidate = Candidate { distance, slot };
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if self.heap.peek().is_some_and(|worst| candidate < *worst) {
            self.heap.pop();
            self.heap.push(candidate);
        }
    }

    /// Drain into `(slot, distance)` pairs, nearest first
    pub fn into_sorted(self) -> Vec<(usize, f64)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.slot, c.distance))
            .collect()
    }
}
