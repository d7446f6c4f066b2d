//! Balanced kd-tree with approximate k-nearest-neighbor search
//!
//! Points live in a row-major `Array2` (one row per catalog slot). The tree
//! stores only a permutation of slots and an arena of nodes, so building never
//! copies point data. Leaves hold up to `bucket_size` slots; internal nodes
//! split on the dimension of widest spread at the median.
//!
//! Search follows the incremental-distance scheme: each visited box carries a
//! lower bound on the squared distance to the query, updated one coordinate at
//! a time when crossing a split. A far subtree is skipped once
//! `bound * (1 + eps)^2` exceeds the current k-th best distance, so every
//! reported neighbor is within a factor `(1 + eps)` of the true neighbor at
//! that rank.

use crate::index::neighbors::NeighborHeap;
use ndarray::Array2;

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        dim: usize,
        cut: f64,
        lower: usize,
        upper: usize,
    },
}

/// Static kd-tree over the rows of a point matrix
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Array2<f64>,
    order: Vec<usize>,
    nodes: Vec<Node>,
    root: usize,
    bucket_size: usize,
}

impl KdTree {
    /// Build the tree over every row of `points`
    pub fn build(points: Array2<f64>, bucket_size: usize) -> Self {
        let count = points.nrows();
        let mut tree = Self {
            points,
            order: (0..count).collect(),
            nodes: Vec::new(),
            root: 0,
            bucket_size: bucket_size.max(1),
        };
        if count > 0 {
            tree.root = tree.build_node(0, count);
        }
        tree
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Whether the tree holds no points
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Dimension of the indexed points
    pub fn dimension(&self) -> usize {
        self.points.ncols()
    }

    /// Longest root-to-leaf path, counting the root as depth 1
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((node, depth)) = stack.pop() {
            match self.nodes.get(node) {
                Some(Node::Split { lower, upper, .. }) => {
                    stack.push((*lower, depth + 1));
                    stack.push((*upper, depth + 1));
                }
                Some(Node::Leaf { .. }) => deepest = deepest.max(depth),
                None => {}
            }
        }
        deepest
    }

    /// Find up to `k` nearest slots to `query` as `(slot, squared distance)`
    ///
    /// Results are ordered nearest first; equal distances are ordered by slot.
    /// `query` must have length [`KdTree::dimension`].
    pub fn search(&self, query: &[f64], k: usize, eps: f64) -> Vec<(usize, f64)> {
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }
        let mut heap = NeighborHeap::new(k);
        let mut offsets = vec![0.0; self.dimension()];
        let scale = (1.0 + eps) * (1.0 + eps);
        self.search_node(self.root, query, 0.0, &mut offsets, scale, &mut heap);
        heap.into_sorted()
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn coordinate(&self, slot: usize, dim: usize) -> f64 {
        self.points.get([slot, dim]).copied().unwrap_or(0.0)
    }

    fn build_node(&mut self, start: usize, end: usize) -> usize {
        if end - start <= self.bucket_size {
            return self.push(Node::Leaf { start, end });
        }

        let (dim, spread) = self.widest_dimension(start, end);
        // Identical points cannot be separated
        if spread <= 0.0 {
            return self.push(Node::Leaf { start, end });
        }

        let mid = start + (end - start) / 2;
        let points = &self.points;
        if let Some(range) = self.order.get_mut(start..end) {
            range.select_nth_unstable_by(mid - start, |&a, &b| {
                let va = points.get([a, dim]).copied().unwrap_or(0.0);
                let vb = points.get([b, dim]).copied().unwrap_or(0.0);
                va.total_cmp(&vb)
            });
        }
        let cut = self
            .order
            .get(mid)
            .map_or(0.0, |&slot| self.coordinate(slot, dim));

        let lower = self.build_node(start, mid);
        let upper = self.build_node(mid, end);
        self.push(Node::Split {
            dim,
            cut,
            lower,
            upper,
        })
    }

    fn widest_dimension(&self, start: usize, end: usize) -> (usize, f64) {
        let slots = self.order.get(start..end).unwrap_or(&[]);
        let mut best = (0, f64::NEG_INFINITY);
        for dim in 0..self.dimension() {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &slot in slots {
                let value = self.coordinate(slot, dim);
                min = min.min(value);
                max = max.max(value);
            }
            let spread = max - min;
            if spread > best.1 {
                best = (dim, spread);
            }
        }
        best
    }

    fn search_node(
        &self,
        node: usize,
        query: &[f64],
        box_distance: f64,
        offsets: &mut [f64],
        scale: f64,
        heap: &mut NeighborHeap,
    ) {
        match self.nodes.get(node).copied() {
            Some(Node::Leaf { start, end }) => {
                for &slot in self.order.get(start..end).unwrap_or(&[]) {
                    if let Some(distance) = self.distance_within(slot, query, heap.bound()) {
                        heap.offer(slot, distance);
                    }
                }
            }
            Some(Node::Split {
                dim,
                cut,
                lower,
                upper,
            }) => {
                let diff = query.get(dim).copied().unwrap_or(0.0) - cut;
                let (near, far) = if diff < 0.0 {
                    (lower, upper)
                } else {
                    (upper, lower)
                };

                self.search_node(near, query, box_distance, offsets, scale, heap);

                let previous = offsets.get(dim).copied().unwrap_or(0.0);
                let far_distance = diff.mul_add(diff, previous.mul_add(-previous, box_distance));
                if far_distance * scale <= heap.bound() {
                    if let Some(offset) = offsets.get_mut(dim) {
                        *offset = diff;
                    }
                    self.search_node(far, query, far_distance, offsets, scale, heap);
                    if let Some(offset) = offsets.get_mut(dim) {
                        *offset = previous;
                    }
                }
            }
            None => {}
        }
    }

    // Squared distance, abandoned early once it exceeds `bound`
    fn distance_within(&self, slot: usize, query: &[f64], bound: f64) -> Option<f64> {
        let row = self.points.row(slot);
        let mut sum = 0.0;
        for (&value, &target) in row.iter().zip(query) {
            let delta = value - target;
            sum = delta.mul_add(delta, sum);
            if sum > bound {
                return None;
            }
        }
        Some(sum)
    }
}
