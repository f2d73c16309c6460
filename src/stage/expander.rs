//! Stage 1 aggregate: one vertex's higher neighbors to exists-markers and
//! candidate closing pairs
//!
//! For a vertex `i` with higher neighbors `N`, emits `(i, h) -> EdgeExists`
//! for every `h` in `N`, then `(j, k) -> Candidate(i)` for every `j < k` in
//! `N`. The cross product is `O(d^2)` in the degree and dominates the whole
//! pipeline.

use super::{Aggregate, DEFAULT_BUFFER_CAPACITY};
use crate::error::TriadResult;
use crate::graph::{PairKey, Payload, VertexId};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AdjacencyExpander {
    buffer_capacity: usize,
    dedup_neighbors: bool,
    degree_warn_threshold: Option<usize>,
}

impl Default for AdjacencyExpander {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            dedup_neighbors: false,
            degree_warn_threshold: None,
        }
    }
}

impl AdjacencyExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial neighbor buffer capacity; the buffer doubles when full
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    /// Collapse repeated neighbors before emitting anything
    pub fn with_dedup_neighbors(mut self, dedup: bool) -> Self {
        self.dedup_neighbors = dedup;
        self
    }

    /// Log a warning for vertices whose degree exceeds `threshold`
    pub fn with_degree_warn_threshold(mut self, threshold: Option<usize>) -> Self {
        self.degree_warn_threshold = threshold;
        self
    }

    /// Candidate pair count for a vertex of `degree` above the warn threshold
    fn high_degree_pairs(&self, degree: usize) -> Option<usize> {
        match self.degree_warn_threshold {
            Some(threshold) if degree > threshold => Some(degree * (degree - 1) / 2),
            _ => None,
        }
    }
}

impl Aggregate for AdjacencyExpander {
    type Key = VertexId;
    type Value = VertexId;
    type Output = (PairKey, Payload);

    fn reduce<I>(&self, key: &VertexId, values: I, out: &mut Vec<(PairKey, Payload)>) -> TriadResult<()>
    where
        I: Iterator<Item = VertexId>,
    {
        let vertex = *key;
        let mut neighbors: Vec<VertexId> = Vec::with_capacity(self.buffer_capacity);

        for high in values {
            if neighbors.len() == neighbors.capacity() {
                neighbors.reserve_exact(neighbors.capacity());
            }
            neighbors.push(high);
            if !self.dedup_neighbors {
                out.push((PairKey { first: vertex, second: high }, Payload::EdgeExists));
            }
        }

        neighbors.sort_unstable();

        if self.dedup_neighbors {
            neighbors.dedup();
            out.extend(
                neighbors
                    .iter()
                    .map(|&high| (PairKey { first: vertex, second: high }, Payload::EdgeExists)),
            );
        }

        if let Some(pairs) = self.high_degree_pairs(neighbors.len()) {
            warn!(
                "Vertex {} has degree {} (threshold {}), emitting {} candidate pairs",
                vertex,
                neighbors.len(),
                self.degree_warn_threshold.unwrap_or_default(),
                pairs
            );
        }

        for (x, &j) in neighbors.iter().enumerate() {
            for &k in &neighbors[x + 1..] {
                out.push((PairKey { first: j, second: k }, Payload::Candidate(vertex)));
            }
        }

        Ok(())
    }
}
