//! Core type definitions for the triangle pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        VertexId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        VertexId(id)
    }
}

/// Key of the second grouping stage: a canonical edge or a candidate closing pair.
///
/// Every key produced by the pipeline has `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PairKey {
    pub first: VertexId,
    pub second: VertexId,
}

impl PairKey {
    pub fn new(first: impl Into<VertexId>, second: impl Into<VertexId>) -> Self {
        PairKey {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Whether the pair is in canonical `(low, high)` order
    pub fn is_canonical(&self) -> bool {
        self.first < self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.first, self.second)
    }
}

/// Value carried under a `PairKey` between the two stages.
///
/// On the wire `EdgeExists` is the sentinel `-1` and a candidate is the
/// decimal id of the contributing third vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payload {
    /// The key is itself an input edge
    EdgeExists,
    /// The key's two vertices are both higher neighbors of this vertex
    Candidate(VertexId),
}

impl Payload {
    /// Sentinel used for `EdgeExists` in the text encoding
    pub const EDGE_SENTINEL: i64 = -1;
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::EdgeExists => write!(f, "{}", Self::EDGE_SENTINEL),
            Payload::Candidate(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let id = VertexId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(format!("{}", id), "42");

        let id2: VertexId = 100.into();
        assert!(id < id2);
    }

    #[test]
    fn test_pair_key() {
        let key = PairKey::new(2u64, 3u64);
        assert!(key.is_canonical());
        assert_eq!(key.to_string(), "2,3");
        assert!(!PairKey::new(3u64, 3u64).is_canonical());
        assert!(PairKey::new(1u64, 9u64) < PairKey::new(2u64, 3u64));
    }

    #[test]
    fn test_payload_display() {
        assert_eq!(Payload::EdgeExists.to_string(), "-1");
        assert_eq!(Payload::Candidate(VertexId(0)).to_string(), "0");
    }
}
