//! Detected triangles (closed triads)

use super::types::{PairKey, VertexId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed triad: the closing edge `(q, r)` plus the apex `p` whose
/// adjacency produced the candidate.
///
/// For input where every edge is listed ascending, `p < q < r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Triangle {
    pub closing: PairKey,
    pub apex: VertexId,
}

impl Triangle {
    pub fn new(closing: PairKey, apex: VertexId) -> Self {
        Triangle { closing, apex }
    }

    /// The three vertices, ascending
    pub fn vertices(&self) -> [VertexId; 3] {
        let mut v = [self.apex, self.closing.first, self.closing.second];
        v.sort_unstable();
        v
    }
}

/// Output form `q,r,p`
impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.closing, self.apex)
    }
}
