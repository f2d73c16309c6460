//! Stage 1 transform: raw edge line to `(low, high)` keyed by `low`

use super::Transform;
use crate::codec::{self, InputLine};
use crate::error::TriadResult;
use crate::graph::VertexId;
use serde::{Deserialize, Serialize};

/// How raw endpoint order is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeOrientation {
    /// Keep `a b` only when `a < b`; anything else is dropped
    #[default]
    AscendingOnly,
    /// Swap descending pairs into `(min, max)`; self-loops are still dropped
    Canonicalize,
}

/// Parses raw edges and keys them by their lower endpoint
#[derive(Debug, Clone, Default)]
pub struct EdgeNormalizer {
    orientation: EdgeOrientation,
}

impl EdgeNormalizer {
    pub fn new(orientation: EdgeOrientation) -> Self {
        Self { orientation }
    }

    /// Canonical `(low, high)` form of a raw pair, if it survives
    pub fn normalize(&self, a: VertexId, b: VertexId) -> Option<(VertexId, VertexId)> {
        match self.orientation {
            EdgeOrientation::AscendingOnly if a < b => Some((a, b)),
            EdgeOrientation::AscendingOnly => None,
            EdgeOrientation::Canonicalize if a == b => None,
            EdgeOrientation::Canonicalize => Some((a.min(b), a.max(b))),
        }
    }
}

impl Transform for EdgeNormalizer {
    type Input = InputLine;
    type Key = VertexId;
    type Value = VertexId;

    fn apply(&self, input: &InputLine, out: &mut Vec<(VertexId, VertexId)>) -> TriadResult<()> {
        if let Some((a, b)) = codec::parse_edge_line(input.number, &input.text)? {
            if let Some(edge) = self.normalize(a, b) {
                out.push(edge);
            }
        }
        Ok(())
    }
}
