//! Triadflow
//!
//! Exact triangle enumeration for edge lists too large for one machine,
//! expressed as two key-grouped stages (open-triad closing):
//!
//! 1. Every raw edge `a b` with `a < b` is keyed by `a`. For each vertex `i`
//!    the grouped stage emits `(i, h) -> edge exists` for each higher neighbor
//!    `h`, and `(j, k) -> candidate i` for each pair `j < k` of higher
//!    neighbors.
//! 2. Records are regrouped by pair. A pair that received an edge-exists
//!    marker closes a triangle with every candidate apex it received.
//!
//! For a triangle `p < q < r` the candidate `(q, r)` comes only from `p` and
//! the marker for `(q, r)` only from `q`, so every triangle is reported
//! exactly once, as `q,r,p`.
//!
//! Grouping, partitioning and re-execution belong to a [`ShuffleEngine`];
//! [`LocalEngine`] and [`ParallelEngine`] are in-process implementations.
//!
//! ## Example Usage
//!
//! ```rust
//! use triadflow::{InputLine, JobConfig, LocalEngine, TriangleJob};
//!
//! let edges = InputLine::numbered(["1 2", "1 3", "2 3"]);
//! let job = TriangleJob::new(LocalEngine::new(), JobConfig::default());
//! let output = job.run_lines(&edges).unwrap();
//!
//! assert_eq!(output.triangles.len(), 1);
//! assert_eq!(output.triangles[0].to_string(), "2,3,1");
//! ```

#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod job;
pub mod persistence;
pub mod stage;

// Re-export main types for convenience
pub use codec::InputLine;
pub use config::{EngineConfig, EngineKind, JobConfig};
pub use engine::{
    CancellationToken, ConfiguredEngine, LocalEngine, ParallelEngine, ShuffleEngine, StageMetrics,
    StageOutput,
};
pub use error::{TriadError, TriadResult};
pub use graph::{PairKey, Payload, Triangle, VertexId};
pub use job::{JobOutput, JobReport, TriangleJob};
pub use persistence::{DirectoryStore, IntermediateStore, MemoryStore};
pub use stage::{
    AdjacencyExpander, Aggregate, CandidateRegrouper, ClosureDetector, EdgeNormalizer,
    EdgeOrientation, Transform,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
