//! The four processing units of the triangle pipeline
//!
//! Stage 1: [`EdgeNormalizer`] (transform) feeding [`AdjacencyExpander`]
//! (aggregate, keyed by the lower endpoint).
//! Stage 2: [`CandidateRegrouper`] (transform) feeding [`ClosureDetector`]
//! (aggregate, keyed by the candidate pair).
//!
//! Units are pure functions of their input; every buffer they use lives for
//! a single invocation, so a unit can be shared across worker threads and
//! re-executed after a failure.

pub mod closure;
pub mod expander;
pub mod normalizer;
pub mod regrouper;

pub use closure::ClosureDetector;
pub use expander::AdjacencyExpander;
pub use normalizer::{EdgeNormalizer, EdgeOrientation};
pub use regrouper::CandidateRegrouper;

use crate::error::TriadResult;
use std::hash::Hash;

/// Per-record transform: one input, zero or more keyed records out
pub trait Transform: Sync {
    type Input: Send + Sync;
    type Key: Send;
    type Value: Send;

    fn apply(&self, input: &Self::Input, out: &mut Vec<(Self::Key, Self::Value)>) -> TriadResult<()>;
}

/// Grouped aggregation: invoked once per distinct key with every value for it
pub trait Aggregate: Sync {
    type Key: Ord + Hash + Clone + Send + Sync;
    type Value: Clone + Send + Sync;
    type Output: Send;

    fn reduce<I>(&self, key: &Self::Key, values: I, out: &mut Vec<Self::Output>) -> TriadResult<()>
    where
        I: Iterator<Item = Self::Value>;
}

/// Initial capacity of the per-invocation value buffers
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;
