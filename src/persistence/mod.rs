//! Intermediate store between the two grouped stages
//!
//! Stage 1's output is fully materialized as `j,k<TAB>value` text before
//! stage 2 reads any of it back, which is the barrier the second grouping
//! relies on.

pub mod directory;
pub mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use crate::codec::InputLine;
use crate::error::TriadResult;
use crate::graph::{PairKey, Payload};

/// Materialized stage 1 output
pub trait IntermediateStore {
    /// Replace the store's contents with `records`; returns the line count
    fn write(&mut self, records: &[(PairKey, Payload)]) -> TriadResult<u64>;

    /// Every stored line, numbered from 1.
    ///
    /// A store may hand its lines over instead of copying them, so only the
    /// first read after a write is guaranteed to see them.
    fn read(&mut self) -> TriadResult<Vec<InputLine>>;
}
