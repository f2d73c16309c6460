//! In-memory intermediate store

use super::IntermediateStore;
use crate::codec::{self, InputLine};
use crate::error::TriadResult;
use crate::graph::{PairKey, Payload};

/// Keeps the encoded intermediate lines in memory.
///
/// Lines are numbered when written and moved out on read, so the
/// intermediate data is held once.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lines: Vec<InputLine>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[InputLine] {
        &self.lines
    }
}

impl IntermediateStore for MemoryStore {
    fn write(&mut self, records: &[(PairKey, Payload)]) -> TriadResult<u64> {
        self.lines = InputLine::numbered(
            records
                .iter()
                .map(|(key, payload)| codec::format_intermediate(key, payload)),
        );
        Ok(self.lines.len() as u64)
    }

    fn read(&mut self) -> TriadResult<Vec<InputLine>> {
        Ok(std::mem::take(&mut self.lines))
    }
}
