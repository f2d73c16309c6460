//! Stage 2 transform: re-key intermediate text records by their pair

use super::Transform;
use crate::codec::{self, InputLine};
use crate::error::TriadResult;
use crate::graph::{PairKey, Payload};

/// Parses `j,k<TAB>value` lines and re-emits them keyed by `(j, k)`
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateRegrouper;

impl Transform for CandidateRegrouper {
    type Input = InputLine;
    type Key = PairKey;
    type Value = Payload;

    fn apply(&self, input: &InputLine, out: &mut Vec<(PairKey, Payload)>) -> TriadResult<()> {
        if let Some(record) = codec::parse_intermediate_line(input.number, &input.text)? {
            out.push(record);
        }
        Ok(())
    }
}
