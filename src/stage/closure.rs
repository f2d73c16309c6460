//! Stage 2 aggregate: confirm candidate pairs that are real edges

use super::{Aggregate, DEFAULT_BUFFER_CAPACITY};
use crate::error::TriadResult;
use crate::graph::{PairKey, Payload, Triangle, VertexId};

/// Emits one triangle per contributed apex when the pair itself is an edge
#[derive(Debug, Clone)]
pub struct ClosureDetector {
    buffer_capacity: usize,
}

impl Default for ClosureDetector {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl ClosureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }
}

impl Aggregate for ClosureDetector {
    type Key = PairKey;
    type Value = Payload;
    type Output = Triangle;

    fn reduce<I>(&self, key: &PairKey, values: I, out: &mut Vec<Triangle>) -> TriadResult<()>
    where
        I: Iterator<Item = Payload>,
    {
        let mut edge_exists = false;
        let mut apexes: Vec<VertexId> = Vec::with_capacity(self.buffer_capacity);

        for payload in values {
            match payload {
                Payload::EdgeExists => edge_exists = true,
                Payload::Candidate(apex) => {
                    if apexes.len() == apexes.capacity() {
                        apexes.reserve_exact(apexes.capacity());
                    }
                    apexes.push(apex);
                }
            }
        }

        if edge_exists {
            out.extend(apexes.into_iter().map(|apex| Triangle::new(*key, apex)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(key: PairKey, values: Vec<Payload>) -> Vec<String> {
        let mut out = Vec::new();
        ClosureDetector::new()
            .reduce(&key, values.into_iter(), &mut out)
            .unwrap();
        out.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_closed_pair_emits_each_apex() {
        let key = PairKey::new(3u64, 4u64);
        let values = vec![
            Payload::Candidate(VertexId(1)),
            Payload::EdgeExists,
            Payload::Candidate(VertexId(2)),
        ];
        assert_eq!(detect(key, values), vec!["3,4,1", "3,4,2"]);
    }

    #[test]
    fn test_open_pair_emits_nothing() {
        let key = PairKey::new(1u64, 3u64);
        let values = vec![Payload::Candidate(VertexId(0)), Payload::Candidate(VertexId(2))];
        assert!(detect(key, values).is_empty());
    }

    #[test]
    fn test_edge_without_candidates_emits_nothing() {
        assert!(detect(PairKey::new(1u64, 2u64), vec![Payload::EdgeExists]).is_empty());
    }

    #[test]
    fn test_apex_zero_is_not_a_marker() {
        let key = PairKey::new(1u64, 2u64);
        let values = vec![Payload::EdgeExists, Payload::Candidate(VertexId(0))];
        assert_eq!(detect(key, values), vec!["1,2,0"]);
    }
}
