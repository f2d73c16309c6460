//! Per-stage execution counters

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters for one engine call (or a merged transform + aggregate pair)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMetrics {
    /// Stage name
    pub stage: String,
    /// Records handed to the stage
    pub input_records: u64,
    /// Keyed records crossing the shuffle (transform output)
    pub shuffled_records: u64,
    /// Distinct keys seen by the aggregate
    pub groups: u64,
    /// Records emitted by the stage
    pub output_records: u64,
    /// Split/partition executions, including re-executions
    pub attempts: u64,
    /// Wall-clock time in milliseconds
    pub elapsed_ms: u64,
}

impl StageMetrics {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Default::default()
        }
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis() as u64;
    }

    /// Combine the transform and aggregate halves of one grouped stage
    pub fn merge(map: StageMetrics, reduce: StageMetrics) -> StageMetrics {
        StageMetrics {
            stage: map.stage,
            input_records: map.input_records,
            shuffled_records: map.output_records,
            groups: reduce.groups,
            output_records: reduce.output_records,
            attempts: map.attempts + reduce.attempts,
            elapsed_ms: map.elapsed_ms + reduce.elapsed_ms,
        }
    }
}
