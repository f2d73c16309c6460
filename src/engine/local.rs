//! Single-threaded engine with deterministic key order

use super::{CancellationToken, ShuffleEngine, StageMetrics, StageOutput};
use crate::error::{TriadError, TriadResult};
use crate::stage::{Aggregate, Transform};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// Runs every invocation on the calling thread, keys ascending.
///
/// Errors are returned as-is: there is no re-execution.
#[derive(Debug, Clone, Default)]
pub struct LocalEngine {
    cancel: CancellationToken,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    fn check_cancelled(&self, stage: &str) -> TriadResult<()> {
        if self.cancel.is_cancelled() {
            return Err(TriadError::Cancelled {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }
}

impl ShuffleEngine for LocalEngine {
    fn transform<T: Transform>(
        &self,
        stage: &str,
        inputs: &[T::Input],
        unit: &T,
    ) -> TriadResult<StageOutput<(T::Key, T::Value)>> {
        let started = Instant::now();
        let mut records = Vec::new();
        for input in inputs {
            self.check_cancelled(stage)?;
            unit.apply(input, &mut records)?;
        }

        let mut metrics = StageMetrics::new(stage);
        metrics.input_records = inputs.len() as u64;
        metrics.output_records = records.len() as u64;
        metrics.attempts = 1;
        metrics.set_elapsed(started.elapsed());
        debug!("[{}] transform: {} -> {} records", stage, inputs.len(), records.len());
        Ok(StageOutput { records, metrics })
    }

    fn aggregate<A: Aggregate>(
        &self,
        stage: &str,
        records: Vec<(A::Key, A::Value)>,
        unit: &A,
    ) -> TriadResult<StageOutput<A::Output>> {
        let started = Instant::now();
        let input_records = records.len() as u64;

        let mut groups: BTreeMap<A::Key, Vec<A::Value>> = BTreeMap::new();
        for (key, value) in records {
            groups.entry(key).or_default().push(value);
        }
        let group_count = groups.len() as u64;

        let mut output = Vec::new();
        for (key, values) in groups {
            self.check_cancelled(stage)?;
            unit.reduce(&key, values.into_iter(), &mut output)?;
        }

        let mut metrics = StageMetrics::new(stage);
        metrics.input_records = input_records;
        metrics.groups = group_count;
        metrics.output_records = output.len() as u64;
        metrics.attempts = 1;
        metrics.set_elapsed(started.elapsed());
        debug!("[{}] aggregate: {} groups -> {} records", stage, group_count, output.len());
        Ok(StageOutput {
            records: output,
            metrics,
        })
    }
}
