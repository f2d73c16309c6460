//! Multi-threaded engine over hash partitions
//!
//! Transform input is cut into fixed-size splits and aggregate input is
//! hash-partitioned by key; splits and partitions run on the rayon pool.
//! A split or partition that fails is re-executed from its original input
//! up to `max_attempts` times and only the output of the successful attempt
//! is kept, which is safe because every unit is a pure function of its
//! input.

use super::{CancellationToken, ShuffleEngine, StageMetrics, StageOutput};
use crate::error::{TriadError, TriadResult};
use crate::stage::{Aggregate, Transform};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_PARTITIONS: usize = 16;
pub const DEFAULT_SPLIT_SIZE: usize = 64 * 1024;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct ParallelEngine {
    partitions: usize,
    split_size: usize,
    max_attempts: u32,
    pool: Option<Arc<rayon::ThreadPool>>,
    cancel: CancellationToken,
}

impl Default for ParallelEngine {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            split_size: DEFAULT_SPLIT_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pool: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl ParallelEngine {
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
            ..Default::default()
        }
    }

    pub fn with_split_size(mut self, split_size: usize) -> Self {
        self.split_size = split_size.max(1);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Run on a dedicated pool of `threads` workers instead of the global pool
    pub fn with_threads(mut self, threads: usize) -> TriadResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("triadflow-worker-{}", i))
            .build()
            .map_err(|e| TriadError::Config(format!("cannot build worker pool: {}", e)))?;
        self.pool = Some(Arc::new(pool));
        Ok(self)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn check_cancelled(&self, stage: &str) -> TriadResult<()> {
        if self.cancel.is_cancelled() {
            return Err(TriadError::Cancelled {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }

    /// Run `task` until it succeeds, returning its output and the attempt count
    fn with_retries<R>(
        &self,
        stage: &str,
        what: &str,
        index: usize,
        mut task: impl FnMut() -> TriadResult<R>,
    ) -> TriadResult<(R, u32)> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match task() {
                Ok(output) => return Ok((output, attempt)),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        "[{}] {} {} failed on attempt {}/{}: {}; re-executing",
                        stage, what, index, attempt, self.max_attempts, e
                    );
                }
                Err(e) => {
                    return Err(TriadError::StageFailed {
                        stage: stage.to_string(),
                        attempts: attempt,
                        source: Box::new(e),
                    })
                }
            }
        }
    }
}

/// Partition index of `key` among `partitions`
pub fn partition_of<K: Hash>(key: &K, partitions: usize) -> usize {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    (hasher.finish() % partitions as u64) as usize
}

impl ShuffleEngine for ParallelEngine {
    fn transform<T: Transform>(
        &self,
        stage: &str,
        inputs: &[T::Input],
        unit: &T,
    ) -> TriadResult<StageOutput<(T::Key, T::Value)>> {
        let started = Instant::now();

        let splits: Vec<(Vec<(T::Key, T::Value)>, u32)> = self.install(|| {
            inputs
                .par_chunks(self.split_size)
                .enumerate()
                .map(|(index, split)| {
                    self.with_retries(stage, "split", index, || {
                        let mut out = Vec::new();
                        for input in split {
                            self.check_cancelled(stage)?;
                            unit.apply(input, &mut out)?;
                        }
                        Ok(out)
                    })
                })
                .collect::<TriadResult<Vec<_>>>()
        })?;

        let attempts: u64 = splits.iter().map(|(_, a)| *a as u64).sum();
        let split_count = splits.len();
        let records: Vec<(T::Key, T::Value)> = splits.into_iter().flat_map(|(out, _)| out).collect();

        let mut metrics = StageMetrics::new(stage);
        metrics.input_records = inputs.len() as u64;
        metrics.output_records = records.len() as u64;
        metrics.attempts = attempts;
        metrics.set_elapsed(started.elapsed());
        debug!(
            "[{}] transform: {} splits, {} -> {} records",
            stage,
            split_count,
            inputs.len(),
            records.len()
        );
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

        let mut buckets: Vec<Vec<(A::Key, A::Value)>> = (0..self.partitions).map(|_| Vec::new()).collect();
        for (key, value) in records {
            let p = partition_of(&key, self.partitions);
            buckets[p].push((key, value));
        }

        let partitions: Vec<((Vec<A::Output>, u64), u32)> = self.install(|| {
            buckets
                .par_iter()
                .enumerate()
                .map(|(index, bucket)| {
                    self.with_retries(stage, "partition", index, || {
                        let mut groups: FxHashMap<&A::Key, Vec<&A::Value>> = FxHashMap::default();
                        for (key, value) in bucket {
                            groups.entry(key).or_default().push(value);
                        }
                        let mut groups: Vec<_> = groups.into_iter().collect();
                        groups.sort_unstable_by(|a, b| a.0.cmp(b.0));

                        let mut out = Vec::new();
                        for (key, values) in &groups {
                            self.check_cancelled(stage)?;
                            unit.reduce(*key, values.iter().map(|v| (*v).clone()), &mut out)?;
                        }
                        debug!("[{}] partition {}: {} groups", stage, index, groups.len());
                        Ok((out, groups.len() as u64))
                    })
                })
                .collect::<TriadResult<Vec<_>>>()
        })?;

        let attempts: u64 = partitions.iter().map(|(_, a)| *a as u64).sum();
        let mut group_count = 0;
        let mut output = Vec::new();
        for ((out, groups), _) in partitions {
            group_count += groups;
            output.extend(out);
        }

        let mut metrics = StageMetrics::new(stage);
        metrics.input_records = input_records;
        metrics.groups = group_count;
        metrics.output_records = output.len() as u64;
        metrics.attempts = attempts;
        metrics.set_elapsed(started.elapsed());
        debug!("[{}] aggregate: {} groups -> {} records", stage, group_count, output.len());
        Ok(StageOutput {
            records: output,
            metrics,
        })
    }
}
