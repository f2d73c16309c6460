//! Grouped shuffle execution
//!
//! The pipeline's units never route records themselves. An engine runs a
//! [`Transform`] over every input, groups the keyed output so that all
//! values for one key reach exactly one [`Aggregate`] invocation, and only
//! returns once every key has been processed. Returning is the barrier
//! between grouped stages.
//!
//! - [`LocalEngine`]: single-threaded, keys in ascending order; for tests
//!   and small inputs.
//! - [`ParallelEngine`]: rayon workers over hash partitions, with
//!   re-execution of failed splits and partitions.

pub mod cancel;
pub mod local;
pub mod metrics;
pub mod parallel;

pub use cancel::CancellationToken;
pub use local::LocalEngine;
pub use metrics::StageMetrics;
pub use parallel::ParallelEngine;

use crate::error::TriadResult;
use crate::stage::{Aggregate, Transform};

/// Fully materialized output of one engine call
#[derive(Debug)]
pub struct StageOutput<R> {
    pub records: Vec<R>,
    pub metrics: StageMetrics,
}

/// Key-grouped execution engine consumed by the triangle job
pub trait ShuffleEngine {
    /// Apply `unit` to every input record
    fn transform<T: Transform>(
        &self,
        stage: &str,
        inputs: &[T::Input],
        unit: &T,
    ) -> TriadResult<StageOutput<(T::Key, T::Value)>>;

    /// Group `records` by key and call `unit` once per key
    fn aggregate<A: Aggregate>(
        &self,
        stage: &str,
        records: Vec<(A::Key, A::Value)>,
        unit: &A,
    ) -> TriadResult<StageOutput<A::Output>>;

    /// Transform, shuffle by key, aggregate
    fn map_reduce<T, A>(
        &self,
        stage: &str,
        inputs: &[T::Input],
        transform: &T,
        aggregate: &A,
    ) -> TriadResult<StageOutput<A::Output>>
    where
        T: Transform<Key = A::Key, Value = A::Value>,
        A: Aggregate,
    {
        let mapped = self.transform(stage, inputs, transform)?;
        let reduced = self.aggregate(stage, mapped.records, aggregate)?;
        Ok(StageOutput {
            records: reduced.records,
            metrics: StageMetrics::merge(mapped.metrics, reduced.metrics),
        })
    }
}

/// An engine chosen at runtime from [`EngineConfig`](crate::config::EngineConfig)
#[derive(Clone)]
pub enum ConfiguredEngine {
    Local(LocalEngine),
    Parallel(ParallelEngine),
}

impl ConfiguredEngine {
    pub fn from_config(
        config: &crate::config::EngineConfig,
        cancel: CancellationToken,
    ) -> TriadResult<Self> {
        use crate::config::EngineKind;

        Ok(match config.kind {
            EngineKind::Local => ConfiguredEngine::Local(LocalEngine::new().with_cancellation(cancel)),
            EngineKind::Parallel => {
                let mut engine = ParallelEngine::new(config.partitions)
                    .with_split_size(config.split_size)
                    .with_max_attempts(config.max_attempts)
                    .with_cancellation(cancel);
                if config.threads > 0 {
                    engine = engine.with_threads(config.threads)?;
                }
                ConfiguredEngine::Parallel(engine)
            }
        })
    }
}

impl ShuffleEngine for ConfiguredEngine {
    fn transform<T: Transform>(
        &self,
        stage: &str,
        inputs: &[T::Input],
        unit: &T,
    ) -> TriadResult<StageOutput<(T::Key, T::Value)>> {
        match self {
            ConfiguredEngine::Local(engine) => engine.transform(stage, inputs, unit),
            ConfiguredEngine::Parallel(engine) => engine.transform(stage, inputs, unit),
        }
    }

    fn aggregate<A: Aggregate>(
        &self,
        stage: &str,
        records: Vec<(A::Key, A::Value)>,
        unit: &A,
    ) -> TriadResult<StageOutput<A::Output>> {
        match self {
            ConfiguredEngine::Local(engine) => engine.aggregate(stage, records, unit),
            ConfiguredEngine::Parallel(engine) => engine.aggregate(stage, records, unit),
        }
    }
}
