//! Job configuration
//!
//! Loaded from YAML (every field optional, kebab-case keys) and overridable
//! field by field from the command line.
//!
//! ```yaml
//! engine:
//!   kind: parallel
//!   partitions: 32
//!   threads: 8
//! orientation: canonicalize
//! dedup-neighbors: true
//! intermediate-dir: /tmp/temp1
//! ```

use crate::engine::parallel::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PARTITIONS, DEFAULT_SPLIT_SIZE};
use crate::error::{TriadError, TriadResult};
use crate::stage::{EdgeOrientation, DEFAULT_BUFFER_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which engine executes the grouped stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Single-threaded, deterministic key order
    Local,
    /// Rayon workers over hash partitions
    #[default]
    Parallel,
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    pub kind: EngineKind,
    /// Hash partitions per aggregate
    pub partitions: usize,
    /// Input records per transform split
    pub split_size: usize,
    /// Executions per split/partition before the stage fails
    pub max_attempts: u32,
    /// Worker threads; 0 uses the global rayon pool
    pub threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            partitions: DEFAULT_PARTITIONS,
            split_size: DEFAULT_SPLIT_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            threads: 0,
        }
    }
}

/// Triangle job settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct JobConfig {
    pub engine: EngineConfig,
    /// Treatment of raw edges not already in ascending order
    pub orientation: EdgeOrientation,
    /// Collapse repeated neighbors in the adjacency expander
    pub dedup_neighbors: bool,
    /// Initial capacity of per-invocation buffers
    pub buffer_capacity: usize,
    /// Warn about vertices with more higher neighbors than this
    pub degree_warn_threshold: Option<usize>,
    /// Spill intermediate records here
    pub intermediate_dir: Option<PathBuf>,
    /// Spill to a fresh temp directory when `intermediate_dir` is unset;
    /// otherwise intermediate records stay in memory
    pub spill_intermediate: bool,
    /// Leave the part files (and a temp directory) behind after the job;
    /// other files in `intermediate_dir` are never removed
    pub keep_intermediate: bool,
    /// Part files written to the intermediate directory
    pub intermediate_parts: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            orientation: EdgeOrientation::default(),
            dedup_neighbors: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            degree_warn_threshold: None,
            intermediate_dir: None,
            spill_intermediate: false,
            keep_intermediate: false,
            intermediate_parts: 1,
        }
    }
}

impl JobConfig {
    pub fn from_yaml_str(yaml: &str) -> TriadResult<Self> {
        let config: JobConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> TriadResult<Self> {
        let path = path.as_ref();
        debug!("Loading job configuration from {:?}", path);
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Validate configuration
    pub fn validate(&self) -> TriadResult<()> {
        if self.engine.partitions == 0 {
            return Err(TriadError::Config("engine.partitions must be at least 1".to_string()));
        }
        if self.engine.split_size == 0 {
            return Err(TriadError::Config("engine.split-size must be at least 1".to_string()));
        }
        if self.engine.max_attempts == 0 {
            return Err(TriadError::Config("engine.max-attempts must be at least 1".to_string()));
        }
        if self.buffer_capacity == 0 {
            return Err(TriadError::Config("buffer-capacity must be at least 1".to_string()));
        }
        if self.intermediate_parts == 0 {
            return Err(TriadError::Config("intermediate-parts must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_drop_descending_edges() {
        let config = JobConfig::default();
        assert_eq!(config.orientation, EdgeOrientation::AscendingOnly);
        assert!(!config.dedup_neighbors);
        assert_eq!(config.buffer_capacity, 4096);
        assert!(config.intermediate_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "
engine:
  kind: local
  max-attempts: 5
orientation: canonicalize
dedup-neighbors: true
intermediate-dir: /tmp/temp1
";
        let config = JobConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.engine.kind, EngineKind::Local);
        assert_eq!(config.engine.max_attempts, 5);
        assert_eq!(config.engine.partitions, DEFAULT_PARTITIONS);
        assert_eq!(config.orientation, EdgeOrientation::Canonicalize);
        assert!(config.dedup_neighbors);
        assert_eq!(config.intermediate_dir, Some(PathBuf::from("/tmp/temp1")));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        // An empty document deserializes as unit, so use an explicit empty map
        let config = JobConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, JobConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = JobConfig::from_yaml_str("engine:\n  partitions: 0\n").unwrap_err();
        assert!(matches!(err, TriadError::Config(_)));

        let err = JobConfig::from_yaml_str("orientation: sideways\n").unwrap_err();
        assert!(matches!(err, TriadError::Yaml(_)));
    }

    #[test]
    fn test_from_yaml_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("job.yaml");
        std::fs::write(&path, "buffer-capacity: 16\n").unwrap();
        let config = JobConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.buffer_capacity, 16);
    }
}
