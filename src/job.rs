//! Two-stage triangle job
//!
//! ```text
//! raw edges -> EdgeNormalizer -> [shuffle by low] -> AdjacencyExpander
//!           -> intermediate store (barrier)
//!           -> CandidateRegrouper -> [shuffle by pair] -> ClosureDetector -> triangles
//! ```

use crate::codec::InputLine;
use crate::config::JobConfig;
use crate::engine::{ShuffleEngine, StageMetrics};
use crate::error::TriadResult;
use crate::graph::Triangle;
use crate::persistence::{DirectoryStore, IntermediateStore, MemoryStore};
use crate::stage::{AdjacencyExpander, CandidateRegrouper, ClosureDetector, EdgeNormalizer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Name of the first grouped stage (normalize + expand)
pub const CROSS_PRODUCT_STAGE: &str = "crossproduct";
/// Name of the second grouped stage (regroup + detect)
pub const TRIANGLES_STAGE: &str = "triangles";

/// Counters for a completed job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub crossproduct: StageMetrics,
    pub triangles: StageMetrics,
    /// Lines materialized between the stages
    pub intermediate_records: u64,
    pub triangle_count: u64,
}

impl JobReport {
    pub fn to_json(&self) -> TriadResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Triangles found by a job, in engine output order
#[derive(Debug)]
pub struct JobOutput {
    pub triangles: Vec<Triangle>,
    pub report: JobReport,
}

/// Runs both grouped stages on an injected engine
pub struct TriangleJob<E: ShuffleEngine> {
    engine: E,
    config: JobConfig,
}

impl<E: ShuffleEngine> TriangleJob<E> {
    pub fn new(engine: E, config: JobConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    fn open_store(&self) -> TriadResult<Box<dyn IntermediateStore>> {
        let config = &self.config;
        let store = match &config.intermediate_dir {
            Some(dir) => DirectoryStore::new(dir, config.intermediate_parts)?,
            None if config.spill_intermediate => DirectoryStore::temporary(config.intermediate_parts)?,
            None => return Ok(Box::new(MemoryStore::new())),
        };
        Ok(Box::new(store.keep(config.keep_intermediate)))
    }

    /// Run both stages over numbered edge lines
    pub fn run_lines(&self, lines: &[InputLine]) -> TriadResult<JobOutput> {
        let config = &self.config;
        let normalizer = EdgeNormalizer::new(config.orientation);
        let expander = AdjacencyExpander::new()
            .with_buffer_capacity(config.buffer_capacity)
            .with_dedup_neighbors(config.dedup_neighbors)
            .with_degree_warn_threshold(config.degree_warn_threshold);
        let detector = ClosureDetector::new().with_buffer_capacity(config.buffer_capacity);

        info!("[{}] starting on {} input lines", CROSS_PRODUCT_STAGE, lines.len());
        let stage1 = self
            .engine
            .map_reduce(CROSS_PRODUCT_STAGE, lines, &normalizer, &expander)?;
        info!(
            "[{}] done: {} edges, {} vertices, {} records in {} ms",
            CROSS_PRODUCT_STAGE,
            stage1.metrics.shuffled_records,
            stage1.metrics.groups,
            stage1.metrics.output_records,
            stage1.metrics.elapsed_ms
        );

        let mut store = self.open_store()?;
        let intermediate_records = store.write(&stage1.records)?;
        drop(stage1.records);
        let intermediate = store.read()?;

        info!("[{}] starting on {} intermediate lines", TRIANGLES_STAGE, intermediate.len());
        let stage2 = self
            .engine
            .map_reduce(TRIANGLES_STAGE, &intermediate, &CandidateRegrouper, &detector)?;
        info!(
            "[{}] done: {} pairs, {} triangles in {} ms",
            TRIANGLES_STAGE, stage2.metrics.groups, stage2.metrics.output_records, stage2.metrics.elapsed_ms
        );

        let report = JobReport {
            crossproduct: stage1.metrics,
            triangle_count: stage2.records.len() as u64,
            triangles: stage2.metrics,
            intermediate_records,
        };
        Ok(JobOutput {
            triangles: stage2.records,
            report,
        })
    }

    /// Run over edge lines read from `reader`
    pub fn run_reader<R: BufRead>(&self, reader: R) -> TriadResult<JobOutput> {
        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            lines.push(InputLine::new(i as u64 + 1, line?));
        }
        self.run_lines(&lines)
    }

    /// Read edges from `input` and write one `q,r,p` line per triangle to `output`.
    ///
    /// Nothing is written unless both stages succeed.
    pub fn run_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> TriadResult<JobReport> {
        let input = input.as_ref();
        let output = output.as_ref();
        info!("Reading edges from {:?}", input);
        let result = self.run_reader(BufReader::new(File::open(input)?))?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(output)?);
        for triangle in &result.triangles {
            writeln!(writer, "{}", triangle)?;
        }
        writer.flush()?;
        info!("Wrote {} triangles to {:?}", result.report.triangle_count, output);
        Ok(result.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LocalEngine;
    use crate::error::TriadError;

    fn run(edges: &[&str]) -> TriadResult<JobOutput> {
        TriangleJob::new(LocalEngine::new(), JobConfig::default()).run_lines(&InputLine::numbered(edges.iter().copied()))
    }

    fn lines(output: &JobOutput) -> Vec<String> {
        output.triangles.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_single_triangle() {
        let output = run(&["1 2", "1 3", "2 3"]).unwrap();
        assert_eq!(lines(&output), vec!["2,3,1"]);
        assert_eq!(output.report.triangle_count, 1);
        // 3 exists markers + 1 candidate from vertex 1
        assert_eq!(output.report.intermediate_records, 4);
        assert_eq!(output.report.crossproduct.groups, 2);
    }

    #[test]
    fn test_open_path_has_no_triangle() {
        let output = run(&["1 2", "2 3"]).unwrap();
        assert!(output.triangles.is_empty());
    }

    #[test]
    fn test_complete_graph_on_four_vertices() {
        let output = run(&["1 2", "1 3", "1 4", "2 3", "2 4", "3 4"]).unwrap();
        let mut got = lines(&output);
        got.sort();
        assert_eq!(got, vec!["2,3,1", "2,4,1", "3,4,1", "3,4,2"]);
    }

    #[test]
    fn test_malformed_line_fails_stage_one() {
        let err = run(&["1 2", "7", "2 3"]).unwrap_err();
        match err.root_cause() {
            TriadError::Parse { line, .. } => assert_eq!(*line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_file_writes_nothing_on_failure() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let input = temp_dir.path().join("edges.txt");
        let output = temp_dir.path().join("out").join("triangles.txt");
        std::fs::write(&input, "1 2\n3\n").unwrap();

        let job = TriangleJob::new(LocalEngine::new(), JobConfig::default());
        assert!(job.run_file(&input, &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_spill_to_temporary_directory() {
        let config = JobConfig {
            spill_intermediate: true,
            intermediate_parts: 3,
            ..Default::default()
        };
        let output = TriangleJob::new(LocalEngine::new(), config)
            .run_lines(&InputLine::numbered(["1 2", "1 3", "2 3"]))
            .unwrap();
        assert_eq!(lines(&output), vec!["2,3,1"]);
    }

    #[test]
    fn test_existing_intermediate_dir_contents_survive_job() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let work = temp_dir.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        std::fs::write(work.join("precious.txt"), "do not delete").unwrap();

        let config = JobConfig {
            intermediate_dir: Some(work.clone()),
            intermediate_parts: 2,
            ..Default::default()
        };
        let output = TriangleJob::new(LocalEngine::new(), config)
            .run_lines(&InputLine::numbered(["1 2", "1 3", "2 3"]))
            .unwrap();

        assert_eq!(lines(&output), vec!["2,3,1"]);
        assert_eq!(std::fs::read_to_string(work.join("precious.txt")).unwrap(), "do not delete");
        assert_eq!(std::fs::read_dir(&work).unwrap().count(), 1);
    }

    #[test]
    fn test_report_json() {
        let output = run(&["1 2", "1 3", "2 3"]).unwrap();
        let json = output.report.to_json().unwrap();
        assert!(json.contains("\"triangle_count\": 1"));
        assert!(json.contains("\"crossproduct\""));
    }
}
