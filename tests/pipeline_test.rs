use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tempfile::TempDir;
use triadflow::{
    ConfiguredEngine, CancellationToken, EdgeOrientation, EngineConfig, EngineKind, InputLine,
    JobConfig, LocalEngine, ParallelEngine, ShuffleEngine, TriadError, Triangle, TriangleJob,
};
use triadflow_algorithms::{list_triangles, GraphView};

fn edge_lines(edges: &[(u64, u64)]) -> Vec<InputLine> {
    InputLine::numbered(edges.iter().map(|(a, b)| format!("{} {}", a, b)))
}

fn run_with<E: ShuffleEngine>(engine: E, config: JobConfig, edges: &[(u64, u64)]) -> Vec<Triangle> {
    TriangleJob::new(engine, config)
        .run_lines(&edge_lines(edges))
        .unwrap()
        .triangles
}

fn sorted_strings(triangles: &[Triangle]) -> Vec<String> {
    let mut lines: Vec<String> = triangles.iter().map(|t| t.to_string()).collect();
    lines.sort();
    lines
}

/// Simple graph with every edge listed once, ascending
fn random_simple_graph(seed: u64, vertices: u64, edges: usize) -> Vec<(u64, u64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    while out.len() < edges {
        let a = rng.gen_range(0..vertices);
        let b = rng.gen_range(0..vertices);
        if a == b {
            continue;
        }
        let edge = (a.min(b), a.max(b));
        if seen.insert(edge) {
            out.push(edge);
        }
    }
    out
}

#[test]
fn test_single_triangle_scenario() {
    let triangles = run_with(LocalEngine::new(), JobConfig::default(), &[(1, 2), (1, 3), (2, 3)]);
    assert_eq!(sorted_strings(&triangles), vec!["2,3,1"]);
}

#[test]
fn test_open_path_scenario() {
    let triangles = run_with(LocalEngine::new(), JobConfig::default(), &[(1, 2), (2, 3)]);
    assert!(triangles.is_empty());
}

#[test]
fn test_complete_graph_scenario_on_parallel_engine() {
    let edges = [(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)];
    let triangles = run_with(ParallelEngine::new(3).with_split_size(2), JobConfig::default(), &edges);
    assert_eq!(
        sorted_strings(&triangles),
        vec!["2,3,1", "2,4,1", "3,4,1", "3,4,2"]
    );
}

#[test]
fn test_random_graphs_match_reference() {
    for seed in 0..5 {
        let edges = random_simple_graph(seed, 60, 500);
        let reference: Vec<[u64; 3]> = list_triangles(&GraphView::from_edges(edges.clone()))
            .iter()
            .map(|t| [t.a, t.b, t.c])
            .collect();

        for engine_kind in [EngineKind::Local, EngineKind::Parallel] {
            let config = JobConfig {
                engine: EngineConfig {
                    kind: engine_kind,
                    partitions: 7,
                    split_size: 50,
                    ..Default::default()
                },
                ..Default::default()
            };
            let engine = ConfiguredEngine::from_config(&config.engine, CancellationToken::new()).unwrap();
            let triangles = run_with(engine, config, &edges);

            // Each output is q,r,p with p < q < r
            for t in &triangles {
                assert!(t.apex < t.closing.first, "{}", t);
                assert!(t.closing.first < t.closing.second, "{}", t);
            }

            // No duplicates, nothing missing, no false positives
            let mut found: Vec<[u64; 3]> = triangles.iter().map(|t| t.vertices().map(|v| v.as_u64())).collect();
            found.sort_unstable();
            assert_eq!(found, reference, "seed {}", seed);
        }
    }
}

#[test]
fn test_no_output_for_pairs_that_are_not_edges() {
    let edges = random_simple_graph(11, 40, 200);
    let edge_set: HashSet<(u64, u64)> = edges.iter().copied().collect();
    let triangles = run_with(LocalEngine::new(), JobConfig::default(), &edges);
    for t in triangles {
        let closing = (t.closing.first.as_u64(), t.closing.second.as_u64());
        assert!(edge_set.contains(&closing));
    }
}

#[test]
fn test_intermediate_count_is_degree_proportional() {
    let edges = random_simple_graph(3, 30, 120);
    let output = TriangleJob::new(LocalEngine::new(), JobConfig::default())
        .run_lines(&edge_lines(&edges))
        .unwrap();

    let mut higher_degree = std::collections::HashMap::new();
    for (low, _) in &edges {
        *higher_degree.entry(*low).or_insert(0u64) += 1;
    }
    let expected: u64 = higher_degree.values().map(|d| d + d * (d - 1) / 2).sum();
    assert_eq!(output.report.intermediate_records, expected);
    assert_eq!(output.report.crossproduct.groups, higher_degree.len() as u64);
}

#[test]
fn test_descending_edges_dropped_unless_canonicalized() {
    let edges = [(1, 2), (3, 1), (2, 3)];

    let ascending = run_with(LocalEngine::new(), JobConfig::default(), &edges);
    assert!(ascending.is_empty());

    let config = JobConfig {
        orientation: EdgeOrientation::Canonicalize,
        ..Default::default()
    };
    let canonical = run_with(LocalEngine::new(), config, &edges);
    assert_eq!(sorted_strings(&canonical), vec!["2,3,1"]);
}

#[test]
fn test_duplicate_edges() {
    let edges = [(1, 2), (1, 3), (2, 3), (1, 3)];

    let raw = run_with(LocalEngine::new(), JobConfig::default(), &edges);
    assert_eq!(sorted_strings(&raw), vec!["2,3,1", "2,3,1"]);

    let config = JobConfig {
        dedup_neighbors: true,
        ..Default::default()
    };
    let deduped = run_with(LocalEngine::new(), config, &edges);
    assert_eq!(sorted_strings(&deduped), vec!["2,3,1"]);
}

#[test]
fn test_spilled_intermediate_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("temp1");
    let config = JobConfig {
        intermediate_dir: Some(dir.clone()),
        keep_intermediate: true,
        intermediate_parts: 2,
        ..Default::default()
    };

    let triangles = run_with(ParallelEngine::new(2), config, &[(1, 2), (1, 3), (2, 3)]);
    assert_eq!(sorted_strings(&triangles), vec!["2,3,1"]);

    let mut stored = Vec::new();
    for part in ["part-r-00000", "part-r-00001"] {
        let text = std::fs::read_to_string(dir.join(part)).unwrap();
        stored.extend(text.lines().map(|l| l.to_string()));
    }
    stored.sort();
    assert_eq!(stored, vec!["1,2\t-1", "1,3\t-1", "2,3\t-1", "2,3\t1"]);
}

#[test]
fn test_run_file_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("edges.txt");
    let output = temp_dir.path().join("triangles.txt");
    std::fs::write(&input, "1 2\n\n1 3\n2 3\n3 4\n").unwrap();

    let job = TriangleJob::new(ParallelEngine::new(4), JobConfig::default());
    let report = job.run_file(&input, &output).unwrap();

    assert_eq!(report.triangle_count, 1);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "2,3,1\n");
}

#[test]
fn test_malformed_input_fails_before_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("edges.txt");
    let output = temp_dir.path().join("triangles.txt");
    std::fs::write(&input, "1 2\n1 3\n42\n2 3\n").unwrap();

    let job = TriangleJob::new(ParallelEngine::new(4).with_max_attempts(2), JobConfig::default());
    let err = job.run_file(&input, &output).unwrap_err();

    match err {
        TriadError::StageFailed { ref stage, attempts, .. } => {
            assert_eq!(stage, "crossproduct");
            assert_eq!(attempts, 2);
        }
        ref other => panic!("expected stage failure, got {:?}", other),
    }
    assert!(matches!(err.root_cause(), TriadError::Parse { line: 3, .. }));
    assert!(!output.exists());
}
