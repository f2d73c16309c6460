//! Triadflow CLI — runs the two-stage triangle job on an edge-list file

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;
use triadflow::codec::parse_edge_line;
use triadflow::{
    CancellationToken, ConfiguredEngine, EdgeNormalizer, EdgeOrientation, EngineKind, JobConfig,
    JobReport, StageMetrics, TriangleJob,
};
use triadflow_algorithms::{list_triangles, GraphView};

#[derive(Parser)]
#[command(name = "triadflow", version, about = "Exact triangle enumeration over grouped stages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Args)]
struct JobArgs {
    /// YAML job configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Execution engine
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,

    /// Hash partitions per grouped stage
    #[arg(long)]
    partitions: Option<usize>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Spill intermediate records to this directory
    #[arg(long)]
    intermediate: Option<PathBuf>,

    /// Spill intermediate records to a temporary directory
    #[arg(long)]
    spill: bool,

    /// Keep the intermediate part files after the job
    #[arg(long)]
    keep_intermediate: bool,

    /// Swap descending edges instead of dropping them
    #[arg(long)]
    canonicalize: bool,

    /// Collapse duplicate edges per vertex
    #[arg(long)]
    dedup: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum EngineArg {
    Local,
    Parallel,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every triangle of INPUT to OUTPUT as `q,r,p` lines
    Run {
        input: PathBuf,
        output: PathBuf,

        #[command(flatten)]
        job: JobArgs,

        /// Report format printed after the job
        #[arg(long, value_enum, default_value = "text")]
        report: ReportFormat,
    },
    /// Print the number of triangles in INPUT
    Count {
        input: PathBuf,

        #[command(flatten)]
        job: JobArgs,
    },
    /// Cross-check the pipeline against the in-memory reference
    Verify {
        input: PathBuf,

        #[command(flatten)]
        job: JobArgs,
    },
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { input, output, job, report } => run(&input, &output, &job, &report),
        Commands::Count { input, job } => count(&input, &job),
        Commands::Verify { input, job } => verify(&input, &job),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &JobArgs) -> anyhow::Result<JobConfig> {
    let mut config = match &args.config {
        Some(path) => JobConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => JobConfig::default(),
    };

    if let Some(engine) = &args.engine {
        config.engine.kind = match engine {
            EngineArg::Local => EngineKind::Local,
            EngineArg::Parallel => EngineKind::Parallel,
        };
    }
    if let Some(partitions) = args.partitions {
        config.engine.partitions = partitions;
    }
    if let Some(threads) = args.threads {
        config.engine.threads = threads;
    }
    if let Some(dir) = &args.intermediate {
        config.intermediate_dir = Some(dir.clone());
    }
    if args.spill {
        config.spill_intermediate = true;
    }
    if args.keep_intermediate {
        config.keep_intermediate = true;
    }
    if args.canonicalize {
        config.orientation = EdgeOrientation::Canonicalize;
    }
    if args.dedup {
        config.dedup_neighbors = true;
    }

    config.validate()?;
    Ok(config)
}

fn build_job(args: &JobArgs) -> anyhow::Result<TriangleJob<ConfiguredEngine>> {
    let config = load_config(args)?;
    let engine = ConfiguredEngine::from_config(&config.engine, CancellationToken::new())?;
    Ok(TriangleJob::new(engine, config))
}

fn open(input: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    Ok(BufReader::new(file))
}

fn run(input: &Path, output: &Path, args: &JobArgs, format: &ReportFormat) -> anyhow::Result<()> {
    let job = build_job(args)?;
    let report = job.run_file(input, output)?;

    match format {
        ReportFormat::Json => println!("{}", report.to_json()?),
        ReportFormat::Text => print_report(&report),
    }
    Ok(())
}

fn count(input: &Path, args: &JobArgs) -> anyhow::Result<()> {
    let job = build_job(args)?;
    let output = job.run_reader(open(input)?)?;
    println!("{}", output.report.triangle_count);
    Ok(())
}

fn verify(input: &Path, args: &JobArgs) -> anyhow::Result<()> {
    let job = build_job(args)?;
    let output = job.run_reader(open(input)?)?;

    let mut pipeline: Vec<[u64; 3]> = output
        .triangles
        .iter()
        .map(|t| t.vertices().map(|v| v.as_u64()))
        .collect();
    pipeline.sort_unstable();

    // The reference sees exactly the edges the normalizer keeps
    let normalizer = EdgeNormalizer::new(job.config().orientation);
    let mut edges = Vec::new();
    for (i, line) in open(input)?.lines().enumerate() {
        if let Some((a, b)) = parse_edge_line(i as u64 + 1, &line?)? {
            if let Some((low, high)) = normalizer.normalize(a, b) {
                edges.push((low.as_u64(), high.as_u64()));
            }
        }
    }
    let view = GraphView::from_edges(edges);
    let reference: Vec<[u64; 3]> = list_triangles(&view).iter().map(|t| [t.a, t.b, t.c]).collect();

    info!(
        "Reference graph: {} vertices, {} edges",
        view.node_count,
        view.edge_count()
    );

    if pipeline != reference {
        bail!(
            "mismatch: pipeline found {} triangles, reference found {}",
            pipeline.len(),
            reference.len()
        );
    }
    println!("OK: {} triangles", reference.len());
    Ok(())
}

fn print_report(report: &JobReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "stage", "input", "shuffled", "groups", "output", "attempts", "ms",
    ]);
    for metrics in [&report.crossproduct, &report.triangles] {
        table.add_row(stage_row(metrics));
    }
    println!("{}", table);
    println!("{} intermediate record(s)", report.intermediate_records);
    println!("{} triangle(s)", report.triangle_count);
}

fn stage_row(metrics: &StageMetrics) -> Vec<String> {
    vec![
        metrics.stage.clone(),
        metrics.input_records.to_string(),
        metrics.shuffled_records.to_string(),
        metrics.groups.to_string(),
        metrics.output_records.to_string(),
        metrics.attempts.to_string(),
        metrics.elapsed_ms.to_string(),
    ]
}
