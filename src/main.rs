use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use rightscan::catalog;
use rightscan::config::LoadConfig;
use rightscan::loader::{DatasetLoader, LoadReport};
use rightscan::matcher;
use rightscan::report;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "rightscan")]
#[command(about = "Cross-reference an artist catalog against an unclaimed rights dataset")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the dataset, join the catalog, write the CSV report
    Analyze(AnalyzeArgs),
    /// Load the dataset only and print ingestion diagnostics
    Inspect(InspectArgs),
}

#[derive(Args)]
struct DatasetArgs {
    /// Path to the tab-delimited reference dataset
    #[arg(short, long)]
    dataset: String,

    /// Rows per ingestion row group
    #[arg(long, default_value_t = rightscan::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Load every column instead of pruning by keyword
    #[arg(long)]
    no_prune: bool,

    /// Keep rows whose ISRC is missing or blank
    #[arg(long)]
    keep_invalid: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Path to the artist catalog JSON export
    #[arg(short, long)]
    catalog: String,

    /// Output directory for the CSV report
    #[arg(short, long)]
    output: String,
}

#[derive(Args)]
struct InspectArgs {
    #[command(flatten)]
    dataset: DatasetArgs,
}

impl DatasetArgs {
    fn load_config(&self) -> LoadConfig {
        LoadConfig {
            chunk_size: self.chunk_size,
            prune_columns: !self.no_prune,
            filter_invalid: !self.keep_invalid,
            ..LoadConfig::default()
        }
    }
}

fn load_dataset(args: &DatasetArgs) -> Result<(rightscan::index::ReferenceIndex, LoadReport)> {
    let pb = ProgressBar::new_spinner();
    let spinner = pb.clone();

    let mut loader = DatasetLoader::new(&args.dataset, args.load_config()).with_progress(
        move |progress| {
            spinner.set_message(format!(
                "chunk {}: {} rows, {} distinct ISRCs",
                progress.chunk, progress.rows_retained, progress.distinct_keys
            ));
            spinner.tick();
        },
    );

    let start = Instant::now();
    let result = loader.load();
    pb.finish_and_clear();

    let (index, load_report) = result
        .with_context(|| format!("Failed to load reference dataset: {}", args.dataset))?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        "Ingestion complete"
    );
    Ok((index, load_report))
}

fn print_load_summary(load_report: &LoadReport, elapsed_secs: f64) {
    println!();
    println!("=== Ingestion Summary ===");
    println!("Load time:           {:.2}s", elapsed_secs);
    println!("Rows retained:       {}", load_report.rows_retained);
    println!("Distinct ISRCs:      {}", load_report.distinct_keys);
    println!("Dropped (no key):    {}", load_report.rows_missing_key);
    println!("Dropped (bad row):   {}", load_report.rows_undecodable);
    println!("Row groups:          {}", load_report.chunks_processed);
    println!(
        "Approx memory:       {:.1} MB",
        load_report.approx_memory_bytes as f64 / (1024.0 * 1024.0)
    );
    if load_report.degraded {
        println!("WARNING: no ISRC column found; index cannot be searched");
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let start = Instant::now();
    let (index, load_report) = load_dataset(&args.dataset)?;
    let load_secs = start.elapsed().as_secs_f64();

    if load_report.degraded {
        warn!("Dataset has no ISRC column; the report will contain no matches");
    }

    let tracks = catalog::load_catalog(Path::new(&args.catalog))?;
    let (matches, stats) = matcher::cross_reference(&tracks, &index);
    report::write_report(&args.output, &matches, &stats)?;

    print_load_summary(&load_report, load_secs);
    println!();
    println!("=== Match Summary ===");
    println!("Catalog tracks:      {}", stats.total_catalog_tracks);
    println!("Tracks with ISRC:    {}", stats.tracks_with_key);
    println!("Matches found:       {}", stats.matches_found);
    println!("Match rate:          {:.2}%", stats.match_rate);
    println!("Distinct albums:     {}", stats.distinct_collections);
    if let Some(avg) = stats.avg_unclaimed_percentage {
        println!("Avg unclaimed share: {:.2}%", avg);
    }
    println!();
    println!("Report written to: {}", args.output);

    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let start = Instant::now();
    let (_, load_report) = load_dataset(&args.dataset)?;
    print_load_summary(&load_report, start.elapsed().as_secs_f64());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Inspect(args) => run_inspect(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
