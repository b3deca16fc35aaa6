use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use plume::config;
use plume::extract::{self, ExtractOptions};
use plume::resume;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "plume")]
#[command(about = "Mine sentence-correction pairs from wiki revision histories")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every dump file in a directory with a worker pool
    Extract(ExtractArgs),
    /// Extract a single dump file with one worker
    ExtractFile(ExtractFileArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Directory containing the dump files (.xml or .xml.bz2)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for result CSVs and reports
    #[arg(short, long)]
    output: PathBuf,

    /// Number of parallel workers (capped at the number of cpu cores)
    #[arg(short, long, default_value_t = 8)]
    workers: usize,

    /// Directory of previous results used to skip already-extracted pages
    #[arg(long)]
    resume_from: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Args)]
struct ExtractFileArgs {
    /// Path to one dump file (.xml or .xml.bz2)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for result CSVs
    #[arg(short, long)]
    output: PathBuf,

    /// Worker id used in result file names
    #[arg(long, default_value_t = 0)]
    worker_id: usize,

    /// Directory of previous results used to skip already-extracted pages
    #[arg(long)]
    resume_from: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Args)]
struct OptionArgs {
    /// Minimum number of revisions a page must have
    #[arg(long, default_value_t = config::DEFAULT_MIN_REVISIONS)]
    min_revisions: usize,

    /// Maximum number of revisions a page may have
    #[arg(long, default_value_t = config::DEFAULT_MAX_REVISIONS)]
    max_revisions: usize,

    /// Combine the revision bounds with OR (historical behavior, admits
    /// nearly every page)
    #[arg(long)]
    legacy_revision_bounds: bool,

    /// Minimum similarity ratio for accepting a sentence match
    #[arg(long, default_value_t = config::DEFAULT_CUTOFF)]
    cutoff: f32,

    /// Initial seconds between checkpoint flushes (doubles after each flush)
    #[arg(long, default_value_t = config::DEFAULT_SAVE_INTERVAL_SECS)]
    save_interval: u64,

    /// Keep dump files instead of deleting them after extraction
    #[arg(long)]
    keep_sources: bool,
}

impl OptionArgs {
    fn to_options(&self) -> ExtractOptions {
        ExtractOptions {
            min_revisions: self.min_revisions,
            max_revisions: self.max_revisions,
            legacy_revision_bounds: self.legacy_revision_bounds,
            cutoff: self.cutoff,
            save_interval: Duration::from_secs(self.save_interval),
            keep_sources: self.keep_sources,
        }
    }
}

fn load_resume_set(path: Option<&PathBuf>) -> Result<FxHashSet<String>> {
    match path {
        Some(dir) => resume::load_extracted_titles(dir),
        None => Ok(FxHashSet::default()),
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory: {}", args.output.display()))?;

    let resume_set = load_resume_set(args.resume_from.as_ref())?;
    let opts = args.options.to_options();

    let started = Instant::now();
    let summary = extract::run_extraction(
        &args.input,
        &args.output,
        &resume_set,
        args.workers,
        &opts,
    )?;
    let elapsed = started.elapsed();

    println!();
    println!("=== Summary ===");
    println!("Files extracted:     {}", summary.files.len());
    println!("Pages extracted:     {}", summary.totals.pages_extracted);
    println!("Revisions extracted: {}", summary.totals.revisions_extracted);
    println!("Pairs extracted:     {}", summary.totals.pairs_extracted);
    println!("Total time:          {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

fn run_extract_file(args: ExtractFileArgs) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory: {}", args.output.display()))?;

    let resume_set = load_resume_set(args.resume_from.as_ref())?;
    let opts = args.options.to_options();

    let started = Instant::now();
    let spinner = ProgressBar::new_spinner();
    let stats = extract::extract_file(
        &args.input,
        &args.output,
        args.worker_id,
        &resume_set,
        &opts,
        Some(&spinner),
    )?;
    spinner.finish_and_clear();
    let elapsed = started.elapsed();

    println!();
    println!("=== Summary ===");
    println!("Pages extracted:     {}", stats.pages_extracted);
    println!("Revisions extracted: {}", stats.revisions_extracted);
    println!("Pairs extracted:     {}", stats.pairs_extracted);
    println!("Total time:          {:.2}s", elapsed.as_secs_f64());

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
        Commands::Extract(args) => run_extract(args),
        Commands::ExtractFile(args) => run_extract_file(args),
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
