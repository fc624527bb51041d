//! CLI entry point for the disease-burden analyzer.

use anyhow::Result;
use burden_charts::PlottersRenderer;
use burden_processing::PipelineConfig;
use burden_viewer_lib::{EventSink, TerminalEvents, run_batch, run_viewer, saved_locations};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Global Disease Burden Analyzer",
    long_about = "Cleans a global health statistics dataset, reports how income, education \
                  and urbanization relate to DALYs, and draws sixteen charts.\n\n\
                  Without a subcommand the batch analysis runs first and the viewer opens \
                  afterwards.\n\n\
                  EXAMPLES:\n  \
                  # Batch run on the default dataset, then the viewer\n  \
                  burden-analyzer\n\n  \
                  # Batch only, machine-readable summary\n  \
                  burden-analyzer -i data/raw.csv --json\n\n  \
                  # Viewer only\n  \
                  burden-analyzer gui"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raw dataset to analyse
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Where the cleaned CSV is written (and read back by the viewer)
    #[arg(long, global = true)]
    cleaned: Option<PathBuf>,

    /// Where the analysis report is written
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Directory for chart images
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Seed for scatter sampling
    #[arg(long, global = true, conflicts_with = "unseeded")]
    seed: Option<u64>,

    /// Draw a fresh scatter sample on every run
    #[arg(long, global = true)]
    unseeded: bool,

    /// Maximum number of points in scatter charts
    #[arg(long, global = true)]
    sample_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print a JSON run summary to stdout instead of human-readable output
    ///
    /// Disables logging and the viewer.
    #[arg(long)]
    json: bool,

    /// Do not open the viewer after the batch run
    #[arg(long)]
    no_viewer: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive viewer without running the batch analysis
    Gui,
}

/// Discards every event.
struct Silent;

impl EventSink for Silent {
    fn emit_value(&self, _event: &str, _payload: Value) {}
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Defaults, then the config file, then flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let mut builder = base.to_builder();
    if let Some(path) = &args.input {
        builder = builder.input_path(path);
    }
    if let Some(path) = &args.cleaned {
        builder = builder.cleaned_data_path(path);
    }
    if let Some(path) = &args.report {
        builder = builder.report_path(path);
    }
    if let Some(path) = &args.assets {
        builder = builder.assets_dir(path);
    }
    if let Some(size) = args.sample_size {
        builder = builder.sample_size(size);
    }
    if let Some(seed) = args.seed {
        builder = builder.sample_seed(Some(seed));
    }
    if args.unseeded {
        builder = builder.sample_seed(None);
    }
    Ok(builder.build()?)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;

    if matches!(args.command, Some(Command::Gui)) {
        run_viewer(config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let events: Arc<dyn EventSink> = if args.json || args.quiet {
        Arc::new(Silent)
    } else {
        Arc::new(TerminalEvents)
    };

    if !args.json {
        println!("\n=== Starting Analysis ===");
        println!("\nLoading data from: {}", config.input_path.display());
    }

    let outcome = match run_batch(&config, events, &PlottersRenderer::default()) {
        Ok(outcome) => outcome,
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            } else {
                eprintln!("\n!!! Analysis Failed !!!\nError: {e}");
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.result.summary())?
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!("\n=== Analysis Complete ===");
    for line in saved_locations(&outcome, &config) {
        println!("{line}");
    }
    info!(
        duration_ms = outcome.result.duration_ms,
        charts = outcome.charts.len(),
        "Batch run finished"
    );

    if !args.no_viewer {
        run_viewer(config)?;
    }
    Ok(ExitCode::SUCCESS)
}
