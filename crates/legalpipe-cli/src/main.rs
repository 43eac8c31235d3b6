//! legalpipe CLI - command-line interface for the legal-case PDF
//! classification and segmentation pipeline.
//!
//! # Exit Codes
//!
//! - 0: every PDF processed to completion
//! - 130: interrupted by Ctrl-C after finishing the stage in flight
//! - 1: any other error (invalid arguments, unreadable checkpoint, I/O failure)

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use legalpipe::extract::Capabilities;
use legalpipe::orchestrate;
use legalpipe::PipelineConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Classify and segment Brazilian legal-case PDFs into provenance-tagged Markdown.
#[derive(Parser)]
#[command(name = "legalpipe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// A single PDF, or a directory to process recursively.
    #[arg(short, long, required_unless_present = "resume")]
    source: Option<PathBuf>,

    /// Output directory for every generated artifact. Defaults to the current directory.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Resume a previously interrupted single-PDF run from its checkpoint file.
    #[arg(long, conflicts_with = "source")]
    resume: Option<PathBuf>,

    /// Path to a legalpipe.{toml,yaml,json} configuration file. If not given,
    /// the same file is discovered by walking up from the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .try_init();

    match run(cli) {
        Ok(true) => ExitCode::from(130),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:?}");
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(true)` when the run stopped early because of an interrupt.
fn run(cli: Cli) -> Result<bool> {
    let start_dir = std::env::current_dir().context("failed to determine current directory")?;
    let cfg = PipelineConfig::load(cli.config.as_deref(), &start_dir).context("failed to load pipeline configuration")?;
    let caps = Capabilities::discover();

    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received, finishing the current stage before stopping");
        handler_flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl-C handler")?;

    if let Some(checkpoint_path) = cli.resume {
        let (batch, stopped) = orchestrate::resume(&checkpoint_path, &cfg, &caps, &interrupted)
            .with_context(|| format!("failed to resume from checkpoint '{}'", checkpoint_path.display()))?;
        print_batch_summary(&batch);
        return Ok(stopped);
    }

    let source = cli.source.expect("clap guarantees --source when --resume is absent");
    std::fs::create_dir_all(&cli.output).with_context(|| format!("failed to create output directory '{}'", cli.output.display()))?;

    let (batch, stopped) = orchestrate::run(&source, &cli.output, &cfg, &caps, &interrupted)
        .with_context(|| format!("pipeline run over '{}' failed", source.display()))?;
    print_batch_summary(&batch);
    Ok(stopped)
}

fn print_batch_summary(batch: &legalpipe::types::BatchReport) {
    println!(
        "{} file(s) processed: {} passed, {} flagged, {} rejected ({} mislabel(s) caught)",
        batch.reports.len(),
        batch.summary.passed,
        batch.summary.flagged,
        batch.summary.rejected,
        batch.summary.mislabels_caught,
    );
    for report in &batch.reports {
        if report.review_needed {
            println!("  needs review: {} ({})", report.source, report.review_reasons.join(", "));
        }
    }
}
