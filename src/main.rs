// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::io;
use tfstate_transfer::{CliProgress, LogProgress, ProgressTracker, ReportFormat, RunOptions};
use tracing_subscriber::EnvFilter;

/// Whether a live progress bar may own the terminal.
///
/// JSON output is meant for other programs, and verbose runs print a log
/// line per step, so both get log-based progress instead.
fn wants_progress_bar(format: ReportFormat, verbose: bool) -> bool {
    format == ReportFormat::Text && !verbose
}

/// Install the tracing subscriber.
///
/// Logs go to stderr; stdout carries the report. With a progress bar on
/// screen, each log line suspends the bar while it is written.
fn init_logging(verbose: bool, bar: Option<&CliProgress>) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match bar {
        Some(bar) => {
            let writer = bar.log_writer();
            builder.with_writer(move || writer.clone()).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };

    let bar = wants_progress_bar(format, cli.verbose).then(|| CliProgress::new("Transferring"));
    init_logging(cli.verbose, bar.as_ref());
    let progress: Box<dyn ProgressTracker> = match bar {
        Some(bar) => Box::new(bar),
        None => Box::new(LogProgress::new("transfer")),
    };

    let options = RunOptions {
        source_dir: cli.source_dir,
        target_dir: cli.target_dir,
        config_file: cli.config_file,
        resources: cli.resources,
        dry_run: cli.dry_run,
    };

    commands::cmd_transfer(&options, cli.terraform_bin.as_deref(), format, progress)
}
