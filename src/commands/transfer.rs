// src/commands/transfer.rs
//! Transfer command

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tfstate_transfer::report::{self, ReportFormat};
use tfstate_transfer::{Orchestrator, ProgressTracker, RunConfig, RunOptions, TerraformBackend};
use tracing::info;

/// Run a transfer and print its report to stdout.
///
/// Per-resource failures are part of the report and do not fail the
/// command. Configuration problems, a failed state pull and a failed
/// removal do.
pub fn cmd_transfer(
    options: &RunOptions,
    terraform_bin: Option<&Path>,
    format: ReportFormat,
    progress: Box<dyn ProgressTracker>,
) -> Result<()> {
    let config = RunConfig::from_options(options)?;
    let backend = TerraformBackend::locate(terraform_bin)?;
    info!("Using {}", backend.binary().display());

    let report = Orchestrator::new(&config, &backend)
        .with_progress(progress)
        .run()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::render(&report, format, &mut out).context("Failed to write run report")?;
    out.flush()?;

    Ok(())
}
