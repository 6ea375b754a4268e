// src/report.rs

//! Rendering run reports
//!
//! Executed runs are shown as a table of per-resource outcomes, dry runs as
//! the list of commands that would have been executed. Both can also be
//! emitted as JSON. Output goes to any writer so callers decide between
//! stdout and a buffer.
//!
//! Table rows are green for transferred resources and red for failed ones
//! when stdout supports colors.

use console::{Style, StyledObject};
use std::io::{self, Write};

use crate::error::Result;
use crate::tracker::RunOutcome;
use crate::transfer::{DryRunPlan, RunReport};

/// Output format for a run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Write a run report in the given format
pub fn render<W: Write>(report: &RunReport, format: ReportFormat, out: &mut W) -> Result<()> {
    match format {
        ReportFormat::Text => render_text(report, console::colors_enabled(), out)?,
        ReportFormat::Json => render_json(report, out)?,
    }
    Ok(())
}

/// Write a run report as pretty-printed JSON
pub fn render_json<W: Write>(report: &RunReport, out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Write a run report as human-readable text, optionally colored
pub fn render_text<W: Write>(report: &RunReport, color: bool, out: &mut W) -> io::Result<()> {
    match report {
        RunReport::Executed {
            outcomes,
            removed,
            warnings,
        } => {
            write_outcomes(outcomes, removed, color, out)?;
            write_warnings(warnings, out)
        }
        RunReport::DryRun { plan, warnings } => {
            write_plan(plan, out)?;
            write_warnings(warnings, out)
        }
    }
}

const HEADERS: [&str; 5] = ["PARENT", "SOURCE", "TARGET", "SUCCESS", "ERROR"];

fn write_outcomes<W: Write>(
    outcomes: &[RunOutcome],
    removed: &[String],
    color: bool,
    out: &mut W,
) -> io::Result<()> {
    if outcomes.is_empty() {
        writeln!(out, "No resources matched.")?;
        return Ok(());
    }

    let rows: Vec<[String; 5]> = outcomes
        .iter()
        .map(|o| {
            [
                o.top_level_key.clone(),
                o.source_address.clone(),
                o.target_address.clone(),
                if o.succeeded { "yes" } else { "no" }.to_string(),
                o.error.map_or_else(|| "N/A".to_string(), |e| e.to_string()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    writeln!(out, "{}", format_row(&HEADERS.map(String::from), &widths))?;
    writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)))?;

    for (row, outcome) in rows.iter().zip(outcomes) {
        let style = if outcome.succeeded {
            Style::new().green()
        } else {
            Style::new().red()
        };
        writeln!(out, "{}", paint(&style, format_row(row, &widths), color))?;
        if let Some(suggestion) = &outcome.suggestion {
            writeln!(out, "  hint: {}", suggestion)?;
        }
    }

    let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
    writeln!(
        out,
        "\n{} transferred, {} failed, {} parent(s) removed from source state",
        succeeded,
        outcomes.len() - succeeded,
        removed.len()
    )?;
    for parent in removed {
        writeln!(out, "  - {}", parent)?;
    }
    Ok(())
}

/// Pad cells to their column width; padding happens before any styling
fn format_row(row: &[String; 5], widths: &[usize; 5]) -> String {
    let line = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn paint(style: &Style, line: String, color: bool) -> StyledObject<String> {
    style.apply_to(line).force_styling(color)
}

fn write_plan<W: Write>(plan: &DryRunPlan, out: &mut W) -> io::Result<()> {
    if plan.is_empty() {
        writeln!(out, "No resources matched.")?;
        return Ok(());
    }

    writeln!(out, "Dry run: no changes will be made.")?;
    for (parent, entry) in plan.iter() {
        writeln!(out, "\nCommands for transferring {}", parent)?;
        for command in &entry.claim_commands {
            writeln!(out, "  + {}", command)?;
        }
        for address in &entry.unclaimable {
            writeln!(out, "  ! {} has no import identifier", address)?;
        }
        match &entry.removal_command {
            Some(command) => writeln!(out, "  - {}", command)?,
            None => writeln!(out, "  {} would stay in the source state", parent)?,
        }
    }
    Ok(())
}

fn write_warnings<W: Write>(warnings: &[String], out: &mut W) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nWarnings:")?;
    for warning in warnings {
        writeln!(out, "  {}", warning)?;
    }
    Ok(())
}
