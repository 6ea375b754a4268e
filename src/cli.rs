// src/cli.rs
//! CLI definitions for tfstate-transfer
//!
//! The command implementation lives in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tfstate-transfer")]
#[command(author = "tfstate-transfer Contributors")]
#[command(version)]
#[command(
    about = "Move resources between Terraform states",
    long_about = "Imports every resource under the given address prefixes into the target \
                  state, then removes each prefix from the source state once all of its \
                  resources were imported."
)]
pub struct Cli {
    /// Terraform working directory holding the source state
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Terraform working directory holding the target state
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    /// JSON transfer file with directories and resources
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    /// Resource to transfer, as `source` or `source:target` (repeatable)
    #[arg(short = 'r', long = "resource", value_name = "SOURCE[:TARGET]")]
    pub resources: Vec<String>,

    /// Print the commands that would be executed without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Terraform binary to use (default: `terraform` on PATH)
    #[arg(long, value_name = "PATH")]
    pub terraform_bin: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
