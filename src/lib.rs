// src/lib.rs

//! tfstate-transfer
//!
//! Moves resources from one Terraform state to another. Each resource is
//! imported into the target state under its new address, and a parent is
//! removed from the source state once all of its children made it across.
//!
//! # Architecture
//!
//! - `state`: parse a pulled state document into addressable records
//! - `alias` / `matcher`: map source address prefixes to target prefixes
//! - `topology`: group matched resources under their parent alias
//! - `scheduler` / `tracker`: work list and per-resource outcomes
//! - `backend`: the boundary to Terraform itself
//! - `transfer`: runs everything above and builds the report
//! - `report`: text and JSON rendering

pub mod alias;
pub mod backend;
pub mod config;
mod error;
pub mod matcher;
pub mod progress;
pub mod report;
pub mod scheduler;
pub mod state;
pub mod topology;
pub mod tracker;
pub mod transfer;

pub use alias::{Alias, AliasMap};
pub use backend::{ClaimError, ExecutionBackend, TerraformBackend};
pub use config::{RunConfig, RunOptions, TransferFile};
pub use error::{Error, Result};
pub use matcher::{AddressMatcher, MatchedResource};
pub use progress::{
    BarLogWriter, CallbackProgress, CliProgress, LogProgress, ProgressEvent, ProgressTracker,
    SilentProgress,
};
pub use report::ReportFormat;
pub use scheduler::{SchedulerError, TransferScheduler};
pub use state::{parse_state, Identifier, ResourceRecord, StateSnapshot};
pub use topology::TopologyIndex;
pub use tracker::{RunOutcome, RunTracker, TransferFailure};
pub use transfer::{DryRunPlan, Orchestrator, ParentPlan, RunReport};
