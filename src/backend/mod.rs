// src/backend/mod.rs

//! Execution backend boundary
//!
//! The transfer engine never talks to Terraform directly. Everything that
//! touches real state goes through [`ExecutionBackend`]:
//!
//! - `pull_state`: read the source state document
//! - `claim`: import a resource into the target state under its new address
//! - `remove`: drop a parent subtree from the source state
//!
//! Backends also render the command text for each operation so dry runs can
//! show exactly what would be executed.

mod terraform;

pub use terraform::{classify_import_failure, shell_quote, TerraformBackend};

use std::path::Path;
use thiserror::Error;

use crate::error::Result;

/// Why a claim attempt did not import the resource
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// The target state already manages this address
    #[error("resource is already managed by the target state")]
    AlreadyOwned,

    /// The resource type does not support import at all
    #[error("resource type does not support import")]
    Unimportable,

    /// Any other failure; a different identifier may still work
    #[error("{0}")]
    Other(String),
}

/// Operations the transfer engine needs from the provisioning tool
pub trait ExecutionBackend {
    /// Read the raw state document stored for a working directory
    fn pull_state(&self, dir: &Path) -> Result<String>;

    /// Import the resource identified by `identifier` as `target_address`
    fn claim(&self, target_address: &str, identifier: &str, dir: &Path)
        -> std::result::Result<(), ClaimError>;

    /// Remove `source_address` and everything under it from the state
    fn remove(&self, source_address: &str, dir: &Path) -> Result<()>;

    /// Command text equivalent to [`claim`](Self::claim)
    fn claim_command(&self, target_address: &str, identifier: &str, dir: &Path) -> String;

    /// Command text equivalent to [`remove`](Self::remove)
    fn remove_command(&self, source_address: &str, dir: &Path) -> String;
}
