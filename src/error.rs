// src/error.rs

//! Error types for tfstate-transfer
//!
//! Only structural failures live here. A single resource failing to transfer
//! is not an error at this level: it is recorded as a
//! [`TransferFailure`](crate::tracker::TransferFailure) in the run report and
//! the run continues.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a transfer run
#[derive(Error, Debug)]
pub enum Error {
    /// Alias or config input could not be understood
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A declared state directory does not exist
    #[error("Directory does not exist: {}", .0.display())]
    PathError(PathBuf),

    /// A state document could not be decoded
    #[error("Failed to parse state document: {0}")]
    ParseError(String),

    /// The source state could not be pulled
    #[error("Failed to pull state from {dir}: {message}")]
    StateQueryError { dir: String, message: String },

    /// A parent could not be removed from the source state
    #[error("Failed to remove {address} from source state: {message}")]
    RemovalError { address: String, message: String },

    /// The provisioning tool could not be located or started
    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias using tfstate-transfer's Error type
pub type Result<T> = std::result::Result<T, Error>;
