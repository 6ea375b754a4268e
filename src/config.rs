// src/config.rs

//! Run configuration
//!
//! A transfer run is described either entirely on the command line or by a
//! JSON transfer file:
//!
//! ```json
//! {
//!   "sourceDir": "source",
//!   "targetDir": "target",
//!   "resources": [
//!     { "source": "aws_dynamodb_table.this", "target": "aws_dynamodb_table.target" },
//!     { "source": "module.db" }
//!   ]
//! }
//! ```
//!
//! Both are resolved once into an immutable [`RunConfig`] before anything
//! touches Terraform.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::alias::{Alias, AliasMap};
use crate::error::{Error, Result};

/// One `resources[]` entry of a transfer file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    /// Source address prefix
    pub source: String,
    /// Target address prefix; defaults to the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl TransferEntry {
    fn to_alias(&self) -> Result<Alias> {
        let source = self.source.trim();
        if source.is_empty() {
            return Err(Error::ConfigError(
                "transfer file entry has an empty source".to_string(),
            ));
        }
        let target = match self.target.as_deref().map(str::trim) {
            None => source,
            Some("") => {
                return Err(Error::ConfigError(format!(
                    "transfer file entry '{}' has an empty target",
                    source
                )));
            }
            Some(target) => target,
        };
        Ok(Alias::new(source, target))
    }
}

/// On-disk transfer file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFile {
    #[serde(default, alias = "SourceDir")]
    pub source_dir: Option<PathBuf>,

    #[serde(default, alias = "TargetDir")]
    pub target_dir: Option<PathBuf>,

    #[serde(default, alias = "Resources")]
    pub resources: Vec<TransferEntry>,
}

impl TransferFile {
    /// Parse transfer file content
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigError(format!("invalid transfer file: {}", e)))
    }

    /// Read and parse a transfer file.
    ///
    /// Directories inside the file are taken as written, so relative ones
    /// resolve against the current working directory like command-line
    /// directories do.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file = Self::parse(&content)?;

        debug!(
            "Loaded transfer file {} with {} resources",
            path.display(),
            file.resources.len()
        );
        Ok(file)
    }

    /// Aliases declared in the file
    pub fn aliases(&self) -> Result<Vec<Alias>> {
        self.resources.iter().map(TransferEntry::to_alias).collect()
    }
}

/// Unresolved run settings as given by the user
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub source_dir: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    /// `source[:target]` tokens
    pub resources: Vec<String>,
    pub dry_run: bool,
}

/// Fully resolved, immutable settings for one transfer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Canonical path of the source working directory
    pub source_dir: PathBuf,
    /// Canonical path of the target working directory
    pub target_dir: PathBuf,
    pub aliases: AliasMap,
    pub dry_run: bool,
}

impl RunConfig {
    /// Resolve user options into a run configuration.
    ///
    /// Command-line directories take precedence over the transfer file;
    /// aliases from both are merged.
    pub fn from_options(options: &RunOptions) -> Result<Self> {
        let file = match &options.config_file {
            Some(path) => TransferFile::load(path)?,
            None => TransferFile::default(),
        };

        let mut aliases = AliasMap::from_aliases(file.aliases()?)?;
        for token in &options.resources {
            aliases.insert(Alias::parse(token)?)?;
        }

        let source_dir = options.source_dir.clone().or(file.source_dir);
        let target_dir = options.target_dir.clone().or(file.target_dir);

        let (Some(source_dir), Some(target_dir)) = (source_dir, target_dir) else {
            return Err(Error::ConfigError(
                "both a source directory and a target directory must be specified".to_string(),
            ));
        };

        if aliases.is_empty() {
            return Err(Error::ConfigError("resources must be specified".to_string()));
        }

        Ok(Self {
            source_dir: check_dir(&source_dir)?,
            target_dir: check_dir(&target_dir)?,
            aliases,
            dry_run: options.dry_run,
        })
    }
}

/// Verify a directory exists and return its canonical path
pub fn check_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::PathError(dir.to_path_buf()));
    }
    Ok(dir.canonicalize()?)
}
