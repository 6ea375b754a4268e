// src/tracker.rs

//! Per-resource outcomes and parent removal gating
//!
//! The tracker keeps two things for one run:
//!
//! - the completion map: last known success of every processed resource
//! - the outcome log: one [`RunOutcome`] per processed resource, in order
//!
//! A parent may only leave the source state once every one of its children
//! has been claimed by the target state. A parent with no children is never
//! eligible.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::matcher::MatchedResource;
use crate::topology::TopologyIndex;

/// Why a single resource could not be transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferFailure {
    /// The resource type does not support `terraform import`
    Unimportable,
    /// No identifier could be used to import the resource
    UnknownImportFailure,
}

impl TransferFailure {
    /// Remediation hint shown next to the failure
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Unimportable => {
                "This resource type cannot be imported; recreate it in the target state or leave it in the source state"
            }
            Self::UnknownImportFailure => "Unknown error: try importing the resource manually",
        }
    }
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unimportable => write!(f, "resource does not implement the import protocol"),
            Self::UnknownImportFailure => write!(f, "import failed for every identifier"),
        }
    }
}

/// Result of processing one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub top_level_key: String,
    pub source_address: String,
    pub target_address: String,
    pub succeeded: bool,
    pub error: Option<TransferFailure>,
    pub suggestion: Option<String>,
}

/// Completion map and outcome log for one run
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    completed: BTreeMap<String, bool>,
    outcomes: Vec<RunOutcome>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the final result of processing a resource
    pub fn record(&mut self, resource: &MatchedResource, result: Result<(), TransferFailure>) {
        let succeeded = result.is_ok();
        let error = result.err();

        self.completed
            .insert(resource.source_address.clone(), succeeded);
        self.outcomes.push(RunOutcome {
            top_level_key: resource.top_level_key.clone(),
            source_address: resource.source_address.clone(),
            target_address: resource.target_address.clone(),
            succeeded,
            error,
            suggestion: error.map(|e| e.suggestion().to_string()),
        });
    }

    /// Last known result for a resource, `None` if it was never processed
    pub fn status(&self, source_address: &str) -> Option<bool> {
        self.completed.get(source_address).copied()
    }

    /// Check if every child in the set was processed and succeeded
    pub fn all_succeeded(&self, children: &[String]) -> bool {
        !children.is_empty()
            && children
                .iter()
                .all(|child| self.status(child) == Some(true))
    }

    /// Parents whose whole subtree has been claimed, in key order
    pub fn removable_parents<'t>(&self, topology: &'t TopologyIndex) -> Vec<&'t str> {
        topology
            .iter()
            .filter(|(_, children)| self.all_succeeded(children))
            .map(|(parent, _)| parent)
            .collect()
    }

    /// Outcomes in processing order
    pub fn outcomes(&self) -> &[RunOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<RunOutcome> {
        self.outcomes
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }
}
