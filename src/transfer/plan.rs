// src/transfer/plan.rs

//! Commands a dry run would have executed.

use serde::Serialize;
use std::collections::BTreeMap;

/// Commands generated for one parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentPlan {
    /// One import command per child, in processing order
    pub claim_commands: Vec<String>,
    /// Children with no usable import identifier
    pub unclaimable: Vec<String>,
    /// The single state removal command, if the parent would be removed
    pub removal_command: Option<String>,
}

/// Dry-run commands grouped by top-level key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DryRunPlan {
    parents: BTreeMap<String, ParentPlan>,
}

impl DryRunPlan {
    /// Create a plan with an empty entry for each parent
    pub fn new<'a>(parents: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            parents: parents
                .into_iter()
                .map(|p| (p.to_string(), ParentPlan::default()))
                .collect(),
        }
    }

    pub fn add_claim(&mut self, top_level_key: &str, command: String) {
        self.entry(top_level_key).claim_commands.push(command);
    }

    pub fn add_unclaimable(&mut self, top_level_key: &str, source_address: &str) {
        self.entry(top_level_key)
            .unclaimable
            .push(source_address.to_string());
    }

    pub fn set_removal(&mut self, top_level_key: &str, command: String) {
        self.entry(top_level_key).removal_command = Some(command);
    }

    /// Plan for a single parent
    pub fn get(&self, top_level_key: &str) -> Option<&ParentPlan> {
        self.parents.get(top_level_key)
    }

    /// `(parent, plan)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParentPlan)> {
        self.parents.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    fn entry(&mut self, top_level_key: &str) -> &mut ParentPlan {
        self.parents.entry(top_level_key.to_string()).or_default()
    }
}
