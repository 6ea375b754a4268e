// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tfstate_transfer::{AliasMap, ClaimError, Error, ExecutionBackend, Result, RunConfig};

/// One backend call, as seen by [`MockBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Pull(PathBuf),
    Claim { target: String, identifier: String },
    Remove(String),
}

/// In-memory backend with scripted claim and removal results.
///
/// Claims succeed unless a result was scripted for `(target, identifier)`.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Option<String>,
    claims: HashMap<(String, String), ClaimError>,
    failing_removals: Vec<String>,
    calls: RefCell<Vec<Call>>,
}

impl MockBackend {
    pub fn with_state(state: &Value) -> Self {
        Self {
            state: Some(state.to_string()),
            ..Default::default()
        }
    }

    /// Backend whose state pull fails
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn claim_fails(mut self, target: &str, identifier: &str, error: ClaimError) -> Self {
        self.claims
            .insert((target.to_string(), identifier.to_string()), error);
        self
    }

    pub fn removal_fails(mut self, source: &str) -> Self {
        self.failing_removals.push(source.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Identifiers tried for a target address, in order
    pub fn attempts(&self, target: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Claim { target: t, identifier } if t == target => Some(identifier),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Remove(source) => Some(source),
                _ => None,
            })
            .collect()
    }
}

impl ExecutionBackend for MockBackend {
    fn pull_state(&self, dir: &Path) -> Result<String> {
        self.calls.borrow_mut().push(Call::Pull(dir.to_path_buf()));
        self.state.clone().ok_or_else(|| Error::StateQueryError {
            dir: dir.display().to_string(),
            message: "backend unreachable".to_string(),
        })
    }

    fn claim(
        &self,
        target_address: &str,
        identifier: &str,
        _dir: &Path,
    ) -> std::result::Result<(), ClaimError> {
        self.calls.borrow_mut().push(Call::Claim {
            target: target_address.to_string(),
            identifier: identifier.to_string(),
        });
        match self
            .claims
            .get(&(target_address.to_string(), identifier.to_string()))
        {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn remove(&self, source_address: &str, _dir: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Remove(source_address.to_string()));
        if self.failing_removals.iter().any(|s| s == source_address) {
            return Err(Error::RemovalError {
                address: source_address.to_string(),
                message: "Error acquiring the state lock".to_string(),
            });
        }
        Ok(())
    }

    fn claim_command(&self, target_address: &str, identifier: &str, dir: &Path) -> String {
        format!(
            "terraform -chdir={} import {} {}",
            dir.display(),
            target_address,
            identifier
        )
    }

    fn remove_command(&self, source_address: &str, dir: &Path) -> String {
        format!("terraform -chdir={} state rm {}", dir.display(), source_address)
    }
}

/// A managed resource entry with a single unindexed instance
pub fn managed(resource_type: &str, name: &str, attributes: Value) -> Value {
    json!({
        "mode": "managed",
        "type": resource_type,
        "name": name,
        "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
        "instances": [{"schema_version": 0, "attributes": attributes}]
    })
}

/// Same as [`managed`], placed inside a module
pub fn in_module(module: &str, mut resource: Value) -> Value {
    resource["module"] = json!(module);
    resource
}

/// A version 4 state document holding the given resources
pub fn state(resources: Vec<Value>) -> Value {
    json!({
        "version": 4,
        "terraform_version": "1.5.7",
        "serial": 12,
        "lineage": "0d3b4c1e-2f5a-4f3e-9a43-6f0c1d2e3f40",
        "outputs": {},
        "resources": resources
    })
}

/// Temporary workspace with `source` and `target` directories
pub fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("source")).unwrap();
    fs::create_dir(dir.path().join("target")).unwrap();
    dir
}

/// Run configuration over fixed paths, for runs against [`MockBackend`]
pub fn run_config(tokens: &[&str], dry_run: bool) -> RunConfig {
    RunConfig {
        source_dir: PathBuf::from("/work/source"),
        target_dir: PathBuf::from("/work/target"),
        aliases: AliasMap::from_tokens(tokens).unwrap(),
        dry_run,
    }
}
