// src/transfer/mod.rs

//! Transfer orchestration
//!
//! One run goes through these steps:
//!
//! 1. Pull the source state and parse it into records
//! 2. Match records against the aliases and group them by top-level key
//! 3. Drain the scheduler, importing each resource into the target state
//!    with its identifiers tried in priority order
//! 4. Remove every parent whose children were all imported from the source
//!    state
//!
//! In dry-run mode steps 3 and 4 only generate the commands.
//!
//! Individual import failures are recorded and the run carries on. A failed
//! removal aborts the run, since the parent would otherwise be left managed
//! by both states without anyone noticing.

mod plan;

pub use plan::{DryRunPlan, ParentPlan};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{ClaimError, ExecutionBackend};
use crate::config::RunConfig;
use crate::error::Result;
use crate::matcher::{AddressMatcher, MatchedResource};
use crate::progress::{ProgressTracker, SilentProgress};
use crate::scheduler::TransferScheduler;
use crate::state::parse_state;
use crate::topology::TopologyIndex;
use crate::tracker::{RunOutcome, RunTracker, TransferFailure};

/// Everything a finished run has to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunReport {
    /// Imports and removals were executed
    Executed {
        /// One entry per processed resource, in processing order
        outcomes: Vec<RunOutcome>,
        /// Parents removed from the source state
        removed: Vec<String>,
        warnings: Vec<String>,
    },

    /// Commands were generated but not executed
    DryRun {
        plan: DryRunPlan,
        warnings: Vec<String>,
    },
}

impl RunReport {
    pub fn warnings(&self) -> &[String] {
        match self {
            RunReport::Executed { warnings, .. } => warnings,
            RunReport::DryRun { warnings, .. } => warnings,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunReport::DryRun { .. })
    }
}

/// Matched resources and their grouping, computed once per run
struct Discovery {
    scheduler: TransferScheduler,
    topology: TopologyIndex,
    warnings: Vec<String>,
}

/// Drives one transfer run against an execution backend
pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    backend: &'a dyn ExecutionBackend,
    progress: Box<dyn ProgressTracker + 'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a RunConfig, backend: &'a dyn ExecutionBackend) -> Self {
        Self {
            config,
            backend,
            progress: Box::new(SilentProgress::new()),
        }
    }

    /// Report per-resource progress through the given tracker
    pub fn with_progress(mut self, progress: Box<dyn ProgressTracker + 'a>) -> Self {
        self.progress = progress;
        self
    }

    /// Run the transfer and produce its report
    pub fn run(&self) -> Result<RunReport> {
        info!(
            "Transferring from {} to {} ({} aliases{})",
            self.config.source_dir.display(),
            self.config.target_dir.display(),
            self.config.aliases.len(),
            if self.config.dry_run { ", dry run" } else { "" }
        );

        let discovery = self.discover()?;

        if self.config.dry_run {
            Ok(self.plan(discovery))
        } else {
            self.execute(discovery)
        }
    }

    fn discover(&self) -> Result<Discovery> {
        let document = self.backend.pull_state(&self.config.source_dir)?;
        let snapshot = parse_state(&document);
        let mut warnings = snapshot.diagnostics.clone();

        let matcher = AddressMatcher::new(&self.config.aliases);
        let matches = matcher.match_all(&snapshot.records);
        for alias in matcher.unmatched_aliases(&matches) {
            warnings.push(format!(
                "Alias '{}' does not match any resource in the source state",
                alias
            ));
        }

        let topology = TopologyIndex::build(&matches);
        info!(
            "Found {} resources under {} aliases",
            topology.child_count(),
            topology.len()
        );

        Ok(Discovery {
            scheduler: TransferScheduler::new(matches),
            topology,
            warnings,
        })
    }

    fn execute(&self, discovery: Discovery) -> Result<RunReport> {
        let Discovery {
            mut scheduler,
            topology,
            warnings,
        } = discovery;
        let mut tracker = RunTracker::new();

        self.progress.set_length(scheduler.total() as u64);
        while let Ok(resource) = scheduler.next() {
            self.progress.set_message(&resource.source_address);
            let result = self.claim(&resource);
            tracker.record(&resource, result);
            self.progress.increment(1);
        }
        self.progress.finish_with_message(&format!(
            "{} imported, {} failed",
            tracker.succeeded_count(),
            tracker.failed_count()
        ));

        let mut removed = Vec::new();
        for parent in tracker.removable_parents(&topology) {
            self.backend.remove(parent, &self.config.source_dir)?;
            removed.push(parent.to_string());
        }

        Ok(RunReport::Executed {
            outcomes: tracker.into_outcomes(),
            removed,
            warnings,
        })
    }

    /// Try each identifier in priority order until one settles the outcome
    fn claim(&self, resource: &MatchedResource) -> std::result::Result<(), TransferFailure> {
        for identifier in &resource.identifiers {
            debug!(
                "Importing {} as {} using {}={}",
                resource.source_address, resource.target_address, identifier.field, identifier.value
            );

            match self.backend.claim(
                &resource.target_address,
                &identifier.value,
                &self.config.target_dir,
            ) {
                Ok(()) => return Ok(()),
                Err(ClaimError::AlreadyOwned) => {
                    info!("{} is already managed by the target state", resource.target_address);
                    return Ok(());
                }
                Err(ClaimError::Unimportable) => {
                    warn!("{} does not support import", resource.source_address);
                    return Err(TransferFailure::Unimportable);
                }
                Err(ClaimError::Other(message)) => {
                    debug!(
                        "Import of {} by {} failed: {}",
                        resource.target_address, identifier.field, message
                    );
                }
            }
        }

        warn!(
            "Could not import {} with any of its {} identifiers",
            resource.source_address,
            resource.identifiers.len()
        );
        Err(TransferFailure::UnknownImportFailure)
    }

    fn plan(&self, discovery: Discovery) -> RunReport {
        let Discovery {
            mut scheduler,
            topology,
            warnings,
        } = discovery;
        let mut tracker = RunTracker::new();
        let mut plan = DryRunPlan::new(topology.parents());

        while let Ok(resource) = scheduler.next() {
            match resource.identifiers.first() {
                Some(identifier) => {
                    let command = self.backend.claim_command(
                        &resource.target_address,
                        &identifier.value,
                        &self.config.target_dir,
                    );
                    plan.add_claim(&resource.top_level_key, command);
                    tracker.record(&resource, Ok(()));
                }
                None => {
                    warn!("{} has no import identifier", resource.source_address);
                    plan.add_unclaimable(&resource.top_level_key, &resource.source_address);
                    tracker.record(&resource, Err(TransferFailure::UnknownImportFailure));
                }
            }
        }

        for parent in tracker.removable_parents(&topology) {
            let command = self.backend.remove_command(parent, &self.config.source_dir);
            plan.set_removal(parent, command);
        }

        RunReport::DryRun { plan, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasMap;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    const STATE: &str = r#"{
      "version": 4,
      "resources": [
        {"mode": "managed", "type": "aws_iam_role", "name": "a", "module": "module.svc",
         "instances": [{"attributes": {"id": "role-a", "name": "a"}}]},
        {"mode": "managed", "type": "aws_iam_role", "name": "b", "module": "module.svc",
         "instances": [{"attributes": {"id": "role-b", "name": "b"}}]},
        {"mode": "managed", "type": "aws_s3_bucket", "name": "logs",
         "instances": [{"attributes": {"id": "logs-bucket"}}]},
        {"mode": "data", "type": "aws_caller_identity", "name": "me",
         "instances": [{"attributes": {"id": "123"}}]}
      ]
    }"#;

    /// Backend answering claims from a script keyed by `target:identifier`
    #[derive(Default)]
    struct ScriptedBackend {
        state: String,
        claims: HashMap<String, ClaimError>,
        fail_removal: bool,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(state: &str) -> Self {
            Self {
                state: state.to_string(),
                ..Default::default()
            }
        }

        fn script(mut self, target: &str, identifier: &str, error: ClaimError) -> Self {
            self.claims.insert(format!("{}:{}", target, identifier), error);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ExecutionBackend for ScriptedBackend {
        fn pull_state(&self, _dir: &Path) -> Result<String> {
            self.calls.borrow_mut().push("pull".to_string());
            Ok(self.state.clone())
        }

        fn claim(
            &self,
            target_address: &str,
            identifier: &str,
            _dir: &Path,
        ) -> std::result::Result<(), ClaimError> {
            self.calls
                .borrow_mut()
                .push(format!("claim {} {}", target_address, identifier));
            match self.claims.get(&format!("{}:{}", target_address, identifier)) {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }

        fn remove(&self, source_address: &str, _dir: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("remove {}", source_address));
            if self.fail_removal {
                return Err(Error::RemovalError {
                    address: source_address.to_string(),
                    message: "state locked".to_string(),
                });
            }
            Ok(())
        }

        fn claim_command(&self, target_address: &str, identifier: &str, _dir: &Path) -> String {
            format!("import {} {}", target_address, identifier)
        }

        fn remove_command(&self, source_address: &str, _dir: &Path) -> String {
            format!("rm {}", source_address)
        }
    }

    fn config(tokens: &[&str], dry_run: bool) -> RunConfig {
        RunConfig {
            source_dir: PathBuf::from("/src"),
            target_dir: PathBuf::from("/dst"),
            aliases: AliasMap::from_tokens(tokens).unwrap(),
            dry_run,
        }
    }

    fn executed(report: RunReport) -> (Vec<RunOutcome>, Vec<String>, Vec<String>) {
        match report {
            RunReport::Executed {
                outcomes,
                removed,
                warnings,
            } => (outcomes, removed, warnings),
            RunReport::DryRun { .. } => panic!("expected an executed report"),
        }
    }

    #[test]
    fn test_successful_run_removes_parents() {
        let config = config(&["module.svc:module.app", "aws_s3_bucket.logs"], false);
        let backend = ScriptedBackend::new(STATE);

        let (outcomes, removed, warnings) =
            executed(Orchestrator::new(&config, &backend).run().unwrap());

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.succeeded));
        assert_eq!(removed, vec!["aws_s3_bucket.logs", "module.svc"]);
        assert!(warnings.is_empty());
        assert_eq!(
            backend.calls(),
            vec![
                "pull",
                "claim aws_s3_bucket.logs logs-bucket",
                "claim module.app.aws_iam_role.a role-a",
                "claim module.app.aws_iam_role.b role-b",
                "remove aws_s3_bucket.logs",
                "remove module.svc",
            ]
        );
    }

    #[test]
    fn test_all_identifiers_failing_blocks_parent() {
        let config = config(&["module.svc"], false);
        let backend = ScriptedBackend::new(STATE)
            .script("module.svc.aws_iam_role.b", "role-b", ClaimError::Other("no".into()))
            .script("module.svc.aws_iam_role.b", "b", ClaimError::Other("no".into()));

        let (outcomes, removed, _) =
            executed(Orchestrator::new(&config, &backend).run().unwrap());

        let failed: Vec<_> = outcomes.iter().filter(|o| !o.succeeded).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].source_address, "module.svc.aws_iam_role.b");
        assert_eq!(failed[0].error, Some(TransferFailure::UnknownImportFailure));
        assert!(failed[0].suggestion.is_some());
        assert!(removed.is_empty());
        assert!(!backend.calls().iter().any(|c| c.starts_with("remove")));
    }

    #[test]
    fn test_already_owned_stops_fallback() {
        let config = config(&["module.svc"], false);
        let backend = ScriptedBackend::new(STATE).script(
            "module.svc.aws_iam_role.a",
            "role-a",
            ClaimError::AlreadyOwned,
        );

        let (outcomes, removed, _) =
            executed(Orchestrator::new(&config, &backend).run().unwrap());

        assert!(outcomes.iter().all(|o| o.succeeded));
        assert_eq!(removed, vec!["module.svc"]);
        assert!(!backend
            .calls()
            .contains(&"claim module.svc.aws_iam_role.a a".to_string()));
    }

    #[test]
    fn test_unimportable_is_terminal() {
        let config = config(&["aws_s3_bucket.logs"], false);
        let backend = ScriptedBackend::new(STATE).script(
            "aws_s3_bucket.logs",
            "logs-bucket",
            ClaimError::Unimportable,
        );

        let (outcomes, removed, _) =
            executed(Orchestrator::new(&config, &backend).run().unwrap());

        assert_eq!(outcomes[0].error, Some(TransferFailure::Unimportable));
        assert!(removed.is_empty());
    }

    #[test]
    fn test_removal_failure_aborts_run() {
        let config = config(&["module.svc", "aws_s3_bucket.logs"], false);
        let mut backend = ScriptedBackend::new(STATE);
        backend.fail_removal = true;

        let err = Orchestrator::new(&config, &backend).run().unwrap_err();
        assert!(matches!(err, Error::RemovalError { ref address, .. } if address == "aws_s3_bucket.logs"));
        assert!(!backend.calls().contains(&"remove module.svc".to_string()));
    }

    #[test]
    fn test_unmatched_alias_is_warned() {
        let config = config(&["module.svc", "module.gone"], false);
        let backend = ScriptedBackend::new(STATE);

        let report = Orchestrator::new(&config, &backend).run().unwrap();
        assert_eq!(report.warnings().len(), 1);
        assert!(report.warnings()[0].contains("module.gone"));
    }

    #[test]
    fn test_dry_run_never_claims() {
        let config = config(&["module.svc:module.app", "aws_s3_bucket.logs"], true);
        let backend = ScriptedBackend::new(STATE);

        let report = Orchestrator::new(&config, &backend).run().unwrap();
        assert!(report.is_dry_run());
        assert_eq!(backend.calls(), vec!["pull"]);

        let RunReport::DryRun { plan, .. } = report else {
            panic!("expected a dry-run report");
        };
        let svc = plan.get("module.svc").unwrap();
        assert_eq!(
            svc.claim_commands,
            vec![
                "import module.app.aws_iam_role.a role-a",
                "import module.app.aws_iam_role.b role-b",
            ]
        );
        assert_eq!(svc.removal_command.as_deref(), Some("rm module.svc"));
    }

    #[test]
    fn test_dry_run_without_identifier_is_unclaimable() {
        let state = r#"{"resources": [
            {"mode": "managed", "type": "null_resource", "name": "n",
             "instances": [{"attributes": {"triggers": {}}}]}
        ]}"#;
        let config = config(&["null_resource.n"], true);
        let backend = ScriptedBackend::new(state);

        let RunReport::DryRun { plan, .. } = Orchestrator::new(&config, &backend).run().unwrap()
        else {
            panic!("expected a dry-run report");
        };
        let entry = plan.get("null_resource.n").unwrap();
        assert!(entry.claim_commands.is_empty());
        assert_eq!(entry.unclaimable, vec!["null_resource.n"]);
        assert!(entry.removal_command.is_none());
    }

    #[test]
    fn test_progress_is_reported() {
        use crate::progress::{CallbackProgress, ProgressEvent};

        let config = config(&["module.svc"], false);
        let backend = ScriptedBackend::new(STATE);
        let events = RefCell::new(Vec::new());

        {
            let progress = CallbackProgress::new(|event| events.borrow_mut().push(event));
            Orchestrator::new(&config, &backend)
                .with_progress(Box::new(progress))
                .run()
                .unwrap();
        }

        let events = events.into_inner();
        assert_eq!(
            events.first(),
            Some(&ProgressEvent::Message("module.svc.aws_iam_role.a".to_string()))
        );
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Finished("2 imported, 0 failed".to_string()))
        );
    }
}
