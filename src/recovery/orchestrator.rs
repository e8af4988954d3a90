//! Recovery Orchestrator
//!
//! Owns the checkpoint ledger of one generation run. The pipeline tracks its
//! work through the orchestrator, asks it for a [`RecoveryBundle`] when a phase
//! fails, and then executes whichever strategy the caller chose. Every
//! execution is one-shot and reports its own success separately from the fault
//! that triggered it.

use super::advisor::StrategyAdvisor;
use super::bundle::{FailureContext, RecoveryBundle};
use super::strategy::RecoveryStrategy;
use crate::checkpoint::{CheckpointId, CheckpointLedger};
use crate::config::RecoveryConfig;
use crate::diagnostics::DiagnosticRecorder;
use crate::error::RecoveryError;
use crate::rollback::{RollbackExecutor, RollbackOrder, RollbackOutcome};
use crate::types::Phase;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// What happened when a recovery strategy was executed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryOutcome {
    /// `None` when the requested strategy name was not recognized.
    pub strategy: Option<RecoveryStrategy>,
    pub success: bool,
    pub message: String,
    /// Present whenever files were deleted (or deletion was attempted).
    pub rollback: Option<RollbackOutcome>,
    /// Checkpoint the ledger was rewound to by a partial recovery.
    pub restored_to: Option<CheckpointId>,
    /// Failure of the recovery action itself, never of the original operation.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<RecoveryError>,
}

fn serialize_error<S>(error: &Option<RecoveryError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl RecoveryOutcome {
    fn succeeded(strategy: RecoveryStrategy, message: String) -> Self {
        Self {
            strategy: Some(strategy),
            success: true,
            message,
            rollback: None,
            restored_to: None,
            error: None,
        }
    }

    fn failed(strategy: Option<RecoveryStrategy>, error: RecoveryError) -> Self {
        Self {
            strategy,
            success: false,
            message: error.to_string(),
            rollback: None,
            restored_to: None,
            error: Some(error),
        }
    }

    /// `(success, message)` for presentation layers.
    pub fn into_parts(self) -> (bool, String) {
        (self.success, self.message)
    }
}

/// Recovery engine for a single generation run
#[derive(Debug)]
pub struct RecoveryOrchestrator {
    ledger: CheckpointLedger,
    executor: RollbackExecutor,
    advisor: StrategyAdvisor,
    recorder: DiagnosticRecorder,
}

impl RecoveryOrchestrator {
    pub fn new(recorder: DiagnosticRecorder) -> Self {
        Self {
            ledger: CheckpointLedger::new(),
            executor: RollbackExecutor::new(),
            advisor: StrategyAdvisor::default(),
            recorder,
        }
    }

    pub fn from_config(config: &RecoveryConfig) -> Self {
        Self::new(DiagnosticRecorder::from_config(&config.diagnostics))
            .with_advisor(config.advisor.to_advisor())
    }

    pub fn with_advisor(mut self, advisor: StrategyAdvisor) -> Self {
        self.advisor = advisor;
        self
    }

    pub fn ledger(&self) -> &CheckpointLedger {
        &self.ledger
    }

    pub fn advisor(&self) -> &StrategyAdvisor {
        &self.advisor
    }

    pub fn recorder(&self) -> &DiagnosticRecorder {
        &self.recorder
    }

    pub fn open_checkpoint(
        &mut self,
        phase: impl Into<Phase>,
        description: impl Into<String>,
    ) -> CheckpointId {
        self.ledger.open_checkpoint(phase, description)
    }

    pub fn open_checkpoint_with_state(
        &mut self,
        phase: impl Into<Phase>,
        description: impl Into<String>,
        extra_state: BTreeMap<String, serde_json::Value>,
    ) -> CheckpointId {
        self.ledger
            .open_checkpoint_with_state(phase, description, extra_state)
    }

    pub fn record_created(&mut self, path: impl Into<PathBuf>) -> bool {
        self.ledger.record_created(path)
    }

    pub fn record_modified(&mut self, path: impl Into<PathBuf>) -> bool {
        self.ledger.record_modified(path)
    }

    /// Snapshot the failure, ask the advisor for a strategy and persist a
    /// diagnostic record. Never fails.
    pub fn build_recovery_bundle(&self, context: FailureContext) -> RecoveryBundle {
        let suggested =
            self.advisor
                .suggest(&context.error, &context.phase, &context.partial_results);
        error!(
            phase = %context.phase,
            operation = %context.operation,
            fault = %context.error,
            suggested = %suggested,
            "Generation phase failed"
        );
        let mut bundle = RecoveryBundle::from_context(context, self.ledger.snapshot(), suggested);
        bundle.diagnostic_path = self.recorder.record(&bundle);
        bundle
    }

    /// Execute a strategy given by name; unknown names fail without touching the ledger.
    pub fn execute_recovery_named(&mut self, bundle: &RecoveryBundle, strategy: &str) -> RecoveryOutcome {
        match strategy.parse::<RecoveryStrategy>() {
            Ok(strategy) => self.execute_recovery(bundle, strategy),
            Err(e) => {
                warn!(strategy, "Refusing to execute unknown recovery strategy");
                RecoveryOutcome::failed(None, e)
            }
        }
    }

    pub fn execute_recovery(&mut self, bundle: &RecoveryBundle, strategy: RecoveryStrategy) -> RecoveryOutcome {
        info!(
            strategy = %strategy,
            phase = %bundle.current_phase,
            checkpoints = self.ledger.len(),
            "Executing recovery"
        );
        let outcome = match strategy {
            RecoveryStrategy::FullRollback => self.full_rollback(),
            RecoveryStrategy::PartialRecovery => self.partial_recovery(&bundle.current_phase),
            RecoveryStrategy::RetryOperation => RecoveryOutcome::succeeded(
                strategy,
                format!(
                    "No changes made; safe to retry '{}'",
                    bundle.failed_operation
                ),
            ),
            RecoveryStrategy::SkipAndContinue => self.skip_current(&bundle.current_phase),
            RecoveryStrategy::Abort => {
                let dropped = self.ledger.clear();
                RecoveryOutcome::succeeded(
                    strategy,
                    format!(
                        "Stopped tracking {} checkpoint(s); files left in place",
                        dropped.len()
                    ),
                )
            }
        };
        if outcome.success {
            info!(strategy = %strategy, message = %outcome.message, "Recovery completed");
        } else {
            warn!(strategy = %strategy, message = %outcome.message, "Recovery failed");
        }
        outcome
    }

    fn full_rollback(&mut self) -> RecoveryOutcome {
        let strategy = RecoveryStrategy::FullRollback;
        let rollback = self
            .executor
            .rollback_many(self.ledger.checkpoints(), RollbackOrder::NewestFirst);
        // Cleared even when some paths survived: the ledger must not keep
        // pointing at paths that are already gone.
        self.ledger.clear();

        let mut outcome = if rollback.success() {
            RecoveryOutcome::succeeded(
                strategy,
                format!("Rolled back all changes ({})", rollback.summary()),
            )
        } else {
            let mut failed = RecoveryOutcome::failed(
                Some(strategy),
                RecoveryError::IncompleteRollback {
                    failed: rollback.failures.len(),
                },
            );
            failed.message = format!(
                "Rollback incomplete, ledger cleared ({})",
                rollback.summary()
            );
            failed
        };
        outcome.rollback = Some(rollback);
        outcome
    }

    fn partial_recovery(&mut self, failing_phase: &Phase) -> RecoveryOutcome {
        let strategy = RecoveryStrategy::PartialRecovery;
        let target = self
            .ledger
            .checkpoints()
            .iter()
            .rev()
            .find(|cp| &cp.phase != failing_phase && !cp.is_skipped())
            .map(|cp| (cp.id, cp.description.clone()));

        let Some((target_id, target_description)) = target else {
            return RecoveryOutcome::failed(
                Some(strategy),
                RecoveryError::NoFallbackCheckpoint {
                    phase: failing_phase.clone(),
                },
            );
        };

        let rollback = match self.ledger.checkpoints_after(target_id) {
            Ok(newer) => self.executor.rollback_many(newer, RollbackOrder::NewestFirst),
            Err(e) => return RecoveryOutcome::failed(Some(strategy), e.into()),
        };
        if let Err(e) = self.ledger.truncate_after(target_id) {
            return RecoveryOutcome::failed(Some(strategy), e.into());
        }

        let mut outcome = if rollback.success() {
            RecoveryOutcome::succeeded(
                strategy,
                format!(
                    "Recovered to checkpoint {} '{}' ({})",
                    target_id,
                    target_description,
                    rollback.summary()
                ),
            )
        } else {
            let mut failed = RecoveryOutcome::failed(
                Some(strategy),
                RecoveryError::IncompleteRollback {
                    failed: rollback.failures.len(),
                },
            );
            failed.message = format!(
                "Recovered to checkpoint {} with leftovers ({})",
                target_id,
                rollback.summary()
            );
            failed
        };
        outcome.restored_to = Some(target_id);
        outcome.rollback = Some(rollback);
        outcome
    }

    fn skip_current(&mut self, failing_phase: &Phase) -> RecoveryOutcome {
        let strategy = RecoveryStrategy::SkipAndContinue;
        match self.ledger.mark_current_skipped() {
            Some(id) => RecoveryOutcome::succeeded(
                strategy,
                format!(
                    "Skipped phase '{}' (checkpoint {}); continuing without it",
                    failing_phase, id
                ),
            ),
            None => RecoveryOutcome::failed(Some(strategy), RecoveryError::NoCurrentCheckpoint),
        }
    }
}
