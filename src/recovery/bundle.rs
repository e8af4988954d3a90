//! Recovery bundles: everything known about a failure at the moment it happened.

use super::strategy::RecoveryStrategy;
use crate::checkpoint::LedgerSnapshot;
use crate::fault::Fault;
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Caller-supplied summary of the work that succeeded before the failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialResults {
    #[serde(default)]
    pub files_created: usize,
    #[serde(default)]
    pub directories_created: usize,
    /// Free-form counters or notes from the pipeline.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl PartialResults {
    pub fn has_created_files(&self) -> bool {
        self.files_created > 0
    }
}

/// Context the pipeline hands over when a phase fails
#[derive(Debug, Clone)]
pub struct FailureContext {
    pub error: Fault,
    pub phase: Phase,
    pub operation: String,
    pub target_path: PathBuf,
    pub template_name: String,
    pub variables: BTreeMap<String, serde_json::Value>,
    pub partial_results: PartialResults,
    pub external_suggestions: Vec<String>,
}

impl FailureContext {
    pub fn new(error: Fault, phase: impl Into<Phase>, operation: impl Into<String>) -> Self {
        Self {
            error,
            phase: phase.into(),
            operation: operation.into(),
            target_path: PathBuf::new(),
            template_name: String::new(),
            variables: BTreeMap::new(),
            partial_results: PartialResults::default(),
            external_suggestions: Vec::new(),
        }
    }

    pub fn target_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_path = path.into();
        self
    }

    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = name.into();
        self
    }

    pub fn variables(mut self, variables: BTreeMap<String, serde_json::Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn partial_results(mut self, partial: PartialResults) -> Self {
        self.partial_results = partial;
        self
    }

    /// Advice from an assistance service, shown next to the strategy choices.
    pub fn external_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.external_suggestions = suggestions;
        self
    }
}

/// Snapshot of a failure, built once and consumed by recovery and diagnostics.
///
/// `variables` are kept verbatim so the operation can be described or retried;
/// only the persisted diagnostic record is redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryBundle {
    pub created_at: DateTime<Utc>,
    pub error: Fault,
    pub ledger_snapshot: LedgerSnapshot,
    pub current_phase: Phase,
    pub failed_operation: String,
    pub target_path: PathBuf,
    pub template_name: String,
    pub variables: BTreeMap<String, serde_json::Value>,
    pub partial_results: PartialResults,
    pub suggested_strategy: RecoveryStrategy,
    #[serde(default)]
    pub external_suggestions: Vec<String>,
    /// Where the diagnostic record was written, when the write succeeded.
    #[serde(default)]
    pub diagnostic_path: Option<PathBuf>,
}

impl RecoveryBundle {
    pub(crate) fn from_context(
        context: FailureContext,
        ledger_snapshot: LedgerSnapshot,
        suggested_strategy: RecoveryStrategy,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            error: context.error,
            ledger_snapshot,
            current_phase: context.phase,
            failed_operation: context.operation,
            target_path: context.target_path,
            template_name: context.template_name,
            variables: context.variables,
            partial_results: context.partial_results,
            suggested_strategy,
            external_suggestions: context.external_suggestions,
            diagnostic_path: None,
        }
    }

    /// Strategies to offer, suggested one first.
    pub fn choices(&self) -> Vec<RecoveryStrategy> {
        let mut choices = vec![self.suggested_strategy];
        choices.extend(
            RecoveryStrategy::ALL
                .into_iter()
                .filter(|s| *s != self.suggested_strategy),
        );
        choices
    }
}
