//! Strategy Advisor
//!
//! Maps a fault, the failing phase and the partial results of the run to a
//! suggested recovery strategy. Rules are evaluated in order and the first
//! match wins:
//!
//! 1. permission fault: full rollback
//! 2. path already exists: partial recovery
//! 3. connection or timeout fault: retry
//! 4. optional phase with files already created: skip and continue
//! 5. anything else: full rollback
//!
//! The result is only a suggestion; the caller picks the strategy that runs.

use super::bundle::PartialResults;
use super::strategy::RecoveryStrategy;
use crate::fault::{Fault, FaultKind};
use crate::types::Phase;
use std::collections::BTreeSet;

/// Phases whose failure should not sink an otherwise successful generation
pub const DEFAULT_OPTIONAL_PHASES: &[&str] = &["git_initialization", "venv_creation"];

/// Ordered decision list over fault kinds and phases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAdvisor {
    optional_phases: BTreeSet<Phase>,
}

impl Default for StrategyAdvisor {
    fn default() -> Self {
        Self::with_optional_phases(DEFAULT_OPTIONAL_PHASES.iter().copied())
    }
}

impl StrategyAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optional_phases<I, P>(phases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Phase>,
    {
        Self {
            optional_phases: phases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_optional(&self, phase: &Phase) -> bool {
        self.optional_phases.contains(phase)
    }

    pub fn suggest(&self, fault: &Fault, phase: &Phase, partial: &PartialResults) -> RecoveryStrategy {
        match fault.kind {
            FaultKind::PermissionDenied => RecoveryStrategy::FullRollback,
            FaultKind::AlreadyExists => RecoveryStrategy::PartialRecovery,
            kind if kind.is_transient() => RecoveryStrategy::RetryOperation,
            _ if self.is_optional(phase) && partial.has_created_files() => {
                RecoveryStrategy::SkipAndContinue
            }
            _ => RecoveryStrategy::FullRollback,
        }
    }
}

/// Suggest a strategy using the default optional phases.
pub fn suggest(fault: &Fault, phase: &Phase, partial: &PartialResults) -> RecoveryStrategy {
    StrategyAdvisor::default().suggest(fault, phase, partial)
}
