//! Recovery strategies.

use crate::error::RecoveryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of recovery policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    FullRollback,
    PartialRecovery,
    RetryOperation,
    SkipAndContinue,
    Abort,
}

impl RecoveryStrategy {
    /// Every strategy, in presentation order.
    pub const ALL: [RecoveryStrategy; 5] = [
        RecoveryStrategy::FullRollback,
        RecoveryStrategy::PartialRecovery,
        RecoveryStrategy::RetryOperation,
        RecoveryStrategy::SkipAndContinue,
        RecoveryStrategy::Abort,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryStrategy::FullRollback => "full_rollback",
            RecoveryStrategy::PartialRecovery => "partial_recovery",
            RecoveryStrategy::RetryOperation => "retry_operation",
            RecoveryStrategy::SkipAndContinue => "skip_and_continue",
            RecoveryStrategy::Abort => "abort",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RecoveryStrategy::FullRollback => "Remove everything this run created and start over",
            RecoveryStrategy::PartialRecovery => {
                "Undo the failing phase and keep the last good checkpoint"
            }
            RecoveryStrategy::RetryOperation => "Leave files in place and retry the failed operation",
            RecoveryStrategy::SkipAndContinue => "Mark the failing phase skipped and continue",
            RecoveryStrategy::Abort => "Stop tracking and leave files as they are",
        }
    }

    /// Whether executing the strategy may delete files.
    pub fn is_destructive(self) -> bool {
        matches!(
            self,
            RecoveryStrategy::FullRollback | RecoveryStrategy::PartialRecovery
        )
    }
}

impl FromStr for RecoveryStrategy {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RecoveryStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| RecoveryError::UnknownStrategy(s.to_string()))
    }
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
