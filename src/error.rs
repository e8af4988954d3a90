//! Error types for the scaffold recovery engine.

use crate::checkpoint::CheckpointId;
use crate::types::Phase;
use std::path::PathBuf;
use thiserror::Error;

/// Ledger mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Checkpoint not found: {0}")]
    CheckpointNotFound(CheckpointId),
}

/// Failures of a recovery action itself.
///
/// These never replace the fault that triggered recovery; the original fault
/// stays in the bundle and these are reported next to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("No checkpoint outside phase '{phase}' to fall back to")]
    NoFallbackCheckpoint { phase: Phase },

    #[error("No open checkpoint to mark as skipped")]
    NoCurrentCheckpoint,

    #[error("Unknown recovery strategy: {0}")]
    UnknownStrategy(String),

    #[error("Rollback left {failed} path(s) in place")]
    IncompleteRollback { failed: usize },

    #[error("Rollback worker failed: {0}")]
    WorkerFailed(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors raised while inspecting persisted diagnostic records
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Diagnostic directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Diagnostic record is not valid JSON ({path}): {source}")]
    InvalidRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Diagnostic I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Tool-level errors: configuration, logging setup and CLI surface
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Diagnostics error: {0}")]
    Diagnostic(#[from] DiagnosticError),

    #[error("Recovery error: {0}")]
    Recovery(#[from] RecoveryError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}
