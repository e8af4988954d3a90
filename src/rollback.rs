//! Rollback Executor
//!
//! Physically removes the paths a checkpoint created. Each path is handled on
//! its own: a failure is recorded and the executor moves on, so one locked file
//! does not keep the rest of a checkpoint on disk. A path that is already gone
//! counts as removed, which makes repeated rollbacks of the same checkpoint
//! succeed.
//!
//! Modified paths are not restored. Only created paths are deleted.

use crate::checkpoint::{Checkpoint, CheckpointId};
use crate::error::RecoveryError;
use crate::fault::FaultKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Order in which several checkpoints are rolled back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackOrder {
    /// Most recent checkpoint first; files inside directories created earlier go first.
    #[default]
    NewestFirst,
    OldestFirst,
}

/// A path that could not be removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFailure {
    pub checkpoint_id: CheckpointId,
    pub path: PathBuf,
    pub kind: FaultKind,
    pub error: String,
}

/// Result of rolling back one or more checkpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackOutcome {
    /// Checkpoints processed, in the order they were rolled back.
    pub checkpoints: Vec<CheckpointId>,
    /// Paths deleted by this rollback, in deletion order.
    pub removed: Vec<PathBuf>,
    /// Paths that no longer existed.
    pub already_absent: Vec<PathBuf>,
    pub failures: Vec<PathFailure>,
}

impl RollbackOutcome {
    /// True only if every path is gone.
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_paths(&self) -> Vec<&Path> {
        self.failures.iter().map(|f| f.path.as_path()).collect()
    }

    pub fn merge(&mut self, other: RollbackOutcome) {
        self.checkpoints.extend(other.checkpoints);
        self.removed.extend(other.removed);
        self.already_absent.extend(other.already_absent);
        self.failures.extend(other.failures);
    }

    /// One-line summary for recovery messages.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} checkpoint(s): {} removed, {} already absent, {} failed",
            self.checkpoints.len(),
            self.removed.len(),
            self.already_absent.len(),
            self.failures.len()
        );
        if let Some(first) = self.failures.first() {
            out.push_str(&format!(" (first failure: {}: {})", first.path.display(), first.error));
        }
        out
    }
}

enum Removal {
    Removed,
    AlreadyAbsent,
}

/// Deletes checkpoint-owned paths from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackExecutor;

impl RollbackExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Delete every path `checkpoint` created.
    ///
    /// Paths are visited deepest first (reverse lexical order), so a file is
    /// removed before the directory that holds it.
    pub fn rollback(&self, checkpoint: &Checkpoint) -> RollbackOutcome {
        let mut outcome = RollbackOutcome {
            checkpoints: vec![checkpoint.id],
            ..RollbackOutcome::default()
        };

        for path in checkpoint.created_paths.iter().rev() {
            match remove_path(path) {
                Ok(Removal::Removed) => {
                    debug!(checkpoint = %checkpoint.id, path = %path.display(), "Removed path");
                    outcome.removed.push(path.clone());
                }
                Ok(Removal::AlreadyAbsent) => {
                    outcome.already_absent.push(path.clone());
                }
                Err(e) => {
                    warn!(
                        checkpoint = %checkpoint.id,
                        path = %path.display(),
                        error = %e,
                        "Failed to remove path during rollback"
                    );
                    outcome.failures.push(PathFailure {
                        checkpoint_id: checkpoint.id,
                        path: path.clone(),
                        kind: FaultKind::from_io(&e),
                        error: e.to_string(),
                    });
                }
            }
        }

        if !checkpoint.modified_paths.is_empty() {
            debug!(
                checkpoint = %checkpoint.id,
                modified = checkpoint.modified_paths.len(),
                "Modified paths are not restored by rollback"
            );
        }
        outcome
    }

    /// Roll back several checkpoints, continuing past failures.
    pub fn rollback_many(&self, checkpoints: &[Checkpoint], order: RollbackOrder) -> RollbackOutcome {
        let mut outcome = RollbackOutcome::default();
        let ordered: Box<dyn Iterator<Item = &Checkpoint>> = match order {
            RollbackOrder::NewestFirst => Box::new(checkpoints.iter().rev()),
            RollbackOrder::OldestFirst => Box::new(checkpoints.iter()),
        };
        for checkpoint in ordered {
            outcome.merge(self.rollback(checkpoint));
        }
        info!(
            checkpoints = outcome.checkpoints.len(),
            removed = outcome.removed.len(),
            failed = outcome.failures.len(),
            "Rollback finished"
        );
        outcome
    }
}

/// Run a rollback on the blocking worker pool of the current tokio runtime.
///
/// The rollback starts immediately and always runs to completion: dropping the
/// returned future only discards the outcome, it does not stop the deletions.
pub async fn rollback_detached(
    executor: RollbackExecutor,
    checkpoints: Vec<Checkpoint>,
    order: RollbackOrder,
) -> Result<RollbackOutcome, RecoveryError> {
    tokio::task::spawn_blocking(move || executor.rollback_many(&checkpoints, order))
        .await
        .map_err(|e| RecoveryError::WorkerFailed(e.to_string()))
}

fn remove_path(path: &Path) -> io::Result<Removal> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::AlreadyAbsent),
        Err(e) => return Err(e),
    };

    // Symlinks are unlinked, never followed.
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(Removal::Removed),
        // Something else cleaned it up in the meantime.
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removal::AlreadyAbsent),
        Err(e) => Err(e),
    }
}
