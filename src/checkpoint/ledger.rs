//! Checkpoint ledger: the ordered, append-only record of one generation run.
//!
//! The ledger is the sole owner of its checkpoints. Tracking calls take path
//! values, never references into ledger internals, so truncation and clearing
//! cannot leave dangling views behind. One ledger belongs to one run; it holds
//! no locks and is not meant to be shared between concurrent pipelines.

use super::{Checkpoint, CheckpointId, SKIPPED_STATE_KEY};
use crate::error::LedgerError;
use crate::types::Phase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Immutable copy of a ledger, detached from later mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub checkpoints: Vec<Checkpoint>,
}

impl LedgerSnapshot {
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn ids(&self) -> Vec<CheckpointId> {
        self.checkpoints.iter().map(|cp| cp.id).collect()
    }

    pub fn current(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }
}

/// Which path set a tracking call targets
#[derive(Debug, Clone, Copy)]
enum PathSet {
    Created,
    Modified,
}

/// Ordered checkpoints for a single generation run
#[derive(Debug, Default)]
pub struct CheckpointLedger {
    checkpoints: Vec<Checkpoint>,
    next_id: u64,
}

impl CheckpointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a checkpoint for `phase`; it becomes the current checkpoint.
    pub fn open_checkpoint(
        &mut self,
        phase: impl Into<Phase>,
        description: impl Into<String>,
    ) -> CheckpointId {
        self.open_checkpoint_with_state(phase, description, BTreeMap::new())
    }

    /// Open a checkpoint carrying phase-specific flags.
    pub fn open_checkpoint_with_state(
        &mut self,
        phase: impl Into<Phase>,
        description: impl Into<String>,
        extra_state: BTreeMap<String, serde_json::Value>,
    ) -> CheckpointId {
        // Ids are never reused within a run, not even after clear().
        self.next_id += 1;
        let id = CheckpointId::new(self.next_id);
        let parent_id = self.current_id();
        let checkpoint = Checkpoint::new(id, phase.into(), description.into(), extra_state, parent_id);
        debug!(
            checkpoint = %id,
            phase = %checkpoint.phase,
            parent = ?parent_id,
            "Opened checkpoint"
        );
        self.checkpoints.push(checkpoint);
        id
    }

    /// Track a path created under the current checkpoint.
    ///
    /// Returns `false` (and logs a warning) when no checkpoint is open.
    pub fn record_created(&mut self, path: impl Into<PathBuf>) -> bool {
        self.record(PathSet::Created, path.into())
    }

    /// Track a path modified under the current checkpoint.
    ///
    /// Returns `false` (and logs a warning) when no checkpoint is open.
    pub fn record_modified(&mut self, path: impl Into<PathBuf>) -> bool {
        self.record(PathSet::Modified, path.into())
    }

    fn record(&mut self, set: PathSet, path: PathBuf) -> bool {
        let Some(current) = self.checkpoints.last_mut() else {
            warn!(
                path = %path.display(),
                set = ?set,
                "No open checkpoint; path is not tracked"
            );
            return false;
        };
        let inserted = match set {
            PathSet::Created => current.created_paths.insert(path),
            PathSet::Modified => current.modified_paths.insert(path),
        };
        if inserted {
            debug!(checkpoint = %current.id, set = ?set, "Tracked path");
        }
        true
    }

    /// Deep copy of every checkpoint, in creation order.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            checkpoints: self.checkpoints.clone(),
        }
    }

    /// Drop every checkpoint strictly after `id`; `id` becomes current.
    ///
    /// Returns the dropped checkpoints, oldest first.
    pub fn truncate_after(&mut self, id: CheckpointId) -> Result<Vec<Checkpoint>, LedgerError> {
        let index = self.position(id)?;
        let dropped = self.checkpoints.split_off(index + 1);
        debug!(checkpoint = %id, dropped = dropped.len(), "Truncated ledger");
        Ok(dropped)
    }

    /// Forget every checkpoint. Paths on disk are left untouched.
    pub fn clear(&mut self) -> Vec<Checkpoint> {
        debug!(dropped = self.checkpoints.len(), "Cleared ledger");
        std::mem::take(&mut self.checkpoints)
    }

    pub fn current(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }

    pub fn current_id(&self) -> Option<CheckpointId> {
        self.current().map(|cp| cp.id)
    }

    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.position(id).ok().map(|index| &self.checkpoints[index])
    }

    /// All checkpoints, oldest first.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Checkpoints opened strictly after `id`, oldest first.
    pub fn checkpoints_after(&self, id: CheckpointId) -> Result<&[Checkpoint], LedgerError> {
        let index = self.position(id)?;
        Ok(&self.checkpoints[index + 1..])
    }

    /// Checkpoint that created `path`, if any.
    pub fn owner_of(&self, path: &Path) -> Option<CheckpointId> {
        self.checkpoints
            .iter()
            .rev()
            .find(|cp| cp.owns_created(path))
            .map(|cp| cp.id)
    }

    /// Set a flag on the current checkpoint. Returns its id, or `None` when the ledger is empty.
    pub fn set_current_state(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<CheckpointId> {
        let current = self.checkpoints.last_mut()?;
        current.extra_state.insert(key.into(), value);
        Some(current.id)
    }

    /// Mark the current checkpoint's phase as skipped.
    pub fn mark_current_skipped(&mut self) -> Option<CheckpointId> {
        self.set_current_state(SKIPPED_STATE_KEY, serde_json::Value::Bool(true))
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    fn position(&self, id: CheckpointId) -> Result<usize, LedgerError> {
        // Ids are strictly increasing, so the vector is sorted by id.
        self.checkpoints
            .binary_search_by_key(&id, |cp| cp.id)
            .map_err(|_| LedgerError::CheckpointNotFound(id))
    }
}
