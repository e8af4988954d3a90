//! Checkpoints
//!
//! A checkpoint marks the start of a pipeline phase and owns every filesystem
//! path the phase created or modified until the next checkpoint was opened.
//! Checkpoints live only inside a [`CheckpointLedger`]; other components see
//! them through shared borrows or a [`LedgerSnapshot`].

pub mod ledger;

pub use ledger::{CheckpointLedger, LedgerSnapshot};

use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// `extra_state` key set by the skip-and-continue strategy
pub const SKIPPED_STATE_KEY: &str = "skipped";

/// Run-local checkpoint identifier. Later checkpoints always compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointId(u64);

impl CheckpointId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cp-{:04}", self.0)
    }
}

/// A named point in the generation pipeline and the paths it is responsible for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub created_at: DateTime<Utc>,
    pub phase: Phase,
    pub description: String,
    /// Paths brought into existence under this checkpoint; rollback deletes these.
    pub created_paths: BTreeSet<PathBuf>,
    /// Paths whose contents changed. Tracked for diagnostics only: rollback
    /// does not restore them.
    pub modified_paths: BTreeSet<PathBuf>,
    #[serde(default)]
    pub extra_state: BTreeMap<String, serde_json::Value>,
    pub parent_id: Option<CheckpointId>,
}

impl Checkpoint {
    pub(crate) fn new(
        id: CheckpointId,
        phase: Phase,
        description: String,
        extra_state: BTreeMap<String, serde_json::Value>,
        parent_id: Option<CheckpointId>,
    ) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            phase,
            description,
            created_paths: BTreeSet::new(),
            modified_paths: BTreeSet::new(),
            extra_state,
            parent_id,
        }
    }

    /// True when the phase was skipped by a recovery action.
    pub fn is_skipped(&self) -> bool {
        self.extra_state
            .get(SKIPPED_STATE_KEY)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    pub fn owns_created(&self, path: &Path) -> bool {
        self.created_paths.contains(path)
    }

    /// Number of paths this checkpoint tracks, created and modified.
    pub fn tracked_len(&self) -> usize {
        self.created_paths.len() + self.modified_paths.len()
    }
}
