//! Diagnostic Recorder
//!
//! Writes one sanitized JSON record per failure. Recording is best effort:
//! any I/O or serialization problem is logged and swallowed so a failing
//! generation run is never made worse by its own diagnostics.

use super::inspect::prune_records;
use super::sanitize::sanitize_variables;
use crate::checkpoint::Checkpoint;
use crate::config::DiagnosticsConfig;
use crate::fault::FaultKind;
use crate::recovery::{PartialResults, RecoveryBundle, RecoveryStrategy};
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name collisions within the same millisecond get a numeric suffix, up to this many.
const MAX_NAME_ATTEMPTS: usize = 16;

/// Persisted description of a failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub recorded_at: DateTime<Utc>,
    pub failed_at: DateTime<Utc>,
    pub error_kind: FaultKind,
    pub error_message: String,
    pub phase: Phase,
    pub operation: String,
    pub target_path: PathBuf,
    pub template_name: String,
    pub variables: BTreeMap<String, serde_json::Value>,
    pub checkpoints: Vec<Checkpoint>,
    pub partial_results: PartialResults,
    pub suggested_strategy: RecoveryStrategy,
    #[serde(default)]
    pub external_suggestions: Vec<String>,
}

impl DiagnosticRecord {
    /// Redacted record for `bundle`.
    pub fn from_bundle(bundle: &RecoveryBundle) -> Self {
        Self {
            recorded_at: Utc::now(),
            failed_at: bundle.created_at,
            error_kind: bundle.error.kind,
            error_message: bundle.error.message.clone(),
            phase: bundle.current_phase.clone(),
            operation: bundle.failed_operation.clone(),
            target_path: bundle.target_path.clone(),
            template_name: bundle.template_name.clone(),
            variables: sanitize_variables(&bundle.variables),
            checkpoints: bundle.ledger_snapshot.checkpoints.clone(),
            partial_results: bundle.partial_results.clone(),
            suggested_strategy: bundle.suggested_strategy,
            external_suggestions: bundle.external_suggestions.clone(),
        }
    }
}

/// Writes diagnostic records under a run-specific log directory
#[derive(Debug, Clone)]
pub struct DiagnosticRecorder {
    log_dir: PathBuf,
    enabled: bool,
    pretty: bool,
    max_records: Option<usize>,
}

impl DiagnosticRecorder {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            enabled: true,
            pretty: true,
            max_records: None,
        }
    }

    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self {
            log_dir: config.resolved_log_dir(),
            enabled: config.enabled,
            pretty: config.pretty,
            max_records: config.max_records,
        }
    }

    /// Recorder that never touches the filesystem.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(default_log_dir())
        }
    }

    pub fn with_max_records(mut self, max_records: Option<usize>) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Persist a record of `bundle`. Returns the file written, or `None` when
    /// recording is disabled or failed.
    pub fn record(&self, bundle: &RecoveryBundle) -> Option<PathBuf> {
        if !self.enabled {
            debug!("Diagnostic recording disabled");
            return None;
        }
        match self.try_record(bundle) {
            Ok(path) => {
                info!(path = %path.display(), "Wrote diagnostic record");
                if let Some(keep) = self.max_records {
                    if let Err(e) = prune_records(&self.log_dir, keep, false) {
                        warn!(error = %e, "Failed to prune old diagnostic records");
                    }
                }
                Some(path)
            }
            Err(e) => {
                warn!(
                    log_dir = %self.log_dir.display(),
                    error = %e,
                    "Failed to write diagnostic record"
                );
                None
            }
        }
    }

    fn try_record(&self, bundle: &RecoveryBundle) -> io::Result<PathBuf> {
        let record = DiagnosticRecord::from_bundle(bundle);
        let body = if self.pretty {
            serde_json::to_vec_pretty(&record)
        } else {
            serde_json::to_vec(&record)
        }
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::create_dir_all(&self.log_dir)?;
        let stem = record_stem(bundle);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}_{}.json", stem, attempt)
            };
            let path = self.log_dir.join(&name);
            if path.exists() {
                continue;
            }
            let temp_path = self.log_dir.join(format!("{}.tmp", name));
            match write_atomically(&temp_path, &path, &body) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free diagnostic file name for {}", stem),
        ))
    }
}

/// Write `body` to `temp_path`, then rename it to `path`. A failed write or
/// rename removes the temp file, so `path` only ever holds a complete record.
fn write_atomically(temp_path: &Path, path: &Path, body: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)?;
    let written = file.write_all(body).and_then(|_| file.sync_all());
    drop(file);

    if let Err(e) = written.and_then(|_| fs::rename(temp_path, path)) {
        let _ = fs::remove_file(temp_path);
        return Err(e);
    }
    Ok(())
}

/// `error_<timestamp>_<phase>`, derived from the failure time and phase.
pub fn record_stem(bundle: &RecoveryBundle) -> String {
    format!(
        "error_{}_{}",
        bundle.created_at.format("%Y%m%d_%H%M%S_%3f"),
        bundle.current_phase.file_tag()
    )
}

/// `<system temp>/scaffold-recovery/logs`
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("scaffold-recovery").join("logs")
}
