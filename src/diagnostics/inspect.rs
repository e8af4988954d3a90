//! Listing, loading and pruning of persisted diagnostic records.
//!
//! Used by outer tooling; the recovery engine itself never reads records back.

use super::recorder::DiagnosticRecord;
use crate::error::DiagnosticError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A record file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

pub fn is_record_file_name(name: &str) -> bool {
    name.starts_with("error_") && name.ends_with(".json")
}

/// Record files in `dir`, oldest first. A missing directory is an error.
pub fn list_records(dir: &Path) -> Result<Vec<DiagnosticEntry>, DiagnosticError> {
    if !dir.is_dir() {
        return Err(DiagnosticError::DirectoryNotFound(dir.to_path_buf()));
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !is_record_file_name(&file_name) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        entries.push(DiagnosticEntry {
            path: entry.path(),
            file_name,
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }
    entries.sort_by(|a, b| {
        let (a_time, a_suffix) = name_order_key(&a.file_name);
        let (b_time, b_suffix) = name_order_key(&b.file_name);
        a_time
            .cmp(b_time)
            .then(a_suffix.cmp(&b_suffix))
            .then(a.modified.cmp(&b.modified))
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    Ok(entries)
}

/// Timestamp part of `error_<YYYYmmdd_HHMMSS_mmm>_<phase>[_<n>].json` and the
/// numeric collision suffix (0 when absent).
fn name_order_key(name: &str) -> (&str, u32) {
    let rest = name.strip_prefix("error_").unwrap_or(name);
    let timestamp = rest.get(..19).unwrap_or(rest);
    let stem = name.trim_end_matches(".json");
    let suffix = stem
        .rsplit_once('_')
        .filter(|(head, _)| head.len() > "error_".len() + 19)
        .and_then(|(_, tail)| tail.parse().ok())
        .unwrap_or(0);
    (timestamp, suffix)
}

pub fn load_record(path: &Path) -> Result<DiagnosticRecord, DiagnosticError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| DiagnosticError::InvalidRecord {
        path: path.to_path_buf(),
        source,
    })
}

/// Delete all but the newest `keep` records. Returns the (would-be) deleted paths.
pub fn prune_records(dir: &Path, keep: usize, dry_run: bool) -> Result<Vec<PathBuf>, DiagnosticError> {
    let entries = list_records(dir)?;
    let excess = entries.len().saturating_sub(keep);
    let mut pruned = Vec::with_capacity(excess);
    for entry in entries.into_iter().take(excess) {
        if !dry_run {
            fs::remove_file(&entry.path)?;
            debug!(path = %entry.path.display(), "Pruned diagnostic record");
        }
        pruned.push(entry.path);
    }
    Ok(pruned)
}
