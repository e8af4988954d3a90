//! Faults raised by the generation pipeline.
//!
//! The pipeline converts whatever native error it caught into a [`Fault`] at the
//! catch site. Recovery decisions match on [`FaultKind`] only; the message is
//! carried for display and diagnostics and is never inspected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

/// ENOSPC on Linux and macOS
#[cfg(unix)]
const NO_SPACE_OS_ERROR: i32 = 28;

/// Closed classification of pipeline failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    PermissionDenied,
    AlreadyExists,
    Connection,
    Timeout,
    NotFound,
    DiskFull,
    InvalidInput,
    Template,
    Other,
}

impl FaultKind {
    pub const ALL: [FaultKind; 9] = [
        FaultKind::PermissionDenied,
        FaultKind::AlreadyExists,
        FaultKind::Connection,
        FaultKind::Timeout,
        FaultKind::NotFound,
        FaultKind::DiskFull,
        FaultKind::InvalidInput,
        FaultKind::Template,
        FaultKind::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaultKind::PermissionDenied => "permission_denied",
            FaultKind::AlreadyExists => "already_exists",
            FaultKind::Connection => "connection",
            FaultKind::Timeout => "timeout",
            FaultKind::NotFound => "not_found",
            FaultKind::DiskFull => "disk_full",
            FaultKind::InvalidInput => "invalid_input",
            FaultKind::Template => "template",
            FaultKind::Other => "other",
        }
    }

    /// Connection and timeout faults; the same operation may succeed if re-run.
    pub fn is_transient(self) -> bool {
        matches!(self, FaultKind::Connection | FaultKind::Timeout)
    }

    /// Classify an I/O error.
    pub fn from_io(err: &io::Error) -> Self {
        if is_out_of_space(err) {
            return FaultKind::DiskFull;
        }
        FaultKind::from(err.kind())
    }
}

#[cfg(unix)]
fn is_out_of_space(err: &io::Error) -> bool {
    err.raw_os_error() == Some(NO_SPACE_OS_ERROR)
}

#[cfg(not(unix))]
fn is_out_of_space(_err: &io::Error) -> bool {
    false
}

impl From<io::ErrorKind> for FaultKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => FaultKind::PermissionDenied,
            io::ErrorKind::AlreadyExists => FaultKind::AlreadyExists,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe => FaultKind::Connection,
            io::ErrorKind::TimedOut => FaultKind::Timeout,
            io::ErrorKind::NotFound => FaultKind::NotFound,
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => FaultKind::InvalidInput,
            _ => FaultKind::Other,
        }
    }
}

impl FromStr for FaultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FaultKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = FaultKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown fault kind '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The failure that triggered recovery, preserved unchanged for display and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn from_io(err: &io::Error) -> Self {
        Self::new(FaultKind::from_io(err), err.to_string())
    }
}

impl From<io::Error> for Fault {
    fn from(err: io::Error) -> Self {
        Fault::from_io(&err)
    }
}
