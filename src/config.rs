//! Configuration System
//!
//! Layered configuration for the recovery engine and its command-line tool:
//! built-in defaults, then the global config file, then the workspace file,
//! then `SCAFFOLD_RECOVERY__SECTION__KEY` environment variables. The log
//! directory is ordinary configuration handed to each recorder; nothing here
//! is process-global.

use crate::diagnostics::default_log_dir;
use crate::logging::LoggingConfig;
use crate::recovery::{StrategyAdvisor, DEFAULT_OPTIONAL_PHASES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::workspace_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Diagnostic record settings
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// Strategy advisor settings
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how diagnostic records are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Write a record for every failure
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Record directory (defaults to a directory under the system temp dir)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Pretty-print record JSON
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Keep at most this many records; older ones are pruned after each write
    #[serde(default)]
    pub max_records: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: None,
            pretty: true,
            max_records: None,
        }
    }
}

impl DiagnosticsConfig {
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }

    /// Anchor a relative `log_dir` at `root`.
    pub fn resolve_against(&mut self, root: &Path) {
        if let Some(dir) = &self.log_dir {
            if dir.is_relative() {
                self.log_dir = Some(root.join(dir));
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(dir) = &self.log_dir {
            if dir.as_os_str().is_empty() {
                return Err("log_dir cannot be empty".to_string());
            }
        }
        if self.max_records == Some(0) {
            return Err("max_records must be at least 1 (omit it to keep every record)".to_string());
        }
        Ok(())
    }
}

/// Strategy advisor tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Phases whose failure may be skipped once files exist
    #[serde(default = "default_optional_phases")]
    pub optional_phases: Vec<String>,
}

fn default_optional_phases() -> Vec<String> {
    DEFAULT_OPTIONAL_PHASES.iter().map(|p| p.to_string()).collect()
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            optional_phases: default_optional_phases(),
        }
    }
}

impl AdvisorConfig {
    pub fn to_advisor(&self) -> StrategyAdvisor {
        StrategyAdvisor::with_optional_phases(self.optional_phases.iter().map(String::as_str))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.optional_phases.iter().any(|p| p.trim().is_empty()) {
            return Err("optional_phases cannot contain empty names".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Diagnostics(String),
    Advisor(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Diagnostics(msg) => write!(f, "Diagnostics: {}", msg),
            ValidationError::Advisor(msg) => write!(f, "Advisor: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RecoveryConfig {
    /// Validate the entire configuration, reporting every problem found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.diagnostics.validate() {
            errors.push(ValidationError::Diagnostics(e));
        }
        if let Err(e) = self.advisor.validate() {
            errors.push(ValidationError::Advisor(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
