//! CLI route: single route table and run context.

use crate::config::{ConfigLoader, RecoveryConfig};
use crate::diagnostics::{list_records, load_record, prune_records};
use crate::error::AppError;
use crate::fault::{Fault, FaultKind};
use crate::recovery::{PartialResults, RecoveryStrategy, StrategyAdvisor};
use crate::types::Phase;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::cli::parse::{Commands, DiagnosticsCommands};
use crate::cli::presentation::{
    format_advice_text, format_prune_text, format_record_list_text, format_record_text,
    format_strategies_text,
};

/// Command name for logging (e.g. "diagnostics.list", "advise").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Diagnostics { command } => match command {
            DiagnosticsCommands::List { .. } => "diagnostics.list",
            DiagnosticsCommands::Show { .. } => "diagnostics.show",
            DiagnosticsCommands::Prune { .. } => "diagnostics.prune",
        },
        Commands::Advise { .. } => "advise",
        Commands::Strategies { .. } => "strategies",
        Commands::Config { .. } => "config",
    }
}

/// Runtime context for CLI execution: workspace and the loaded, validated config.
pub struct RunContext {
    workspace_root: PathBuf,
    config: RecoveryConfig,
}

impl RunContext {
    /// Load configuration for `workspace_root`, or from `config_path` when given.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, AppError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        config.validate().map_err(|errors| {
            AppError::ConfigError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: RecoveryConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, AppError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = name, "Executing command");
        let result = self.execute_inner(command);
        info!(
            command = name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, AppError> {
        match command {
            Commands::Diagnostics { command } => self.handle_diagnostics_command(command),
            Commands::Advise {
                kind,
                phase,
                files_created,
                format,
            } => self.handle_advise(kind, phase, *files_created, format),
            Commands::Strategies { format } => {
                if wants_json(format)? {
                    let rows: Vec<_> = RecoveryStrategy::ALL
                        .iter()
                        .map(|s| {
                            json!({
                                "strategy": s,
                                "destructive": s.is_destructive(),
                                "description": s.description(),
                            })
                        })
                        .collect();
                    to_json(&rows)
                } else {
                    Ok(format_strategies_text(&RecoveryStrategy::ALL))
                }
            }
            Commands::Config { format } => match format.as_str() {
                "json" => to_json(&self.config),
                "toml" => toml::to_string_pretty(&self.config)
                    .map_err(|e| AppError::Serialization(e.to_string())),
                other => Err(AppError::InvalidArgument(format!(
                    "Unknown format '{}' (expected toml or json)",
                    other
                ))),
            },
        }
    }

    fn handle_diagnostics_command(&self, command: &DiagnosticsCommands) -> Result<String, AppError> {
        match command {
            DiagnosticsCommands::List { dir, format } => {
                let dir = self.record_dir(dir.as_deref());
                let as_json = wants_json(format)?;
                let entries = list_records(&dir)?;
                if as_json {
                    to_json(&entries)
                } else {
                    Ok(format_record_list_text(&entries))
                }
            }
            DiagnosticsCommands::Show { file, format } => {
                let as_json = wants_json(format)?;
                let path = self.resolve_record_path(file);
                let record = load_record(&path)?;
                if as_json {
                    to_json(&record)
                } else {
                    Ok(format_record_text(&record))
                }
            }
            DiagnosticsCommands::Prune { keep, dry_run, dir } => {
                let dir = self.record_dir(dir.as_deref());
                let pruned = prune_records(&dir, *keep, *dry_run)?;
                Ok(format_prune_text(&pruned, *dry_run))
            }
        }
    }

    fn handle_advise(
        &self,
        kind: &str,
        phase: &str,
        files_created: usize,
        format: &str,
    ) -> Result<String, AppError> {
        let as_json = wants_json(format)?;
        let kind: FaultKind = kind.parse().map_err(AppError::InvalidArgument)?;
        let phase = Phase::from(phase);
        let partial = PartialResults {
            files_created,
            ..PartialResults::default()
        };
        let advisor: StrategyAdvisor = self.config.advisor.to_advisor();
        let strategy = advisor.suggest(&Fault::new(kind, "reported from command line"), &phase, &partial);

        if as_json {
            to_json(&json!({
                "kind": kind,
                "phase": phase,
                "files_created": files_created,
                "suggested_strategy": strategy,
            }))
        } else {
            Ok(format_advice_text(kind, &phase, files_created, strategy))
        }
    }

    fn record_dir(&self, dir: Option<&Path>) -> PathBuf {
        match dir {
            Some(dir) if dir.is_relative() => self.workspace_root.join(dir),
            Some(dir) => dir.to_path_buf(),
            None => self.config.diagnostics.resolved_log_dir(),
        }
    }

    /// A bare file name is looked up in the configured record directory.
    fn resolve_record_path(&self, file: &Path) -> PathBuf {
        if file.components().count() == 1 && !file.exists() {
            self.config.diagnostics.resolved_log_dir().join(file)
        } else {
            file.to_path_buf()
        }
    }
}

/// `true` for json, `false` for text; anything else is rejected.
fn wants_json(format: &str) -> Result<bool, AppError> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(AppError::InvalidArgument(format!(
            "Unknown format '{}' (expected text or json)",
            other
        ))),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Serialization(e.to_string()))
}
