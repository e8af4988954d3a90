//! CLI parse: clap types for scaffold-recovery. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scaffold-recovery CLI - inspect failure diagnostics and recovery advice
#[derive(Parser)]
#[command(name = "scaffold-recovery")]
#[command(about = "Inspect scaffold failure diagnostics and recovery strategies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short = 'q', default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diagnostic record commands (list, show, prune)
    Diagnostics {
        #[command(subcommand)]
        command: DiagnosticsCommands,
    },
    /// Suggest a recovery strategy for a failure
    Advise {
        /// Failure kind (e.g. permission_denied, timeout, already_exists)
        #[arg(long)]
        kind: String,
        /// Phase that failed (e.g. file_rendering, git_initialization)
        #[arg(long)]
        phase: String,
        /// Number of files created before the failure
        #[arg(long, default_value = "0")]
        files_created: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// List the available recovery strategies
    Strategies {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Show the effective configuration
    Config {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml", value_parser = ["toml", "json"])]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum DiagnosticsCommands {
    /// List diagnostic records, oldest first
    List {
        /// Record directory (defaults to the configured log directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Show one diagnostic record
    Show {
        /// Record file
        file: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Delete all but the newest records
    Prune {
        /// Number of records to keep
        #[arg(long)]
        keep: usize,
        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
        /// Record directory (defaults to the configured log directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}
