//! CLI domain: parse, route, output, and presentation only.
//! Inspection and advice over the recovery engine; no live generation run.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, DiagnosticsCommands};
pub use presentation::{
    format_advice_text, format_record_list_text, format_record_text, format_prune_text,
    format_strategies_text,
};
pub use route::{command_name, RunContext};
