//! CLI presentation: text formatters for diagnostics, advice and strategies.

use crate::diagnostics::{DiagnosticEntry, DiagnosticRecord};
use crate::fault::FaultKind;
use crate::recovery::RecoveryStrategy;
use crate::types::Phase;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::PathBuf;

fn section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

fn strategy_label(strategy: RecoveryStrategy) -> String {
    if strategy.is_destructive() {
        format!("{}", strategy.as_str().red())
    } else {
        format!("{}", strategy.as_str().green())
    }
}

pub fn format_strategies_text(strategies: &[RecoveryStrategy]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Strategy", "Deletes files", "Description"]);
    for strategy in strategies {
        table.add_row(vec![
            strategy.as_str().to_string(),
            if strategy.is_destructive() { "yes" } else { "no" }.to_string(),
            strategy.description().to_string(),
        ]);
    }
    format!("{}\n{}", section_heading("Recovery strategies"), table)
}

pub fn format_advice_text(
    kind: FaultKind,
    phase: &Phase,
    files_created: usize,
    strategy: RecoveryStrategy,
) -> String {
    let mut lines = vec![
        section_heading("Recovery advice"),
        format!("  Failure:        {}", kind),
        format!("  Phase:          {}", phase),
        format!("  Files created:  {}", files_created),
        format!("  Suggested:      {}", strategy_label(strategy)),
        format!("  {}", strategy.description().dimmed()),
    ];
    if kind.is_transient() {
        lines.push(format!(
            "  {}",
            "This failure kind is usually transient.".yellow()
        ));
    }
    lines.join("\n")
}

pub fn format_record_list_text(entries: &[DiagnosticEntry]) -> String {
    if entries.is_empty() {
        return "No diagnostic records.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "File", "Size", "Modified"]);
    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            entry.file_name.clone(),
            format_size(entry.size_bytes),
            entry
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    format!(
        "{}\n{}\nTotal: {}",
        section_heading("Diagnostic records"),
        table,
        entries.len()
    )
}

pub fn format_record_text(record: &DiagnosticRecord) -> String {
    let mut s = section_heading("Diagnostic record");
    s.push_str(&format!(
        "\n  Failed at:   {}",
        record.failed_at.format("%Y-%m-%d %H:%M:%S%.3f UTC")
    ));
    s.push_str(&format!(
        "\n  Error:       {} ({})",
        record.error_message.red(),
        record.error_kind
    ));
    s.push_str(&format!("\n  Phase:       {}", record.phase));
    s.push_str(&format!("\n  Operation:   {}", record.operation));
    if !record.template_name.is_empty() {
        s.push_str(&format!("\n  Template:    {}", record.template_name));
    }
    if !record.target_path.as_os_str().is_empty() {
        s.push_str(&format!("\n  Target:      {}", record.target_path.display()));
    }
    s.push_str(&format!(
        "\n  Suggested:   {}",
        strategy_label(record.suggested_strategy)
    ));
    s.push_str(&format!(
        "\n  Partial:     {} file(s), {} dir(s)",
        record.partial_results.files_created, record.partial_results.directories_created
    ));

    if !record.checkpoints.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Checkpoint", "Phase", "Description", "Created", "Modified"]);
        for cp in &record.checkpoints {
            table.add_row(vec![
                cp.id.to_string(),
                cp.phase.to_string(),
                cp.description.clone(),
                cp.created_paths.len().to_string(),
                cp.modified_paths.len().to_string(),
            ]);
        }
        s.push_str(&format!("\n\n{}\n{}", section_heading("Checkpoints"), table));
    }

    if !record.variables.is_empty() {
        s.push_str(&format!("\n\n{}", section_heading("Variables")));
        for (key, value) in &record.variables {
            s.push_str(&format!("\n  {} = {}", key, value));
        }
    }

    if !record.external_suggestions.is_empty() {
        s.push_str(&format!("\n\n{}", section_heading("Suggestions")));
        for hint in &record.external_suggestions {
            s.push_str(&format!("\n  - {}", hint));
        }
    }
    s
}

pub fn format_prune_text(pruned: &[PathBuf], dry_run: bool) -> String {
    if pruned.is_empty() {
        return "Nothing to prune.".to_string();
    }
    let verb = if dry_run { "Would delete" } else { "Deleted" };
    let mut lines = vec![format!("{} {} record(s):", verb, pruned.len())];
    lines.extend(pruned.iter().map(|p| format!("  - {}", p.display())));
    lines.join("\n")
}
