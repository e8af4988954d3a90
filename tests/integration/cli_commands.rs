//! CLI route table over records produced by a real recovery run

use crate::integration::test_utils::with_isolated_env;
use scaffold_recovery::cli::{Commands, DiagnosticsCommands, RunContext};
use scaffold_recovery::config::workspace_config_path;
use scaffold_recovery::{
    AppError, DiagnosticRecorder, FailureContext, Fault, FaultKind, Phase, RecoveryConfig,
    RecoveryOrchestrator,
};
use std::path::Path;
use tempfile::TempDir;

fn context_for(dir: &Path) -> RunContext {
    let mut config = RecoveryConfig::default();
    config.diagnostics.log_dir = Some(dir.to_path_buf());
    RunContext::with_config(dir.to_path_buf(), config)
}

fn produce_record(dir: &Path) -> std::path::PathBuf {
    let mut orch = RecoveryOrchestrator::new(DiagnosticRecorder::new(dir));
    orch.open_checkpoint(Phase::FileRendering, "render templates");
    orch.build_recovery_bundle(
        FailureContext::new(
            Fault::new(FaultKind::DiskFull, "No space left on device"),
            Phase::FileRendering,
            "write setup.py",
        )
        .template_name("python-package")
        .variable("author_email", "jane@example.com"),
    )
    .diagnostic_path
    .unwrap()
}

#[test]
fn test_list_and_show_json() {
    let temp = TempDir::new().unwrap();
    let path = produce_record(temp.path());
    let ctx = context_for(temp.path());

    let listed = ctx
        .execute(&Commands::Diagnostics {
            command: DiagnosticsCommands::List {
                dir: None,
                format: "json".to_string(),
            },
        })
        .unwrap();
    let entries: serde_json::Value = serde_json::from_str(&listed).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let file_name = path.file_name().unwrap().to_os_string();
    let shown = ctx
        .execute(&Commands::Diagnostics {
            command: DiagnosticsCommands::Show {
                file: file_name.into(),
                format: "json".to_string(),
            },
        })
        .unwrap();
    let record: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(record["error_kind"], "disk_full");
    assert_eq!(record["variables"]["author_email"], "[REDACTED]");
    assert_eq!(record["template_name"], "python-package");
}

#[test]
fn test_show_text_lists_checkpoints() {
    let temp = TempDir::new().unwrap();
    let path = produce_record(temp.path());
    let out = context_for(temp.path())
        .execute(&Commands::Diagnostics {
            command: DiagnosticsCommands::Show {
                file: path,
                format: "text".to_string(),
            },
        })
        .unwrap();
    assert!(out.contains("render templates"));
    assert!(out.contains("write setup.py"));
    assert!(!out.contains("jane@example.com"));
}

#[test]
fn test_prune_dry_run_keeps_files() {
    let temp = TempDir::new().unwrap();
    produce_record(temp.path());
    produce_record(temp.path());
    let ctx = context_for(temp.path());

    let out = ctx
        .execute(&Commands::Diagnostics {
            command: DiagnosticsCommands::Prune {
                keep: 1,
                dry_run: true,
                dir: None,
            },
        })
        .unwrap();
    assert!(out.starts_with("Would delete 1 record(s):"));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 2);
}

#[test]
fn test_run_context_rejects_invalid_workspace_config() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let ws = test_dir.path().join("ws");
        let file = workspace_config_path(&ws);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "[diagnostics]\nmax_records = 0\n").unwrap();

        let err = RunContext::new(ws, None).err().expect("invalid config");
        assert!(matches!(err, AppError::ConfigError(msg) if msg.contains("max_records")));
    });
}
