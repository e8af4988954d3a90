//! Diagnostic records: write, read back, list and prune

use scaffold_recovery::diagnostics::{list_records, load_record, prune_records};
use scaffold_recovery::{
    DiagnosticRecorder, FailureContext, Fault, FaultKind, Phase, RecoveryOrchestrator,
    RecoveryStrategy,
};
use serde_json::json;
use tempfile::TempDir;

fn fail_once(orch: &RecoveryOrchestrator, phase: Phase) -> std::path::PathBuf {
    orch.build_recovery_bundle(
        FailureContext::new(Fault::new(FaultKind::Connection, "reset by peer"), phase, "fetch")
            .variable("db_password", "hunter2")
            .variable("settings", json!({ "token": "t", "license": "MIT" }))
            .external_suggestions(vec!["Check your network connection".to_string()]),
    )
    .diagnostic_path
    .expect("record written")
}

#[test]
fn test_record_round_trips_through_loader() {
    let temp = TempDir::new().unwrap();
    let mut orch = RecoveryOrchestrator::new(DiagnosticRecorder::new(temp.path()));
    orch.open_checkpoint(Phase::PostCommands, "post");
    orch.record_created("/tmp/never-created");
    orch.record_modified("/tmp/pyproject.toml");

    let path = fail_once(&orch, Phase::PostCommands);
    let record = load_record(&path).unwrap();
    assert_eq!(record.phase, Phase::PostCommands);
    assert_eq!(record.error_kind, FaultKind::Connection);
    assert_eq!(record.suggested_strategy, RecoveryStrategy::RetryOperation);
    assert_eq!(record.variables["db_password"], "[REDACTED]");
    assert_eq!(record.variables["settings"]["token"], "[REDACTED]");
    assert_eq!(record.variables["settings"]["license"], "MIT");
    assert_eq!(record.checkpoints[0].modified_paths.len(), 1);
    assert_eq!(record.external_suggestions.len(), 1);
}

#[test]
fn test_independent_runs_use_independent_dirs() {
    let temp = TempDir::new().unwrap();
    let first = RecoveryOrchestrator::new(DiagnosticRecorder::new(temp.path().join("run-1")));
    let second = RecoveryOrchestrator::new(DiagnosticRecorder::new(temp.path().join("run-2")));

    fail_once(&first, Phase::Validation);
    fail_once(&second, Phase::Validation);
    fail_once(&second, Phase::FileRendering);

    assert_eq!(list_records(&temp.path().join("run-1")).unwrap().len(), 1);
    assert_eq!(list_records(&temp.path().join("run-2")).unwrap().len(), 2);
}

#[test]
fn test_prune_after_many_failures() {
    let temp = TempDir::new().unwrap();
    let orch = RecoveryOrchestrator::new(DiagnosticRecorder::new(temp.path()));
    for _ in 0..3 {
        fail_once(&orch, Phase::Custom("download_template".to_string()));
    }
    let pruned = prune_records(temp.path(), 1, false).unwrap();
    assert_eq!(pruned.len(), 2);
    assert_eq!(list_records(temp.path()).unwrap().len(), 1);
}
