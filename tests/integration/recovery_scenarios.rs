//! End-to-end recovery runs over a real temporary project tree

use crate::integration::test_utils::{make_dir, write_file};
use scaffold_recovery::{
    DiagnosticRecorder, FailureContext, Fault, FaultKind, PartialResults, Phase, RecoveryError,
    RecoveryOrchestrator, RecoveryStrategy,
};
use std::fs;
use tempfile::TempDir;

struct Run {
    _temp: TempDir,
    project: std::path::PathBuf,
    logs: std::path::PathBuf,
    orch: RecoveryOrchestrator,
}

/// "init" creates a.txt, "files" creates b.txt and then fails.
fn two_phase_run() -> Run {
    let temp = TempDir::new().unwrap();
    let project = make_dir(temp.path(), "p");
    let logs = temp.path().join("logs");
    let mut orch = RecoveryOrchestrator::new(DiagnosticRecorder::new(&logs));

    orch.open_checkpoint(Phase::DirectoryCreation, "init");
    orch.record_created(write_file(&project, "a.txt", "a"));
    orch.open_checkpoint(Phase::FileRendering, "files");
    orch.record_created(write_file(&project, "b.txt", "b"));

    Run {
        _temp: temp,
        project,
        logs,
        orch,
    }
}

fn failure(kind: FaultKind) -> FailureContext {
    FailureContext::new(Fault::new(kind, "render failed"), Phase::FileRendering, "render b.txt")
        .template_name("python-package")
        .variable("project_name", "demo")
        .variable("api_key", "sk-live-123")
        .partial_results(PartialResults {
            files_created: 2,
            ..PartialResults::default()
        })
}

#[test]
fn test_partial_recovery_keeps_earlier_phase() {
    let mut run = two_phase_run();
    let bundle = run
        .orch
        .build_recovery_bundle(failure(FaultKind::AlreadyExists));
    assert_eq!(bundle.suggested_strategy, RecoveryStrategy::PartialRecovery);

    let outcome = run
        .orch
        .execute_recovery(&bundle, bundle.suggested_strategy);
    assert!(outcome.success, "{}", outcome.message);
    assert!(run.project.join("a.txt").exists());
    assert!(!run.project.join("b.txt").exists());
    assert_eq!(run.orch.ledger().len(), 1);
    assert_eq!(run.orch.ledger().current().unwrap().description, "init");
}

#[test]
fn test_full_rollback_removes_everything() {
    let mut run = two_phase_run();
    let bundle = run.orch.build_recovery_bundle(failure(FaultKind::Template));
    assert_eq!(bundle.suggested_strategy, RecoveryStrategy::FullRollback);

    let outcome = run
        .orch
        .execute_recovery(&bundle, bundle.suggested_strategy);
    assert!(outcome.success, "{}", outcome.message);
    assert!(!run.project.join("a.txt").exists());
    assert!(!run.project.join("b.txt").exists());
    assert!(run.orch.ledger().is_empty());
}

#[test]
fn test_bundle_writes_redacted_record() {
    let run = two_phase_run();
    let bundle = run.orch.build_recovery_bundle(failure(FaultKind::Template));

    let path = bundle.diagnostic_path.clone().expect("record written");
    assert!(path.starts_with(&run.logs));
    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("sk-live-123"));
    assert!(raw.contains("[REDACTED]"));
    assert!(raw.contains("demo"));
    // The bundle itself keeps the real values for the caller.
    assert_eq!(bundle.variables["api_key"], "sk-live-123");
}

#[test]
fn test_retry_changes_nothing() {
    let mut run = two_phase_run();
    let bundle = run.orch.build_recovery_bundle(failure(FaultKind::Timeout));
    assert_eq!(bundle.suggested_strategy, RecoveryStrategy::RetryOperation);

    let before = run.orch.ledger().snapshot();
    let outcome = run.orch.execute_recovery(&bundle, RecoveryStrategy::RetryOperation);
    assert!(outcome.success);
    assert_eq!(run.orch.ledger().snapshot(), before);
    assert!(run.project.join("b.txt").exists());
}

#[test]
fn test_abort_leaves_files_and_forgets_them() {
    let mut run = two_phase_run();
    let bundle = run.orch.build_recovery_bundle(failure(FaultKind::Other));

    let outcome = run.orch.execute_recovery(&bundle, RecoveryStrategy::Abort);
    assert!(outcome.success);
    assert!(outcome.rollback.is_none());
    assert!(run.orch.ledger().is_empty());
    assert!(run.project.join("a.txt").exists());
    assert!(run.project.join("b.txt").exists());
}

#[test]
fn test_skip_optional_phase_then_partial_recovery_passes_over_it() {
    let temp = TempDir::new().unwrap();
    let project = make_dir(temp.path(), "p");
    let mut orch = RecoveryOrchestrator::new(DiagnosticRecorder::disabled());

    orch.open_checkpoint(Phase::FileRendering, "files");
    orch.record_created(write_file(&project, "setup.py", ""));
    orch.open_checkpoint(Phase::GitInitialization, "git");
    orch.record_created(make_dir(&project, ".git"));

    let bundle = orch.build_recovery_bundle(
        FailureContext::new(
            Fault::new(FaultKind::NotFound, "git: command not found"),
            Phase::GitInitialization,
            "git init",
        )
        .partial_results(PartialResults {
            files_created: 1,
            ..PartialResults::default()
        }),
    );
    assert_eq!(bundle.suggested_strategy, RecoveryStrategy::SkipAndContinue);
    assert!(orch.execute_recovery(&bundle, bundle.suggested_strategy).success);
    assert!(orch.ledger().current().unwrap().is_skipped());

    orch.open_checkpoint(Phase::VenvCreation, "venv");
    orch.record_created(make_dir(&project, ".venv"));
    let bundle = orch.build_recovery_bundle(FailureContext::new(
        Fault::new(FaultKind::AlreadyExists, ".venv exists"),
        Phase::VenvCreation,
        "python -m venv",
    ));
    let outcome = orch.execute_recovery(&bundle, RecoveryStrategy::PartialRecovery);
    assert!(outcome.success, "{}", outcome.message);

    // The skipped git checkpoint is not a fallback target, so it is rolled back too.
    assert_eq!(orch.ledger().len(), 1);
    assert!(project.join("setup.py").exists());
    assert!(!project.join(".git").exists());
    assert!(!project.join(".venv").exists());
}

#[test]
fn test_unknown_strategy_name_is_rejected() {
    let mut run = two_phase_run();
    let bundle = run.orch.build_recovery_bundle(failure(FaultKind::Other));

    let outcome = run.orch.execute_recovery_named(&bundle, "rewind_time");
    assert!(!outcome.success);
    assert_eq!(outcome.strategy, None);
    assert_eq!(
        outcome.error,
        Some(RecoveryError::UnknownStrategy("rewind_time".to_string()))
    );
    assert_eq!(run.orch.ledger().len(), 2);
}

#[test]
fn test_partial_recovery_without_fallback_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let mut orch = RecoveryOrchestrator::new(DiagnosticRecorder::disabled());
    orch.open_checkpoint(Phase::FileRendering, "files");
    let file = write_file(temp.path(), "only.txt", "");
    orch.record_created(&file);

    let bundle = orch.build_recovery_bundle(FailureContext::new(
        Fault::new(FaultKind::AlreadyExists, "exists"),
        Phase::FileRendering,
        "render",
    ));
    let outcome = orch.execute_recovery(&bundle, RecoveryStrategy::PartialRecovery);
    assert!(!outcome.success);
    assert!(matches!(
        outcome.error,
        Some(RecoveryError::NoFallbackCheckpoint { .. })
    ));
    assert!(file.exists());
    assert_eq!(orch.ledger().len(), 1);
}
