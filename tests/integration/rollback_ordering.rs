//! Ledger ordering and rollback ordering over real directories

use crate::integration::test_utils::{make_dir, write_file};
use scaffold_recovery::{
    rollback_detached, CheckpointLedger, DiagnosticRecorder, FailureContext, Fault, FaultKind,
    Phase, RecoveryOrchestrator, RecoveryStrategy, RollbackExecutor, RollbackOrder,
};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_nested_paths_across_checkpoints_roll_back_child_first() {
    let temp = TempDir::new().unwrap();
    let x = temp.path().join("x");
    let y = x.join("y");

    let mut ledger = CheckpointLedger::new();
    ledger.open_checkpoint(Phase::DirectoryCreation, "A");
    std::fs::create_dir(&x).unwrap();
    ledger.record_created(&x);
    ledger.open_checkpoint(Phase::FileRendering, "B");
    std::fs::write(&y, "y").unwrap();
    ledger.record_created(&y);

    let outcome = RollbackExecutor::new().rollback_many(ledger.checkpoints(), RollbackOrder::NewestFirst);
    assert!(outcome.success());
    assert_eq!(outcome.removed, vec![y, x.clone()]);
    assert!(!x.exists());
}

#[test]
fn test_rollback_twice_succeeds_both_times() {
    let temp = TempDir::new().unwrap();
    let mut ledger = CheckpointLedger::new();
    ledger.open_checkpoint(Phase::FileRendering, "files");
    ledger.record_created(write_file(temp.path(), "pkg/__init__.py", ""));
    ledger.record_created(make_dir(temp.path(), "pkg"));

    let executor = RollbackExecutor::new();
    let checkpoint = ledger.current().unwrap();
    let first = executor.rollback(checkpoint);
    assert!(first.success());
    assert_eq!(first.removed.len(), 2);

    let second = executor.rollback(checkpoint);
    assert!(second.success());
    assert!(second.removed.is_empty());
    assert_eq!(second.already_absent.len(), 2);
}

#[test]
fn test_later_checkpoint_owns_new_paths() {
    let mut ledger = CheckpointLedger::new();
    let a = ledger.open_checkpoint("a", "first");
    ledger.record_created("/p/one");
    let held = ledger.snapshot();
    let b = ledger.open_checkpoint("b", "second");
    ledger.record_created("/p/two");

    assert_eq!(ledger.owner_of(std::path::Path::new("/p/two")), Some(b));
    assert!(!ledger.get(a).unwrap().owns_created(std::path::Path::new("/p/two")));
    // Earlier snapshots are unaffected.
    assert_eq!(held.checkpoints[0].created_paths.len(), 1);
    assert!(a < b);
}

#[test]
fn test_partial_recovery_truncates_to_last_good_phase() {
    let temp = TempDir::new().unwrap();
    let mut orch = RecoveryOrchestrator::new(DiagnosticRecorder::disabled());
    orch.open_checkpoint(Phase::Validation, "init");
    orch.open_checkpoint(Phase::FileRendering, "files");
    orch.record_created(write_file(temp.path(), "README.md", "# demo"));
    orch.open_checkpoint(Phase::GitInitialization, "commit");
    orch.record_created(make_dir(temp.path(), ".git"));

    let bundle = orch.build_recovery_bundle(FailureContext::new(
        Fault::new(FaultKind::AlreadyExists, ".git already exists"),
        Phase::GitInitialization,
        "git init",
    ));
    let outcome = orch.execute_recovery(&bundle, RecoveryStrategy::PartialRecovery);
    assert!(outcome.success, "{}", outcome.message);

    let descriptions: Vec<_> = orch
        .ledger()
        .checkpoints()
        .iter()
        .map(|cp| cp.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["init", "files"]);
    assert!(temp.path().join("README.md").exists());
    assert!(!temp.path().join(".git").exists());
}

#[tokio::test]
async fn test_detached_rollback_runs_on_blocking_pool() {
    let temp = TempDir::new().unwrap();
    let mut ledger = CheckpointLedger::new();
    ledger.open_checkpoint(Phase::FileRendering, "files");
    let paths: Vec<PathBuf> = (0..5)
        .map(|i| write_file(temp.path(), &format!("f{}.txt", i), "x"))
        .collect();
    for path in &paths {
        ledger.record_created(path);
    }

    let outcome = rollback_detached(
        RollbackExecutor::new(),
        ledger.checkpoints().to_vec(),
        RollbackOrder::NewestFirst,
    )
    .await
    .unwrap();
    assert!(outcome.success());
    assert!(paths.iter().all(|p| !p.exists()));
}
