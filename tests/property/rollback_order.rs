//! Property-based tests for rollback over nested trees

use proptest::prelude::*;
use scaffold_recovery::{CheckpointLedger, Phase, RollbackExecutor, RollbackOrder};
use std::fs;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Each checkpoint creates one directory nested in the previous one plus a
    /// file inside it. Rolling back newest first removes every path with no
    /// failures and every child before its parent.
    #[test]
    fn prop_nested_rollback_removes_children_first(depth in 1usize..6, files in 0usize..4) {
        let temp = TempDir::new().unwrap();
        let mut ledger = CheckpointLedger::new();
        let mut dir = temp.path().to_path_buf();
        for level in 0..depth {
            ledger.open_checkpoint(Phase::DirectoryCreation, format!("level {}", level));
            dir = dir.join(format!("d{}", level));
            fs::create_dir(&dir).unwrap();
            ledger.record_created(&dir);
            for f in 0..files {
                let file = dir.join(format!("f{}.txt", f));
                fs::write(&file, "x").unwrap();
                ledger.record_created(file);
            }
        }

        let outcome = RollbackExecutor::new().rollback_many(ledger.checkpoints(), RollbackOrder::NewestFirst);
        prop_assert!(outcome.success());
        prop_assert_eq!(outcome.removed.len(), depth * (files + 1));
        prop_assert!(outcome.already_absent.is_empty());
        for (i, removed) in outcome.removed.iter().enumerate() {
            for later in &outcome.removed[i + 1..] {
                prop_assert!(!later.starts_with(removed), "{:?} removed before child {:?}", removed, later);
            }
        }
        prop_assert!(!temp.path().join("d0").exists());
    }
}
