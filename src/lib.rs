//! scaffold-recovery: failure recovery for project scaffold generation
//!
//! Tracks the files a generation run creates in ordered checkpoints, rolls
//! them back deepest-first when a phase fails, recommends a recovery strategy
//! for the failure, and leaves a sanitized diagnostic record behind.

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fault;
pub mod logging;
pub mod recovery;
pub mod rollback;
pub mod types;

pub use checkpoint::{Checkpoint, CheckpointId, CheckpointLedger, LedgerSnapshot};
pub use config::RecoveryConfig;
pub use diagnostics::{DiagnosticRecord, DiagnosticRecorder};
pub use error::{AppError, DiagnosticError, LedgerError, RecoveryError};
pub use fault::{Fault, FaultKind};
pub use recovery::{
    FailureContext, PartialResults, RecoveryBundle, RecoveryOrchestrator, RecoveryOutcome,
    RecoveryStrategy, StrategyAdvisor,
};
pub use rollback::{rollback_detached, RollbackExecutor, RollbackOrder, RollbackOutcome};
pub use types::Phase;
