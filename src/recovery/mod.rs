//! Recovery: strategy selection, failure bundles and strategy execution.

pub mod advisor;
pub mod bundle;
pub mod orchestrator;
pub mod strategy;

pub use advisor::{suggest, StrategyAdvisor, DEFAULT_OPTIONAL_PHASES};
pub use bundle::{FailureContext, PartialResults, RecoveryBundle};
pub use orchestrator::{RecoveryOrchestrator, RecoveryOutcome};
pub use strategy::RecoveryStrategy;
