//! Diagnostics
//!
//! Sanitized, per-failure JSON records written for post-hoc debugging.

pub mod inspect;
pub mod recorder;
pub mod sanitize;

pub use inspect::{list_records, load_record, prune_records, DiagnosticEntry};
pub use recorder::{default_log_dir, DiagnosticRecord, DiagnosticRecorder};
pub use sanitize::{is_sensitive_key, sanitize_value, sanitize_variables, REDACTED};
