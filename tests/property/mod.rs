//! Property-based tests for rollback ordering, ledger ids and redaction

mod rollback_order;
