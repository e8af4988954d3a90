//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{AppError, DiagnosticError};

/// Map tool errors to a single line for stderr.
pub fn map_error(e: &AppError) -> String {
    match e {
        AppError::Diagnostic(DiagnosticError::DirectoryNotFound(dir)) => format!(
            "No diagnostic records: directory {} does not exist",
            dir.display()
        ),
        other => other.to_string(),
    }
}
