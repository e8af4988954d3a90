//! Shared domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline stage that opened a checkpoint.
///
/// Serialized as its snake_case tag; unknown tags round-trip as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    Validation,
    DirectoryCreation,
    FileRendering,
    GitInitialization,
    VenvCreation,
    PostCommands,
    Custom(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Validation => "validation",
            Phase::DirectoryCreation => "directory_creation",
            Phase::FileRendering => "file_rendering",
            Phase::GitInitialization => "git_initialization",
            Phase::VenvCreation => "venv_creation",
            Phase::PostCommands => "post_commands",
            Phase::Custom(name) => name.as_str(),
        }
    }

    /// Tag safe to embed in a file name (ASCII alphanumerics, `-` and `_`).
    pub fn file_tag(&self) -> String {
        let tag: String = self
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if tag.is_empty() {
            "unknown".to_string()
        } else {
            tag
        }
    }
}

impl From<&str> for Phase {
    fn from(value: &str) -> Self {
        match value {
            "validation" => Phase::Validation,
            "directory_creation" => Phase::DirectoryCreation,
            "file_rendering" => Phase::FileRendering,
            "git_initialization" => Phase::GitInitialization,
            "venv_creation" => Phase::VenvCreation,
            "post_commands" => Phase::PostCommands,
            other => Phase::Custom(other.to_string()),
        }
    }
}

impl From<String> for Phase {
    fn from(value: String) -> Self {
        Phase::from(value.as_str())
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_str().to_string()
    }
}

impl FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Phase::from(s))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
