//! Workspace config file source: <workspace>/.scaffold/recovery.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".scaffold").join("recovery.toml")
}

/// Add workspace config file to builder when present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_config_path(workspace_root);
    if path.exists() {
        return Ok(builder.add_source(File::from(path).required(false)));
    }
    Ok(builder)
}
