//! Config loading facade: assembles sources in precedence order.

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::RecoveryConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Loads [`RecoveryConfig`] from defaults, files and environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    ///
    /// Precedence (highest last): defaults, global file, workspace file, environment.
    pub fn load(workspace_root: &Path) -> Result<RecoveryConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        let mut config: RecoveryConfig = builder.build()?.try_deserialize()?;
        config.diagnostics.resolve_against(workspace_root);
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from a single explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<RecoveryConfig, ConfigError> {
        let builder = builder_with_defaults()?.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);
        let mut config: RecoveryConfig = builder.build()?.try_deserialize()?;
        if let Some(parent) = path.parent() {
            config.diagnostics.resolve_against(parent);
        }
        Ok(config)
    }
}
