//! Shared test utilities for integration tests
//!
//! Environment isolation for config tests and small filesystem helpers for
//! building the trees a generation run would leave behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes access to HOME / XDG_CONFIG_HOME / SCAFFOLD_RECOVERY__* across tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDE_VARS: &[&str] = &[
    "SCAFFOLD_RECOVERY__DIAGNOSTICS__ENABLED",
    "SCAFFOLD_RECOVERY__DIAGNOSTICS__LOG_DIR",
    "SCAFFOLD_RECOVERY__DIAGNOSTICS__MAX_RECORDS",
    "SCAFFOLD_RECOVERY__ADVISOR__OPTIONAL_PHASES",
];

struct EnvState {
    saved: Vec<(String, Option<String>)>,
}

impl EnvState {
    fn capture() -> Self {
        let names = ["HOME", "XDG_CONFIG_HOME"]
            .iter()
            .chain(OVERRIDE_VARS.iter());
        Self {
            saved: names
                .map(|name| (name.to_string(), std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.saved {
            match value {
                Some(orig) => std::env::set_var(&name, orig),
                None => std::env::remove_var(&name),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir` and every
/// `SCAFFOLD_RECOVERY__*` override cleared, restoring the environment after.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    let test_config_home = test_dir.path().join("xdg-config");
    fs::create_dir_all(&test_home).unwrap();
    fs::create_dir_all(&test_config_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_config_home.to_str().unwrap());
    for name in OVERRIDE_VARS {
        std::env::remove_var(name);
    }

    let result = f();

    env_state.restore();

    result
}

/// Write `contents` to `root/rel`, creating parents.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Create `root/rel` as a directory.
pub fn make_dir(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(&path).unwrap();
    path
}
