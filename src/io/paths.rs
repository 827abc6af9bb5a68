use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TASKLOG_DIR";

pub const STATE_FILE: &str = "state.json";

const LEDGER_FILE: &str = "todo-tasks.txt";

/// Resolve the data directory: explicit override, then `$TASKLOG_DIR`, then
/// `$XDG_DATA_HOME/tasklog`, then `~/.local/share/tasklog`.
pub fn data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_path(DATA_DIR_ENV) {
        return dir;
    }
    let data_home = env_path("XDG_DATA_HOME").unwrap_or_else(|| home_dir().join(".local/share"));
    data_home.join("tasklog")
}

pub fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STATE_FILE)
}

/// Ledger location from config, defaulting to `~/todo-tasks.txt`
pub fn ledger_path(config: &AppConfig) -> PathBuf {
    config
        .ledger
        .path
        .clone()
        .unwrap_or_else(|| home_dir().join(LEDGER_FILE))
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Get the user's home directory
fn home_dir() -> PathBuf {
    env_path("HOME").unwrap_or_else(|| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        assert_eq!(data_dir(Some(Path::new("/tmp/x"))), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn configured_ledger_path_is_used() {
        let mut config = AppConfig::default();
        config.ledger.path = Some(PathBuf::from("/tmp/ledger.txt"));
        assert_eq!(ledger_path(&config), PathBuf::from("/tmp/ledger.txt"));
    }

    #[test]
    fn default_ledger_lives_in_home() {
        let path = ledger_path(&AppConfig::default());
        assert!(path.ends_with("todo-tasks.txt"));
    }
}
