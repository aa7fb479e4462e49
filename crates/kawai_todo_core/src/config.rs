//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Resolution never fails; unset, blank or invalid values use defaults.
//! - Paths are used as given; relative log dirs are rejected later by
//!   `init_logging`.

use crate::logging::{default_log_level, normalize_level};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "KAWAI_TODO_DB_PATH";
pub const LOG_DIR_ENV: &str = "KAWAI_TODO_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "KAWAI_TODO_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "kawai_todo.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "kawai_todo_logs";

/// Effective settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding the `toDos` record.
    pub db_path: PathBuf,
    /// Directory for rotating log files.
    pub log_dir: PathBuf,
    /// Normalized log level (`trace|debug|info|warn|error`).
    pub log_level: &'static str,
}

impl AppConfig {
    /// Reads `KAWAI_TODO_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = non_blank(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_dir = non_blank(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
        let log_level = non_blank(LOG_LEVEL_ENV)
            .and_then(|value| normalize_level(&value).ok())
            .unwrap_or_else(default_log_level);

        Self {
            db_path,
            log_dir,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults_live_under_temp_dir() {
        let config = config_from(&[]);
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("kawai_todo.sqlite3")
        );
        assert!(config.log_dir.starts_with(std::env::temp_dir()));
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn explicit_values_are_trimmed_and_normalized() {
        let config = config_from(&[
            (DB_PATH_ENV, " /data/todos.sqlite3 "),
            (LOG_DIR_ENV, "/data/logs"),
            (LOG_LEVEL_ENV, "WARNING"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/data/todos.sqlite3"));
        assert_eq!(config.log_dir, PathBuf::from("/data/logs"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn blank_or_invalid_values_fall_back() {
        let config = config_from(&[(DB_PATH_ENV, "   "), (LOG_LEVEL_ENV, "loud")]);
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("kawai_todo.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
    }
}
