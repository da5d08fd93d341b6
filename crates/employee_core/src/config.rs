//! Application configuration.
//!
//! # Responsibility
//! - Load database and logging settings from a TOML file.
//! - Apply `EMPLOYEE_*` environment overrides on top of file values.
//!
//! # Invariants
//! - A missing config file yields defaults, never an error.
//! - Every field has a default, so partial files are accepted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DB_PATH: &str = "EMPLOYEE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "EMPLOYEE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "EMPLOYEE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "employees.sqlite3";
const IN_MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Root configuration, usually loaded from `employee.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path. `None` selects an in-memory database; both the
    /// file and `EMPLOYEE_DB_PATH` spell that as `:memory:`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_DB_FILE_NAME)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        if config
            .database
            .path
            .as_deref()
            .is_some_and(|path| path.as_os_str() == IN_MEMORY_DB_PATH)
        {
            config.database.path = None;
        }
        Ok(config)
    }

    /// Applies `EMPLOYEE_*` environment variables from the process.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database.path = match path.trim() {
                IN_MEMORY_DB_PATH => None,
                other => Some(PathBuf::from(other)),
            };
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir.trim());
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    message: format!("expected an absolute path, got `{}`", dir.display()),
                });
            }
            self.logging.dir = Some(dir);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let config = AppConfig::from_toml_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.database, AppConfig::default().database);
    }

    #[test]
    fn memory_path_in_file_selects_in_memory_database() {
        let config = AppConfig::from_toml_str("[database]\npath = \":memory:\"\n").unwrap();
        assert_eq!(config.database.path, None);

        let config = AppConfig::from_toml_str("[database]\npath = \"staff.db\"\n").unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("staff.db")));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[database\npath = 1").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup_from(&[
                (ENV_DB_PATH, ":memory:"),
                (ENV_LOG_LEVEL, "trace"),
                (ENV_LOG_DIR, "/var/log/employee"),
            ]))
            .unwrap();

        assert_eq!(config.database.path, None);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/employee")));
    }

    #[test]
    fn relative_log_dir_override_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[(ENV_LOG_DIR, "logs")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LOG_DIR));
    }
}
