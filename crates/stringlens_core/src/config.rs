//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings with stable defaults.
//!
//! # Invariants
//! - Blank environment values behave as if unset.
//! - A configured log directory is always absolute.

use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "STRINGLENS_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "STRINGLENS_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "STRINGLENS_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "stringlens.sqlite3";

/// Invalid configuration value.
#[derive(Debug)]
pub enum ConfigError {
    InvalidLogLevel(LoggingError),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(err) => write!(f, "{LOG_LEVEL_ENV}: {err}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "{LOG_DIR_ENV} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel(err) => Some(err),
            Self::RelativeLogDir(_) => None,
        }
    }
}

/// Settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    ///
    /// Lets callers and tests resolve settings without mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let db_path = read(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from);
        let log_level = match read(LOG_LEVEL_ENV) {
            Some(raw) => raw.parse::<LogLevel>().map_err(ConfigError::InvalidLogLevel)?,
            None => defaults.log_level,
        };
        let log_dir = match read(LOG_DIR_ENV).map(PathBuf::from) {
            Some(dir) if !dir.is_absolute() => return Err(ConfigError::RelativeLogDir(dir)),
            other => other,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::LogLevel;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[(DB_PATH_ENV, "  ")])).unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "/data/strings.db"),
            (LOG_LEVEL_ENV, "WARN"),
            (LOG_DIR_ENV, "/var/log/stringlens"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/strings.db"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/stringlens")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            CoreConfig::from_lookup(lookup(&[(LOG_LEVEL_ENV, "loud")])),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            CoreConfig::from_lookup(lookup(&[(LOG_DIR_ENV, "logs")])),
            Err(ConfigError::RelativeLogDir(_))
        ));
    }
}
