//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//! - Apply explicit overrides (CLI flags) on top of environment values.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - A resolved `log_level` is always a canonical level name.
//! - A resolved `log_dir`, when present, is absolute.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "QUILLNOTE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "QUILLNOTE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "QUILLNOTE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "quillnote.sqlite3";

/// Configuration failures.
#[derive(Debug)]
pub enum ConfigError {
    InvalidLogLevel(LoggingError),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(err) => write!(f, "{err}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
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

/// Explicit settings that win over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolves configuration from process environment plus overrides.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = overrides
            .db_path
            .or_else(|| read(DB_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match overrides.log_level.or_else(|| read(LOG_LEVEL_ENV)) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = overrides
            .log_dir
            .or_else(|| read(LOG_DIR_ENV).map(PathBuf::from));
        if let Some(dir) = log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ConfigOverrides, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = AppConfig::resolve(env(&[]), ConfigOverrides::default()).unwrap();
        assert_eq!(config.db_path, std::env::temp_dir().join("quillnote.sqlite3"));
        assert!(config.log_dir.is_none());
        assert!(["debug", "info"].contains(&config.log_level));
    }

    #[test]
    fn environment_values_are_trimmed_and_blank_means_unset() {
        let config = AppConfig::resolve(
            env(&[(DB_PATH_ENV, "  /data/notes.db "), (LOG_LEVEL_ENV, "   ")]),
            ConfigOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/notes.db"));
        assert!(["debug", "info"].contains(&config.log_level));
    }

    #[test]
    fn overrides_win_over_environment() {
        let overrides = ConfigOverrides {
            db_path: Some(PathBuf::from("/override.db")),
            log_level: Some("WARNING".to_string()),
            log_dir: None,
        };
        let config = AppConfig::resolve(
            env(&[(DB_PATH_ENV, "/env.db"), (LOG_LEVEL_ENV, "trace")]),
            overrides,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/override.db"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_level_and_relative_log_dir_are_rejected() {
        let level_err = AppConfig::resolve(
            env(&[(LOG_LEVEL_ENV, "loud")]),
            ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(level_err, ConfigError::InvalidLogLevel(_)));

        let dir_err = AppConfig::resolve(
            env(&[(LOG_DIR_ENV, "relative/logs")]),
            ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(dir_err, ConfigError::RelativeLogDir(_)));
    }
}
