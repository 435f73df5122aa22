//! Application configuration.
//!
//! # Responsibility
//! - Resolve database, legacy import, refresh and logging settings from the
//!   environment.
//! - Apply caller overrides (CLI flags) on top of environment values.
//!
//! # Invariants
//! - `refresh_interval` is never zero.
//! - Blank environment values are treated as unset.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DB_ENV_VAR: &str = "TASKLEDGER_DB";
/// Older deployments configured the database file through this name.
pub const LEGACY_DB_ENV_VAR: &str = "DATABASE_NAME";
pub const LEGACY_CSV_ENV_VAR: &str = "TASKLEDGER_LEGACY_CSV";
pub const REFRESH_ENV_VAR: &str = "TASKLEDGER_REFRESH_SECS";
pub const LOG_LEVEL_ENV_VAR: &str = "TASKLEDGER_LOG_LEVEL";
pub const LOG_DIR_ENV_VAR: &str = "TASKLEDGER_LOG_DIR";

const DEFAULT_DB_FILE: &str = "database.db";
const DEFAULT_LEGACY_CSV_FILE: &str = "alumnos_pendientes.csv";
const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub legacy_csv_path: PathBuf,
    pub refresh_interval: Duration,
    pub log_level: String,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            legacy_csv_path: PathBuf::from(DEFAULT_LEGACY_CSV_FILE),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Optional per-invocation overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub legacy_csv_path: Option<PathBuf>,
    pub refresh_interval: Option<Duration>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(DB_ENV_VAR).or_else(|| read(LEGACY_DB_ENV_VAR)) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(path) = read(LEGACY_CSV_ENV_VAR) {
            config.legacy_csv_path = PathBuf::from(path);
        }
        if let Some(raw) = read(REFRESH_ENV_VAR) {
            config.refresh_interval = parse_refresh_secs(&raw)?;
        }
        if let Some(level) = read(LOG_LEVEL_ENV_VAR) {
            config.log_level = level;
        }
        config.log_dir = read(LOG_DIR_ENV_VAR).map(PathBuf::from);

        Ok(config)
    }

    /// Returns a copy with every `Some` override applied.
    pub fn merge_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(path) = &overrides.db_path {
            merged.db_path = path.clone();
        }
        if let Some(path) = &overrides.legacy_csv_path {
            merged.legacy_csv_path = path.clone();
        }
        if let Some(interval) = overrides.refresh_interval {
            if !interval.is_zero() {
                merged.refresh_interval = interval;
            }
        }
        if let Some(level) = &overrides.log_level {
            merged.log_level = level.clone();
        }
        if let Some(dir) = &overrides.log_dir {
            merged.log_dir = Some(dir.clone());
        }
        merged
    }
}

fn parse_refresh_secs(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &'static str| ConfigError::InvalidValue {
        key: REFRESH_ENV_VAR,
        value: raw.to_string(),
        reason,
    };
    let secs: u64 = raw.parse().map_err(|_| invalid("expected whole seconds"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
