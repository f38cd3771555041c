//! Runtime configuration loaded from the process environment.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults.
//! - Set-but-invalid variables are errors, never silently ignored.

use crate::clock::{Clock, FixedOffsetWallClock, SystemClock, MAX_OFFSET_HOURS};
use crate::logging::{default_log_level, init_logging};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "ORGLEDGER_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "ORGLEDGER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ORGLEDGER_LOG_DIR";
pub const END_DATE_OFFSET_VAR: &str = "ORGLEDGER_END_DATE_OFFSET_HOURS";

const DEFAULT_DB_FILE_NAME: &str = "orgledger.sqlite3";

/// Configuration error for one environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but empty after trim.
    Empty(&'static str),
    /// Variable value cannot be parsed or is out of range.
    Invalid { var: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(var) => write!(f, "{var} is set but empty"),
            Self::Invalid { var, value } => write!(f, "{var} has invalid value `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Core runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Log level passed to `init_logging`.
    pub log_level: String,
    /// Absolute log directory; file logging stays off when `None`.
    pub log_dir: Option<String>,
    /// Business timezone offset used to stamp history end dates.
    pub end_date_offset_hours: Option<i32>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            end_date_offset_hours: None,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_empty(&lookup, DB_PATH_VAR)? {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_empty(&lookup, LOG_LEVEL_VAR)? {
            config.log_level = level;
        }
        config.log_dir = non_empty(&lookup, LOG_DIR_VAR)?;

        if let Some(raw) = non_empty(&lookup, END_DATE_OFFSET_VAR)? {
            let hours = raw
                .parse::<i32>()
                .ok()
                .filter(|hours| hours.abs() <= MAX_OFFSET_HOURS)
                .ok_or_else(|| ConfigError::Invalid {
                    var: END_DATE_OFFSET_VAR,
                    value: raw.clone(),
                })?;
            config.end_date_offset_hours = Some(hours);
        }

        Ok(config)
    }

    /// Builds the clock used for history `end_date` values.
    pub fn history_clock(&self) -> Box<dyn Clock> {
        match self
            .end_date_offset_hours
            .and_then(FixedOffsetWallClock::from_hours)
        {
            Some(clock) => Box::new(clock),
            None => Box::new(SystemClock),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` and leaves logging untouched when `log_dir` is
    /// unset.
    pub fn init_logging(&self) -> Result<bool, String> {
        match self.log_dir.as_deref() {
            Some(log_dir) => init_logging(&self.log_level, log_dir).map(|()| true),
            None => Ok(false),
        }
    }
}

fn non_empty<F>(lookup: &F, var: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(var)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}
