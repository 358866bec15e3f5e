//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve storage path, logging and polling settings.
//!
//! # Invariants
//! - Precedence is explicit override, then environment, then default.
//! - Resolution never fails; invalid environment values fall back to
//!   defaults with a warning.

use crate::logging::default_log_level;
use crate::service::overdue::DEFAULT_POLL_INTERVAL;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TASKDECK_DB_PATH";
pub const ENV_LOG_DIR: &str = "TASKDECK_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "TASKDECK_LOG_LEVEL";
pub const ENV_POLL_SECS: &str = "TASKDECK_POLL_SECS";

const APP_DIR_NAME: &str = "taskdeck";
const DB_FILE_NAME: &str = "taskdeck.sqlite3";

/// Explicit settings, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub poll_interval: Option<Duration>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    /// Logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub poll_interval: Duration,
}

impl CoreConfig {
    /// Resolves configuration from overrides and the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves configuration using `lookup` in place of the environment.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env_value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = overrides
            .db_path
            .or_else(|| env_value(ENV_DB_PATH).map(PathBuf::from))
            .unwrap_or_else(default_db_path);
        let log_dir = overrides
            .log_dir
            .or_else(|| env_value(ENV_LOG_DIR).map(PathBuf::from));
        let log_level = overrides
            .log_level
            .or_else(|| env_value(ENV_LOG_LEVEL))
            .unwrap_or_else(|| default_log_level().to_string());
        let poll_interval = overrides
            .poll_interval
            .or_else(|| env_value(ENV_POLL_SECS).and_then(|raw| parse_poll_secs(&raw)))
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Self {
            db_path,
            log_dir,
            log_level,
            poll_interval,
        }
    }
}

fn parse_poll_secs(raw: &str) -> Option<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!("event=config_resolve module=config status=fallback key={ENV_POLL_SECS} value={raw}");
            None
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(DB_FILE_NAME)
}
