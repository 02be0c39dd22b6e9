//! Process configuration for embedding binaries.
//!
//! # Responsibility
//! - Collect bootstrap settings (logging, database location) from the
//!   environment into one explicit object that is passed into
//!   constructors; core modules never read the environment themselves.

use crate::logging::default_log_level;
use std::path::PathBuf;

const ENV_LOG_LEVEL: &str = "ROTINA_LOG_LEVEL";
const ENV_LOG_DIR: &str = "ROTINA_LOG_DIR";
const ENV_DB_PATH: &str = "ROTINA_DB_PATH";

/// Bootstrap configuration for a process embedding the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Log level name accepted by `logging::init_logging`.
    pub log_level: String,
    /// Directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// SQLite database file; `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
}

impl CoreConfig {
    /// Builds configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    ///
    /// Split out from [`CoreConfig::from_env`] so tests do not have to
    /// mutate process-global environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            log_level: non_empty(ENV_LOG_LEVEL)
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_empty(ENV_LOG_DIR).map(PathBuf::from),
            db_path: non_empty(ENV_DB_PATH).map(PathBuf::from),
        }
    }
}
