//! Runtime configuration read from the environment.
//!
//! | Variable             | Default                  |
//! |----------------------|--------------------------|
//! | `PREMIUM_MODEL_DIR`  | `models`                 |
//! | `PREMIUM_LOG_MODE`   | `auto`                   |
//! | `PREMIUM_LOG_FILE`   | `premium-predictor.log`  |

use std::path::PathBuf;

pub const MODEL_DIR_ENV: &str = "PREMIUM_MODEL_DIR";
pub const LOG_MODE_ENV: &str = "PREMIUM_LOG_MODE";
pub const LOG_FILE_ENV: &str = "PREMIUM_LOG_FILE";

const DEFAULT_MODEL_DIR: &str = "models";
const DEFAULT_LOG_FILE: &str = "premium-predictor.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when attached to a terminal (the TUI owns the screen), stdout otherwise.
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            model_dir: non_empty(MODEL_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            log_mode: non_empty(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: non_empty(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        }
    }
}
