//! Logging configuration.
//!
//! Describes the four log sinks the service writes to and how each file is
//! rotated. Values come from the environment:
//! - `LOG_LEVEL`: minimum level for the console, general and structured sinks
//!   (default: `INFO`)
//! - `LOG_DIR`: directory for log files (default: `logs`)
//! - `LOG_COLOR`: colorize console output (default: `true`)

use crate::logging::{RotationPolicy, Severity};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// File name of the general plain-text log.
pub const GENERAL_LOG_FILE: &str = "app.log";
/// File name of the error-only plain-text log.
pub const ERROR_LOG_FILE: &str = "errors.log";
/// File name of the newline-delimited JSON log.
pub const STRUCTURED_LOG_FILE: &str = "structured.json";

/// Configuration for the log fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level for console, general and structured sinks.
    pub level: Severity,
    /// Directory holding the log files.
    pub log_dir: PathBuf,
    /// Colorize console output.
    pub console_color: bool,
    /// Rotation of `app.log`.
    pub general: RotationPolicy,
    /// Rotation of `errors.log`.
    pub errors: RotationPolicy,
    /// Rotation of `structured.json`.
    pub structured: RotationPolicy,
}

impl LoggingConfig {
    /// Loads logging configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `LOG_LEVEL` is set but is not a known level
    /// - `LOG_COLOR` is set but is not a boolean
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.level = level.parse().context("Invalid LOG_LEVEL")?;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Ok(color) = std::env::var("LOG_COLOR") {
            config.console_color = color
                .parse()
                .with_context(|| format!("Invalid LOG_COLOR '{color}'"))?;
        }

        Ok(config)
    }

    /// Sets the minimum level.
    #[must_use]
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// Sets the log directory.
    #[must_use]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Path of the general log file.
    #[must_use]
    pub fn general_path(&self) -> PathBuf {
        self.log_dir.join(GENERAL_LOG_FILE)
    }

    /// Path of the error log file.
    #[must_use]
    pub fn errors_path(&self) -> PathBuf {
        self.log_dir.join(ERROR_LOG_FILE)
    }

    /// Path of the structured log file.
    #[must_use]
    pub fn structured_path(&self) -> PathBuf {
        self.log_dir.join(STRUCTURED_LOG_FILE)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            log_dir: PathBuf::from("logs"),
            console_color: true,
            general: RotationPolicy::new(100, 10, true),
            errors: RotationPolicy::new(50, 30, true),
            structured: RotationPolicy::new(100, 10, true),
        }
    }
}
