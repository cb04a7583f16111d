//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::config::LoggingConfig;
use std::net::SocketAddr;

/// Server configuration.
///
/// Configuration values can be set via environment variables (a `.env` file
/// is honored by the binary):
/// - `APP_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `APP_PORT`: The port to listen on (default: 8000)
/// - `APP_NAME`: Name reported by the root endpoint (default: "Loglink")
/// - `APP_DEBUG`: Debug mode flag (default: false)
/// - `LOG_LEVEL`, `LOG_DIR`, `LOG_COLOR`: see [`LoggingConfig::from_env`]
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Application name.
    pub app_name: String,
    /// Debug mode.
    pub debug: bool,
    /// Logging pipeline configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `APP_PORT` is set but cannot be parsed as a valid port number
    /// - `APP_DEBUG` is set but is not `true` or `false`
    /// - The logging configuration is invalid
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("APP_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("Invalid APP_PORT")?
            .unwrap_or(8000);

        let app_name = std::env::var("APP_NAME").unwrap_or_else(|_| "Loglink".to_string());

        let debug = std::env::var("APP_DEBUG")
            .ok()
            .map(|d| d.parse::<bool>())
            .transpose()
            .context("Invalid APP_DEBUG")?
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            app_name,
            debug,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            app_name: "Loglink".to_string(),
            debug: false,
            logging: LoggingConfig::default(),
        }
    }
}
