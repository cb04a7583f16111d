//! Subscriber setup.
//!
//! Builds the four sinks from a [`LoggingConfig`] and installs a
//! `tracing_subscriber` registry that feeds them through a [`FanoutLayer`].

use super::fanout::LogFanout;
use super::layer::FanoutLayer;
use super::level::Severity;
use super::sink::{ConsoleSink, Sink, StructuredFileSink, TextFileSink};
use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the console, general, error and structured sinks.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
pub fn build_fanout(config: &LoggingConfig) -> Result<LogFanout> {
    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!(
            "Failed to create log directory {}",
            config.log_dir.display()
        )
    })?;

    let sinks: Vec<Box<dyn Sink>> = vec![
        Box::new(ConsoleSink::stdout(config.level, config.console_color)),
        Box::new(TextFileSink::new(
            "general",
            config.general_path(),
            config.level,
            config.general,
        )),
        Box::new(TextFileSink::new(
            "errors",
            config.errors_path(),
            Severity::Error,
            config.errors,
        )),
        Box::new(StructuredFileSink::new(
            config.structured_path(),
            config.level,
            config.structured,
        )),
    ];

    Ok(LogFanout::new(sinks))
}

/// Builds the sinks and installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the event filter when set; otherwise every event at
/// or above the configured level passes and each sink applies its own
/// minimum.
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be created
/// - A global subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<Arc<LogFanout>> {
    let fanout = Arc::new(build_fanout(config)?);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_level_filter().to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(FanoutLayer::new(Arc::clone(&fanout)))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(fanout)
}
