//! Configuration module for Loglink.
//!
//! This module contains configuration structures for the logging pipeline.

pub mod logging;

pub use logging::{LoggingConfig, ERROR_LOG_FILE, GENERAL_LOG_FILE, STRUCTURED_LOG_FILE};
