//! Loglink Shared Library
//!
//! This crate contains the request correlation context, the structured log
//! fan-out, and the user models shared by the Loglink API server and CLI.
//!
//! # Modules
//!
//! - [`correlation`] - Per-request correlation ids bound to the async task
//! - [`logging`] - Log events, sinks, file rotation, and the `tracing` layer
//! - [`config`] - Logging configuration
//! - [`models`] - User data models
//! - [`storage`] - User storage traits and implementations
//!
//! # Example
//!
//! ```
//! use shared::correlation::{self, CorrelationId};
//! use shared::logging::{ConsoleSink, LogFanout, Severity, SinkOutcome};
//!
//! let fanout = LogFanout::new(vec![Box::new(ConsoleSink::with_writer(
//!     Severity::Info,
//!     false,
//!     Box::new(std::io::sink()),
//! ))]);
//!
//! let report = correlation::bind_sync(CorrelationId::new("trace-A"), || {
//!     fanout.emit(Severity::Info, "User logged in", serde_json::Map::new())
//! });
//!
//! assert_eq!(report.outcome("console"), Some(&SinkOutcome::Written));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod correlation;
pub mod logging;
pub mod models;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;
