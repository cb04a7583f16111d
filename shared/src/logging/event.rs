//! Log event model.
//!
//! A [`LogEvent`] is an immutable snapshot built once per logging call and
//! handed by reference to every sink. [`StructuredRecord`] is the JSON shape
//! of one line in the structured log file.

use super::level::Severity;
use crate::correlation::{self, CorrelationId, ABSENT_CORRELATION_ID};
use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::panic::Location;

/// Function name recorded when the call site is not inside any span.
pub const UNKNOWN_FUNCTION: &str = "<module>";

/// Where a log event was emitted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Logger name, usually the module path.
    pub logger: String,
    /// Enclosing function (or span) name.
    pub function: String,
    /// Line number of the call site.
    pub line: u32,
}

impl SourceLocation {
    /// Creates a source location from its parts.
    #[must_use]
    pub fn new(logger: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        Self {
            logger: logger.into(),
            function: function.into(),
            line,
        }
    }

    /// Captures the location of the caller.
    ///
    /// The logger name is derived from the source file path, e.g.
    /// `api/src/routes/users.rs` becomes `routes::users`.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(
            logger_from_file(location.file()),
            UNKNOWN_FUNCTION,
            location.line(),
        )
    }
}

fn logger_from_file(file: &str) -> String {
    let file = file.replace('\\', "/");
    let relative = file
        .rsplit_once("src/")
        .map_or(file.as_str(), |(_, rest)| rest);
    let stem = relative.strip_suffix(".rs").unwrap_or(relative);
    let stem = stem.strip_suffix("/mod").unwrap_or(stem);
    if matches!(stem, "" | "lib" | "main") {
        "root".to_string()
    } else {
        stem.replace('/', "::")
    }
}

/// A single log event, captured at the logging call.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Capture time.
    pub timestamp: DateTime<Local>,
    /// Severity of the event.
    pub level: Severity,
    /// Human-readable message.
    pub message: String,
    /// Caller-supplied key/value fields.
    pub fields: Map<String, Value>,
    /// Correlation id bound when the event was captured.
    pub correlation_id: Option<CorrelationId>,
    /// Call site.
    pub source: SourceLocation,
}

impl LogEvent {
    /// Captures a new event, reading the ambient correlation id.
    #[must_use]
    pub fn capture(
        level: Severity,
        message: impl Into<String>,
        fields: Map<String, Value>,
        source: SourceLocation,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
            fields,
            correlation_id: correlation::current(),
            source,
        }
    }

    /// Overrides the correlation id recorded on this event.
    #[must_use]
    pub fn with_correlation_id(mut self, id: Option<CorrelationId>) -> Self {
        self.correlation_id = id;
        self
    }

    /// Correlation id as rendered by sinks, `"N/A"` when absent.
    #[must_use]
    pub fn correlation_str(&self) -> &str {
        self.correlation_id
            .as_ref()
            .map_or(ABSENT_CORRELATION_ID, CorrelationId::as_str)
    }

    /// `key=value` pairs of the caller fields, sorted by key.
    #[must_use]
    pub fn fields_as_pairs(&self) -> String {
        let mut keys: Vec<&String> = self.fields.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| match &self.fields[key] {
                Value::String(s) => format!("{key}={s}"),
                other => format!("{key}={other}"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One line of the structured (NDJSON) log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    /// ISO-8601 timestamp with offset.
    pub timestamp: DateTime<FixedOffset>,
    /// Severity name.
    pub level: Severity,
    /// Logger (module) name.
    pub logger: String,
    /// Function name.
    pub function: String,
    /// Line number.
    pub line: u32,
    /// Log message.
    pub message: String,
    /// Correlation id, or `"N/A"`.
    pub correlation_id: String,
    /// Caller fields, omitted when empty.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl From<&LogEvent> for StructuredRecord {
    fn from(event: &LogEvent) -> Self {
        Self {
            timestamp: event.timestamp.fixed_offset(),
            level: event.level,
            logger: event.source.logger.clone(),
            function: event.source.function.clone(),
            line: event.source.line,
            message: event.message.clone(),
            correlation_id: event.correlation_str().to_string(),
            extra: event.fields.clone(),
        }
    }
}
