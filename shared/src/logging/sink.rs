//! Log sinks.
//!
//! A sink renders a [`LogEvent`] in its own format and writes it to its own
//! destination. Sinks share nothing with each other, and a failing sink only
//! ever reports the failure through its return value.

use super::event::{LogEvent, StructuredRecord};
use super::level::Severity;
use super::rotation::{RotatingFile, RotationPolicy};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors a sink can report for a single event.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The event could not be rendered.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Another writer panicked while holding the destination.
    #[error("Sink lock poisoned")]
    LockPoisoned,
}

/// A configured log destination.
pub trait Sink: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Lowest severity this sink accepts.
    fn min_level(&self) -> Severity;

    /// Renders and writes one event.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    fn write(&self, event: &LogEvent) -> Result<(), SinkError>;

    /// Whether this sink wants events at `level`.
    fn accepts(&self, level: Severity) -> bool {
        level >= self.min_level()
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";

const fn level_color(level: Severity) -> &'static str {
    match level {
        Severity::Debug => "\x1b[34m",
        Severity::Info => "\x1b[32m",
        Severity::Warning => "\x1b[33m",
        Severity::Error => "\x1b[31m",
        Severity::Critical => "\x1b[1;41m",
    }
}

/// Human-readable sink for a terminal.
///
/// ```text
/// INFO     | routes::users:create_user:42 - User created [3f2c...] user_id=1
/// ```
pub struct ConsoleSink {
    min_level: Severity,
    colorize: bool,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Console sink writing to standard output.
    #[must_use]
    pub fn stdout(min_level: Severity, colorize: bool) -> Self {
        Self::with_writer(min_level, colorize, Box::new(io::stdout()))
    }

    /// Console sink writing to an arbitrary writer.
    #[must_use]
    pub fn with_writer(min_level: Severity, colorize: bool, writer: Box<dyn Write + Send>) -> Self {
        Self {
            min_level,
            colorize,
            writer: Mutex::new(writer),
        }
    }

    fn render(&self, event: &LogEvent) -> String {
        let level = format!("{:<8}", event.level.as_str());
        let source = format!(
            "{}:{}:{}",
            event.source.logger, event.source.function, event.source.line
        );
        let mut line = if self.colorize {
            let color = level_color(event.level);
            format!(
                "{color}{BOLD}{level}{RESET} | {CYAN}{source}{RESET} - {color}{}{RESET} {DIM}[{}]{RESET}",
                event.message,
                event.correlation_str()
            )
        } else {
            format!(
                "{level} | {source} - {} [{}]",
                event.message,
                event.correlation_str()
            )
        };

        let pairs = event.fields_as_pairs();
        if !pairs.is_empty() {
            line.push(' ');
            line.push_str(&pairs);
        }
        line
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    fn write(&self, event: &LogEvent) -> Result<(), SinkError> {
        let mut line = self.render(event);
        line.push('\n');

        let mut writer = self.writer.lock().map_err(|_| SinkError::LockPoisoned)?;
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("min_level", &self.min_level)
            .field("colorize", &self.colorize)
            .finish_non_exhaustive()
    }
}

/// Plain-text sink backed by a rotating file.
///
/// ```text
/// 2026-10-16 12:00:00 | ERROR    | routes::users:get_user:88 - User not found | correlation_id=trace-A user_id=7
/// ```
#[derive(Debug)]
pub struct TextFileSink {
    name: String,
    min_level: Severity,
    file: RotatingFile,
}

impl TextFileSink {
    /// Creates a text sink writing to `path`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        min_level: Severity,
        policy: RotationPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            min_level,
            file: RotatingFile::new(path, policy),
        }
    }

    /// Path of the active file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn render(event: &LogEvent) -> String {
        let mut line = format!(
            "{} | {:<8} | {}:{}:{} - {} | correlation_id={}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.level.as_str(),
            event.source.logger,
            event.source.function,
            event.source.line,
            event.message,
            event.correlation_str()
        );
        let pairs = event.fields_as_pairs();
        if !pairs.is_empty() {
            line.push(' ');
            line.push_str(&pairs);
        }
        line
    }
}

impl Sink for TextFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    fn write(&self, event: &LogEvent) -> Result<(), SinkError> {
        self.file.write_line(&Self::render(event))?;
        Ok(())
    }
}

/// Newline-delimited JSON sink backed by a rotating file.
#[derive(Debug)]
pub struct StructuredFileSink {
    min_level: Severity,
    file: RotatingFile,
}

impl StructuredFileSink {
    /// Creates a JSON-lines sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, min_level: Severity, policy: RotationPolicy) -> Self {
        Self {
            min_level,
            file: RotatingFile::new(path, policy),
        }
    }

    /// Path of the active file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Sink for StructuredFileSink {
    fn name(&self) -> &str {
        "structured"
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    fn write(&self, event: &LogEvent) -> Result<(), SinkError> {
        // Rendered fully before touching the file, so a bad value never
        // leaves half a line behind.
        let line = serde_json::to_string(&StructuredRecord::from(event))?;
        self.file.write_line(&line)?;
        Ok(())
    }
}
