//! Log fan-out.
//!
//! [`LogFanout`] delivers each [`LogEvent`] to every registered sink whose
//! minimum level admits it. Sink failures are contained: they are recorded in
//! the returned [`DispatchReport`] and in per-sink [`SinkDiagnostics`], and
//! never reach the caller or stop delivery to the other sinks.

use super::event::{LogEvent, SourceLocation};
use super::level::Severity;
use super::sink::Sink;
use serde::Serialize;
use serde_json::{Map, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Result of offering one event to one sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// The sink wrote the event.
    Written,
    /// The event was below the sink's minimum level.
    Filtered,
    /// The sink failed; the message describes why.
    Failed(String),
}

/// Per-sink outcomes of a single dispatch, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    outcomes: Vec<(String, SinkOutcome)>,
}

impl DispatchReport {
    /// All outcomes, paired with the sink name.
    #[must_use]
    pub fn outcomes(&self) -> &[(String, SinkOutcome)] {
        &self.outcomes
    }

    /// Outcome for the sink named `name`.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&SinkOutcome> {
        self.outcomes
            .iter()
            .find(|(sink, _)| sink == name)
            .map(|(_, outcome)| outcome)
    }

    /// Number of sinks that wrote the event.
    #[must_use]
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, SinkOutcome::Written))
    }

    /// Number of sinks that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SinkOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&SinkOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Failure counters for one sink.
#[derive(Debug, Default)]
struct SinkHealth {
    written: AtomicU64,
    failures: AtomicU64,
    failing: AtomicBool,
    last_error: Mutex<Option<String>>,
}

/// Snapshot of one sink's delivery counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkDiagnostics {
    /// Sink name.
    pub name: String,
    /// Events written successfully.
    pub written: u64,
    /// Events the sink failed to write.
    pub failures: u64,
    /// Most recent failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

struct Registered {
    sink: Box<dyn Sink>,
    health: SinkHealth,
}

/// Delivers log events to a fixed set of sinks.
pub struct LogFanout {
    sinks: Vec<Registered>,
}

impl LogFanout {
    /// Creates a fan-out over `sinks`. Registration is fixed from here on.
    #[must_use]
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self {
            sinks: sinks
                .into_iter()
                .map(|sink| Registered {
                    sink,
                    health: SinkHealth::default(),
                })
                .collect(),
        }
    }

    /// Lowest minimum level over all sinks, or `None` without sinks.
    #[must_use]
    pub fn min_level(&self) -> Option<Severity> {
        self.sinks.iter().map(|r| r.sink.min_level()).min()
    }

    /// Names of the registered sinks, in order.
    #[must_use]
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|r| r.sink.name()).collect()
    }

    /// Captures an event at the call site and dispatches it.
    ///
    /// The correlation id is read from the ambient request context.
    #[track_caller]
    pub fn emit(
        &self,
        level: Severity,
        message: impl Into<String>,
        fields: Map<String, Value>,
    ) -> DispatchReport {
        let event = LogEvent::capture(level, message, fields, SourceLocation::caller());
        self.dispatch(&event)
    }

    /// Offers `event` to every sink.
    ///
    /// Never fails: a sink error (or panic) is recorded against that sink and
    /// delivery continues with the next one.
    pub fn dispatch(&self, event: &LogEvent) -> DispatchReport {
        let outcomes = self
            .sinks
            .iter()
            .map(|registered| {
                let name = registered.sink.name().to_string();
                if !registered.sink.accepts(event.level) {
                    return (name, SinkOutcome::Filtered);
                }

                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    registered.sink.write(event).map_err(|e| e.to_string())
                }))
                .unwrap_or_else(|_| Err("sink panicked".to_string()));

                let outcome = match result {
                    Ok(()) => {
                        registered.health.record_success();
                        SinkOutcome::Written
                    }
                    Err(message) => {
                        registered.health.record_failure(&name, &message);
                        SinkOutcome::Failed(message)
                    }
                };
                (name, outcome)
            })
            .collect();

        DispatchReport { outcomes }
    }

    /// Delivery counters for every sink.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<SinkDiagnostics> {
        self.sinks
            .iter()
            .map(|r| SinkDiagnostics {
                name: r.sink.name().to_string(),
                written: r.health.written.load(Ordering::Relaxed),
                failures: r.health.failures.load(Ordering::Relaxed),
                last_error: r.health.last_error.lock().ok().and_then(|e| e.clone()),
            })
            .collect()
    }
}

impl SinkHealth {
    fn record_success(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
        self.failing.store(false, Ordering::Relaxed);
    }

    fn record_failure(&self, sink: &str, message: &str) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(message.to_string());
        }
        // Once per failure streak.
        if !self.failing.swap(true, Ordering::Relaxed) {
            eprintln!("log sink '{sink}' failed: {message}");
        }
    }
}

impl std::fmt::Debug for LogFanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogFanout")
            .field("sinks", &self.sink_names())
            .finish()
    }
}
