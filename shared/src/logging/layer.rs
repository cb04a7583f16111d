//! `tracing` integration.
//!
//! [`FanoutLayer`] turns every `tracing` event into a [`LogEvent`] and hands
//! it to a [`LogFanout`]. Application code keeps using the ordinary
//! `tracing::info!` / `warn!` / `error!` macros; the correlation id is picked
//! up from the ambient request context at the moment the event fires.

use super::event::{LogEvent, SourceLocation, UNKNOWN_FUNCTION};
use super::fanout::LogFanout;
use super::level::Severity;
use crate::correlation::CorrelationId;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Field that overrides the event severity, e.g. `severity = "CRITICAL"`.
pub const SEVERITY_FIELD: &str = "severity";

/// Field that overrides the ambient correlation id for one event.
pub const CORRELATION_ID_FIELD: &str = "correlation_id";

const REQUEST_ID_FIELD: &str = "request_id";
const MESSAGE_FIELD: &str = "message";

/// Emits a `CRITICAL` event through `tracing`.
///
/// `tracing` tops out at `ERROR`, so this is an `ERROR` event tagged with a
/// `severity` field that [`FanoutLayer`] recognizes.
///
/// ```
/// shared::critical!(component = "store", "Out of file descriptors");
/// ```
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        $crate::tracing::error!(severity = "CRITICAL", $($arg)+)
    };
}

/// A `tracing_subscriber` layer feeding a [`LogFanout`].
#[derive(Debug, Clone)]
pub struct FanoutLayer {
    fanout: Arc<LogFanout>,
}

impl FanoutLayer {
    /// Creates a layer dispatching to `fanout`.
    #[must_use]
    pub fn new(fanout: Arc<LogFanout>) -> Self {
        Self { fanout }
    }
}

impl<S> Layer<S> for FanoutLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let function = ctx
            .event_scope(event)
            .and_then(|mut scope| scope.next())
            .map_or_else(|| UNKNOWN_FUNCTION.to_string(), |span| span.name().to_string());

        let level = visitor
            .severity
            .unwrap_or_else(|| Severity::from(*metadata.level()));

        let source = SourceLocation::new(
            metadata.module_path().unwrap_or_else(|| metadata.target()),
            function,
            metadata.line().unwrap_or(0),
        );

        let mut log_event = LogEvent::capture(level, visitor.message, visitor.fields, source);
        if let Some(id) = visitor.correlation_id {
            log_event = log_event.with_correlation_id(Some(id));
        }

        self.fanout.dispatch(&log_event);
    }
}

/// Collects event fields into JSON values.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
    severity: Option<Severity>,
    correlation_id: Option<CorrelationId>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        match field.name() {
            MESSAGE_FIELD => {
                self.message = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
            }
            SEVERITY_FIELD => {
                if let Some(severity) = value.as_str().and_then(|s| s.parse().ok()) {
                    self.severity = Some(severity);
                }
            }
            CORRELATION_ID_FIELD => {
                if let Some(id) = value.as_str().filter(|s| !s.is_empty()) {
                    self.correlation_id = Some(CorrelationId::new(id));
                }
            }
            REQUEST_ID_FIELD => {}
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form.
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.insert(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}
