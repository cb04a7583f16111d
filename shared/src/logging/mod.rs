//! Structured log fan-out.
//!
//! Log events are captured once and written to several independent sinks:
//!
//! | Sink         | Destination       | Minimum level | Format                     |
//! |--------------|-------------------|---------------|----------------------------|
//! | `console`    | stdout            | configured    | colorized, human-readable  |
//! | `general`    | `app.log`         | configured    | plain text                 |
//! | `errors`     | `errors.log`      | `ERROR`       | plain text                 |
//! | `structured` | `structured.json` | configured    | one JSON object per line   |
//!
//! A failing sink never affects the caller or the other sinks.

pub mod event;
pub mod fanout;
pub mod init;
pub mod layer;
pub mod level;
pub mod rotation;
pub mod sink;

pub use event::{LogEvent, SourceLocation, StructuredRecord};
pub use fanout::{DispatchReport, LogFanout, SinkDiagnostics, SinkOutcome};
pub use init::{build_fanout, init_logging};
pub use layer::FanoutLayer;
pub use level::{ParseSeverityError, Severity};
pub use rotation::{rotated_siblings, RotatingFile, RotationPolicy};
pub use sink::{ConsoleSink, Sink, SinkError, StructuredFileSink, TextFileSink};
