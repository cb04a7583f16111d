//! Request correlation context.
//!
//! Every inbound request gets a correlation identifier, either supplied by the
//! caller through `X-Correlation-ID` / `X-Request-ID` or freshly generated.
//! The identifier is bound to the request's logical task with a
//! `tokio::task_local!`, so any code awaited inside that task can read it back
//! with [`current`] without the id being passed around explicitly.
//!
//! Bindings do not cross `tokio::spawn`. Background work that should stay
//! correlated must be wrapped with [`propagate`] before it is spawned.
//!
//! # Example
//!
//! ```
//! use shared::correlation::{self, CorrelationId};
//!
//! # tokio_test::block_on(async {
//! assert!(correlation::current().is_none());
//!
//! let id = CorrelationId::new("trace-A");
//! let seen = correlation::bind(id, async {
//!     tokio::task::yield_now().await;
//!     correlation::current()
//! })
//! .await;
//!
//! assert_eq!(seen.unwrap().as_str(), "trace-A");
//! assert_eq!(correlation::current_or_absent(), "N/A");
//! # });
//! ```

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use uuid::Uuid;

/// Primary correlation header name.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Legacy alias accepted on input and echoed on output.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Value recorded when a log event is emitted outside any request.
pub const ABSENT_CORRELATION_ID: &str = "N/A";

tokio::task_local! {
    static CORRELATION_ID: CorrelationId;
}

/// Opaque token tying log events and a response to one originating request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wraps an existing identifier verbatim.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random (UUID v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Picks the caller-supplied correlation id or generates a new one.
///
/// `X-Correlation-ID` takes precedence over `X-Request-ID`. A supplied value is
/// trusted as-is: there is no format check and no collision check against
/// other in-flight requests. Values that are empty or not valid visible ASCII
/// are treated as absent, since they could not be echoed back as a header.
#[must_use]
pub fn resolve_or_create(headers: &HeaderMap) -> CorrelationId {
    [CORRELATION_ID_HEADER, REQUEST_ID_HEADER]
        .iter()
        .find_map(|name| {
            headers
                .get(*name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
        })
        .map_or_else(CorrelationId::generate, CorrelationId::new)
}

/// Runs `future` with `id` bound as the ambient correlation id.
///
/// The binding lasts for the whole future, across every suspension point,
/// and is only visible from inside it.
pub async fn bind<F>(id: CorrelationId, future: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(id, future).await
}

/// Synchronous counterpart of [`bind`].
pub fn bind_sync<F, R>(id: CorrelationId, f: F) -> R
where
    F: FnOnce() -> R,
{
    CORRELATION_ID.sync_scope(id, f)
}

/// Returns the correlation id bound to the current task, if any.
#[must_use]
pub fn current() -> Option<CorrelationId> {
    CORRELATION_ID.try_with(Clone::clone).ok()
}

/// Returns the bound correlation id, or [`ABSENT_CORRELATION_ID`].
#[must_use]
pub fn current_or_absent() -> String {
    current().map_or_else(|| ABSENT_CORRELATION_ID.to_string(), |id| id.0)
}

/// Carries the caller's correlation id into a future that will run on
/// another task.
///
/// ```
/// use shared::correlation::{self, CorrelationId};
///
/// # tokio_test::block_on(async {
/// let handle = correlation::bind(CorrelationId::new("job-7"), async {
///     tokio::spawn(correlation::propagate(async { correlation::current() }))
/// })
/// .await;
///
/// let seen = handle.await.unwrap();
/// assert_eq!(seen.unwrap().as_str(), "job-7");
/// # });
/// ```
pub fn propagate<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let captured = current();
    async move {
        match captured {
            Some(id) => bind(id, future).await,
            None => future.await,
        }
    }
}
