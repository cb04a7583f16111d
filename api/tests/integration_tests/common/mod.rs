//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup, HTTP request helpers and a structured log capture.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::logging::{
    FanoutLayer, LogFanout, RotationPolicy, Severity, StructuredFileSink, StructuredRecord,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

/// Creates a test router with a fresh in-memory store.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::with_in_memory_store();
    let router = create_router(state.clone());
    (router, state)
}

/// Sends `request` and returns status, headers and the JSON body.
///
/// Non-JSON bodies come back as `Value::Null`.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, headers, json)
}

/// Builds a request with an optional JSON body and extra headers.
pub fn request(method: &str, uri: &str, body: Option<&Value>, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to make a POST request with JSON body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, _, json) = send(app, request("POST", uri, Some(&body), &[])).await;
    (status, json)
}

/// Helper to make a PUT request with JSON body.
pub async fn put_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, _, json) = send(app, request("PUT", uri, Some(&body), &[])).await;
    (status, json)
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, json) = send(app, request("GET", uri, None, &[])).await;
    (status, json)
}

/// Helper to make a DELETE request.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, json) = send(app, request("DELETE", uri, None, &[])).await;
    (status, json)
}

/// Structured log lines written to a temporary directory.
///
/// The capture installs a thread-local subscriber, so it only sees events
/// from tasks running on the current thread; use it with the default
/// current-thread `#[tokio::test]` runtime.
pub struct LogCapture {
    _dir: TempDir,
    path: PathBuf,
    _guard: DefaultGuard,
}

impl LogCapture {
    /// Starts capturing `INFO` and above into `structured.json`.
    pub fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("structured.json");

        let sink = StructuredFileSink::new(&path, Severity::Info, RotationPolicy::new(100, 10, true));
        let fanout = Arc::new(LogFanout::new(vec![Box::new(sink)]));
        let subscriber = tracing_subscriber::registry().with(FanoutLayer::new(fanout));
        let guard = tracing::subscriber::set_default(subscriber);

        Self {
            _dir: dir,
            path,
            _guard: guard,
        }
    }

    /// Raw JSON lines written so far.
    pub fn raw_lines(&self) -> Vec<Value> {
        std::fs::read_to_string(&self.path)
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Parsed records written so far.
    pub fn records(&self) -> Vec<StructuredRecord> {
        self.raw_lines()
            .into_iter()
            .map(|line| serde_json::from_value(line).unwrap())
            .collect()
    }

    /// Records with the given message.
    pub fn with_message(&self, message: &str) -> Vec<StructuredRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.message == message)
            .collect()
    }
}
