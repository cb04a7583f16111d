//! Integration tests for the structured log output of requests.
//!
//! Every test runs on the current-thread runtime so the thread-local
//! [`LogCapture`] subscriber sees events from all request tasks.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use shared::correlation;
use shared::logging::Severity;
use std::collections::BTreeSet;
use std::time::Duration;

use super::common::{request, send, test_app, LogCapture};

const REQUIRED_KEYS: [&str; 7] = [
    "timestamp",
    "level",
    "logger",
    "function",
    "line",
    "message",
    "correlation_id",
];

#[derive(Deserialize)]
struct SlowParams {
    #[serde(default)]
    delay_ms: u64,
}

#[tracing::instrument(skip_all)]
async fn slow_handler(Query(params): Query<SlowParams>) -> &'static str {
    tracing::info!(stage = "before", "Slow work");
    tokio::time::sleep(Duration::from_millis(params.delay_ms)).await;
    tracing::info!(stage = "after", "Slow work");

    let background = tokio::spawn(correlation::propagate(async {
        tracing::info!("Background work");
    }));
    let _ = background.await;

    "done"
}

#[tracing::instrument(skip_all)]
async fn failing_handler() -> StatusCode {
    tracing::info!("About to fail");
    StatusCode::INTERNAL_SERVER_ERROR
}

fn slow_app() -> Router {
    api::with_correlation(
        Router::new()
            .route("/slow", get(slow_handler))
            .route("/fail", get(failing_handler)),
    )
}

#[tokio::test]
async fn test_records_carry_id_across_await_points() {
    let capture = LogCapture::start();

    let (_, headers, _) = send(
        slow_app(),
        request("GET", "/slow?delay_ms=5", None, &[("X-Correlation-ID", "trace-A")]),
    )
    .await;
    assert_eq!(headers["x-correlation-id"], "trace-A");

    let slow = capture.with_message("Slow work");
    assert_eq!(slow.len(), 2);
    for record in &slow {
        assert_eq!(record.correlation_id, "trace-A");
        assert_eq!(record.function, "slow_handler");
    }
    assert_eq!(slow[1].extra["stage"], "after");

    let background = capture.with_message("Background work");
    assert_eq!(background.len(), 1);
    assert_eq!(background[0].correlation_id, "trace-A");
}

#[tokio::test]
async fn test_concurrent_requests_do_not_mix_ids() {
    let capture = LogCapture::start();
    let app = slow_app();

    // The traced request sleeps longer, so the other one starts and finishes
    // while it is suspended.
    let (traced, generated) = tokio::join!(
        send(
            app.clone(),
            request("GET", "/slow?delay_ms=30", None, &[("X-Correlation-ID", "trace-A")]),
        ),
        send(app, request("GET", "/slow?delay_ms=1", None, &[])),
    );

    let traced_id = traced.1["x-correlation-id"].to_str().unwrap().to_string();
    let generated_id = generated.1["x-correlation-id"].to_str().unwrap().to_string();
    assert_eq!(traced_id, "trace-A");
    assert_ne!(generated_id, traced_id);
    assert!(uuid::Uuid::parse_str(&generated_id).is_ok());

    let records = capture.records();
    let ids: BTreeSet<&str> = records.iter().map(|r| r.correlation_id.as_str()).collect();
    assert_eq!(ids, BTreeSet::from(["trace-A", generated_id.as_str()]));

    for id in [&traced_id, &generated_id] {
        let messages: Vec<&str> = records
            .iter()
            .filter(|r| &r.correlation_id == id)
            .map(|r| r.message.as_str())
            .collect();
        assert_eq!(
            messages,
            [
                "Incoming request",
                "Slow work",
                "Slow work",
                "Background work",
                "Response sent"
            ]
        );
    }
}

#[tokio::test]
async fn test_records_outside_requests_are_not_correlated() {
    let capture = LogCapture::start();

    send(
        slow_app(),
        request("GET", "/slow", None, &[("X-Correlation-ID", "stale-id")]),
    )
    .await;
    tracing::info!("Outside any request");

    let outside = capture.with_message("Outside any request");
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].correlation_id, "N/A");
}

#[tokio::test]
async fn test_every_line_has_exactly_the_record_keys() {
    let capture = LogCapture::start();
    let (app, _state) = test_app();

    send(app.clone(), request("GET", "/api/health", None, &[])).await;
    send(app, request("GET", "/api/users/9", None, &[])).await;
    tracing::info!("Plain message");

    let lines = capture.raw_lines();
    assert!(!lines.is_empty());

    for line in &lines {
        let object = line.as_object().unwrap();
        let keys: BTreeSet<&str> = object.keys().map(String::as_str).collect();

        for key in REQUIRED_KEYS {
            assert!(keys.contains(key), "missing {key} in {line}");
        }
        let unexpected: Vec<&&str> = keys
            .iter()
            .filter(|key| !REQUIRED_KEYS.contains(key) && **key != "extra")
            .collect();
        assert!(unexpected.is_empty(), "unexpected keys {unexpected:?} in {line}");

        assert!(object["line"].is_u64());
        assert!(object["correlation_id"].is_string());
    }

    let plain = lines
        .iter()
        .find(|line| line["message"] == "Plain message")
        .unwrap();
    assert!(plain.get("extra").is_none());
}

#[tokio::test]
async fn test_request_lifecycle_records() {
    let capture = LogCapture::start();
    let (app, _state) = test_app();

    send(
        app,
        request("GET", "/api/users/7?verbose=1", None, &[("X-Correlation-ID", "life-1")]),
    )
    .await;

    let incoming = capture.with_message("Incoming request");
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].correlation_id, "life-1");
    assert_eq!(incoming[0].extra["method"], "GET");
    assert_eq!(incoming[0].extra["path"], "/api/users/7");
    assert_eq!(incoming[0].extra["query_params"], "verbose=1");

    let not_found = capture.with_message("User not found");
    assert_eq!(not_found.len(), 1);
    assert_eq!(not_found[0].level, Severity::Warning);
    assert_eq!(not_found[0].function, "get_user");
    assert_eq!(not_found[0].correlation_id, "life-1");

    let sent = capture.with_message("Response sent");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].extra["status_code"], 404);
    assert!(sent[0].extra["process_time_ms"].is_string());
}

#[tokio::test]
async fn test_server_error_records_all_carry_request_id() {
    let capture = LogCapture::start();

    let (status, headers, _) = send(
        slow_app(),
        request("GET", "/fail", None, &[("X-Correlation-ID", "boom-1")]),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers["x-correlation-id"], "boom-1");

    let records = capture.records();
    assert!(records
        .iter()
        .any(|r| r.message == "Request processing error" && r.level == Severity::Error));
    for record in &records {
        assert_eq!(record.correlation_id, "boom-1", "uncorrelated: {record:?}");
    }

    let errors = records.iter().filter(|r| r.level == Severity::Error).count();
    assert!(errors >= 2, "tower-http failure event missing: {records:?}");
}

#[tokio::test]
async fn test_cors_preflight_is_logged_with_its_id() {
    let capture = LogCapture::start();
    let (app, _state) = test_app();

    send(
        app,
        request(
            "OPTIONS",
            "/api/users",
            None,
            &[
                ("Origin", "http://localhost:3000"),
                ("Access-Control-Request-Method", "POST"),
                ("X-Correlation-ID", "pre-1"),
            ],
        ),
    )
    .await;

    let incoming = capture.with_message("Incoming request");
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].correlation_id, "pre-1");
    assert_eq!(incoming[0].extra["method"], "OPTIONS");
}
