//! Integration tests for correlation id resolution and response headers.

use axum::http::StatusCode;
use serde_json::json;
use std::collections::HashSet;

use super::common::{request, send, test_app};

#[tokio::test]
async fn test_supplied_correlation_id_is_echoed() {
    let (app, _state) = test_app();

    let (status, headers, _) = send(
        app,
        request("GET", "/api/health", None, &[("X-Correlation-ID", "trace-A")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-correlation-id"], "trace-A");
    assert_eq!(headers["x-request-id"], "trace-A");
}

#[tokio::test]
async fn test_request_id_header_is_accepted() {
    let (app, _state) = test_app();

    let (_, headers, _) = send(
        app,
        request("GET", "/", None, &[("X-Request-ID", "legacy-client-1")]),
    )
    .await;

    assert_eq!(headers["x-correlation-id"], "legacy-client-1");
    assert_eq!(headers["x-request-id"], "legacy-client-1");
}

#[tokio::test]
async fn test_correlation_header_wins_over_request_id() {
    let (app, _state) = test_app();

    let (_, headers, _) = send(
        app,
        request(
            "GET",
            "/api/health",
            None,
            &[("X-Request-ID", "second"), ("X-Correlation-ID", "first")],
        ),
    )
    .await;

    assert_eq!(headers["x-correlation-id"], "first");
    assert_eq!(headers["x-request-id"], "first");
}

#[tokio::test]
async fn test_empty_header_is_replaced_by_generated_id() {
    let (app, _state) = test_app();

    let (_, headers, _) = send(
        app,
        request("GET", "/api/health", None, &[("X-Correlation-ID", "")]),
    )
    .await;

    let id = headers["x-correlation-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_generated_ids_are_uuids_and_distinct() {
    let (app, _state) = test_app();

    let (a, b, c) = tokio::join!(
        send(app.clone(), request("GET", "/api/health", None, &[])),
        send(app.clone(), request("GET", "/api/users", None, &[])),
        send(app, request("GET", "/", None, &[])),
    );

    let ids: HashSet<String> = [a.1, b.1, c.1]
        .iter()
        .map(|headers| {
            let id = headers["x-correlation-id"].to_str().unwrap().to_string();
            assert_eq!(headers["x-request-id"], id.as_str());
            assert_eq!(uuid::Uuid::parse_str(&id).unwrap().get_version_num(), 4);
            id
        })
        .collect();

    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_error_responses_carry_correlation_headers() {
    let (app, _state) = test_app();

    let (status, headers, body) = send(
        app.clone(),
        request("GET", "/api/users/404", None, &[("X-Correlation-ID", "missing-user")]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers["x-correlation-id"], "missing-user");
    assert_eq!(body["request_id"], "missing-user");

    let (status, headers, body) = send(
        app,
        request(
            "POST",
            "/api/users",
            Some(&json!({"name": "", "email": "e@example.com"})),
            &[("X-Correlation-ID", "bad-payload")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(headers["x-request-id"], "bad-payload");
    assert_eq!(body["request_id"], "bad-payload");
}

#[tokio::test]
async fn test_cors_preflight_carries_correlation_headers() {
    let (app, _state) = test_app();

    let (status, headers, _) = send(
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

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("access-control-allow-origin"));
    assert_eq!(headers["x-correlation-id"], "pre-1");
    assert_eq!(headers["x-request-id"], "pre-1");
}
