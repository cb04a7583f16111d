//! Integration tests for the health and root endpoints.
//!
//! Tests cover:
//! - Health check endpoint
//! - Root endpoint metadata
//! - JSON 404 for unknown routes

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["message"], "Welcome to Loglink");
    assert_eq!(response["docs"], "/docs");
    assert_eq!(response["openapi"], "/openapi.json");
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/v1/logs").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
    assert!(response["request_id"].is_string());
}
