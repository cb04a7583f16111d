//! Health check endpoint.
//!
//! Provides a simple health check endpoint for load balancers and monitoring systems.

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status (always "healthy" if reachable).
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Creates the health check routes.
pub fn health_routes() -> Router {
    Router::new().route("/api/health", get(health_check))
}

/// Health check handler.
///
/// Returns a simple JSON response indicating the service is healthy.
#[tracing::instrument(skip_all)]
async fn health_check() -> Json<HealthResponse> {
    tracing::info!(endpoint = "/health", "Health check performed");

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
