//! Root endpoint.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Welcome response.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    /// Greeting including the application name.
    pub message: String,
    /// Service version.
    pub version: &'static str,
    /// Path of the API documentation.
    pub docs: &'static str,
    /// Path of the OpenAPI document.
    pub openapi: &'static str,
}

/// Creates the root route.
pub fn root_routes(state: AppState) -> Router {
    Router::new().route("/", get(root)).with_state(state)
}

#[tracing::instrument(skip_all)]
async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    tracing::info!("Root endpoint accessed");

    Json(RootResponse {
        message: format!("Welcome to {}", state.app_name()),
        version: env!("CARGO_PKG_VERSION"),
        docs: "/docs",
        openapi: "/openapi.json",
    })
}
