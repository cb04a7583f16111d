//! Loglink API Server
//!
//! This crate provides the HTTP server of Loglink: a small user-management
//! REST API whose every log line carries the correlation id of the request
//! that produced it.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - Correlation middleware binding an id to each request's task
//! - User CRUD routes backed by an in-memory store
//! - Root and health endpoints
//!
//! Logging itself lives in [`shared::logging`]; the binary installs it with
//! [`shared::logging::init_logging`] before calling [`run_server`].
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
pub mod middleware;
pub mod routes;
mod state;

pub use config::Config;
pub use state::AppState;

use anyhow::Result;
use axum::http::StatusCode;
use axum::{Json, Router};
use routes::ErrorResponse;
use shared::correlation;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Runs the Loglink API server.
///
/// Configuration is read from environment variables. Logging must already be
/// installed; see [`shared::logging::init_logging`].
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Loglink API server with the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The configured host and port are not a valid socket address
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        app_name = %config.app_name,
        version = env!("CARGO_PKG_VERSION"),
        debug = config.debug,
        log_level = %config.logging.level,
        "Application starting up"
    );

    let state = AppState::new(
        std::sync::Arc::new(shared::storage::InMemoryUserStore::new()),
        config.app_name.as_str(),
    );
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!(
        app_name = %config.app_name,
        version = env!("CARGO_PKG_VERSION"),
        "Application shutting down"
    );
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(routes::root_routes(state.clone()))
        .merge(routes::health_routes())
        .merge(routes::users_routes(state))
        .fallback(not_found);

    with_correlation(router)
}

/// Wraps `router` in the request correlation middleware stack.
///
/// Every response of the returned router, including fallback and CORS
/// preflight responses, is produced inside a bound correlation context and
/// carries `X-Correlation-ID` and `X-Request-ID` headers.
pub fn with_correlation(router: Router) -> Router {
    // Outermost last: CORS preflights and `TraceLayer` failure events must
    // run inside the bound correlation context.
    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::log_requests))
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not_found".to_string(),
            detail: Some("Not Found".to_string()),
            request_id: correlation::current().map(|id| id.to_string()),
        }),
    )
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
