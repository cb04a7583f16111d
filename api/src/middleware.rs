//! Request correlation and access logging middleware.
//!
//! Every request is assigned a correlation id (taken from `X-Correlation-ID`
//! or `X-Request-ID`, or generated), which is bound to the request's task for
//! the rest of the handler stack and echoed back in both headers on the
//! response.

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use shared::correlation::{self, CorrelationId, CORRELATION_ID_HEADER, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::time::Instant;

/// Correlates, logs and times one request.
///
/// The resolved [`CorrelationId`] is also inserted into the request
/// extensions, so handlers can extract it with `Extension<CorrelationId>`.
#[tracing::instrument(name = "log_requests", skip_all)]
pub async fn log_requests(mut request: Request, next: Next) -> Response {
    let correlation_id = correlation::resolve_or_create(request.headers());
    request.extensions_mut().insert(correlation_id.clone());

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query_params = request.uri().query().unwrap_or_default().to_string();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    correlation::bind(correlation_id.clone(), async move {
        tracing::info!(
            method = %method,
            path = %path,
            query_params = %query_params,
            client = client.as_deref().unwrap_or("unknown"),
            "Incoming request"
        );

        let start = Instant::now();
        let mut response = next.run(request).await;
        let process_time_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);
        let status_code = response.status().as_u16();

        if response.status().is_server_error() {
            tracing::error!(
                method = %method,
                path = %path,
                status_code,
                process_time_ms = %process_time_ms,
                "Request processing error"
            );
        } else {
            tracing::info!(
                method = %method,
                path = %path,
                status_code,
                process_time_ms = %process_time_ms,
                "Response sent"
            );
        }

        set_correlation_headers(&mut response, &correlation_id);
        response
    })
    .await
}

fn set_correlation_headers(response: &mut Response, correlation_id: &CorrelationId) {
    match HeaderValue::from_str(correlation_id.as_str()) {
        Ok(value) => {
            let headers = response.headers_mut();
            headers.insert(CORRELATION_ID_HEADER, value.clone());
            headers.insert(REQUEST_ID_HEADER, value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Correlation id is not a valid header value");
        }
    }
}
