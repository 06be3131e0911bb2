//! Request logging middleware

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

/// Log one line per request with status and latency
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), %duration_ms, "Request failed");
    } else if status.is_client_error()
        && status != StatusCode::NOT_FOUND
        && status != StatusCode::UNAUTHORIZED
    {
        info!(%method, %path, status = status.as_u16(), %duration_ms, "Request rejected");
    } else {
        info!(%method, %path, status = status.as_u16(), %duration_ms, "Request completed");
    }

    response
}
