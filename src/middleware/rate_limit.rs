//! Rate limiting middleware

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;
use std::net::SocketAddr;

use crate::{
    constants::{rate_limits, API_BASE_PATH},
    error::AppError,
    state::AppState,
};

/// Rate limit middleware. Counting fails open when Redis is unavailable.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bucket = path_bucket(request.method().as_str(), request.uri().path());
    let (limit, window) = rate_limit(bucket);

    let key = format!("rate_limit:{}:{}", addr.ip(), bucket);
    let mut redis = state.redis();

    let count: i64 = match redis.incr(&key, 1).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "Rate limit counter unavailable");
            0
        }
    };

    if count == 1 {
        let _: Result<(), _> = redis.expire(&key, window).await;
    }

    if count > limit {
        tracing::debug!(bucket, count, limit, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(request).await)
}

/// Limit and window for a bucket
fn rate_limit(bucket: &str) -> (i64, i64) {
    match bucket {
        "auth" => (rate_limits::AUTH_MAX_REQUESTS, rate_limits::AUTH_WINDOW_SECS),
        "applications" => (
            rate_limits::APPLICATION_MAX_REQUESTS,
            rate_limits::APPLICATION_WINDOW_SECS,
        ),
        _ => (rate_limits::GENERAL_MAX_REQUESTS, rate_limits::GENERAL_WINDOW_SECS),
    }
}

/// Group endpoints that share a limit. Only writes that send SMS count
/// against the applications bucket.
fn path_bucket(method: &str, path: &str) -> &'static str {
    let path = path.strip_prefix(API_BASE_PATH).unwrap_or(path);

    if path.starts_with("/auth") {
        "auth"
    } else if method == "POST"
        && ((path.starts_with("/events/") && path.ends_with("/applications"))
            || path.ends_with("/verify")
            || path.ends_with("/resend"))
    {
        "applications"
    } else {
        "general"
    }
}
