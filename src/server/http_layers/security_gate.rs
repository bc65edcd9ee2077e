//! Transport-level request gate: origin, client address and rate checks.
//!
//! Runs before authentication. Rejections are plain HTTP errors, never
//! JSON-RPC envelopes.

use super::super::state::GatewayState;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use tracing::warn;

pub async fn security_gate(
    State(state): State<GatewayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Preflight requests carry no payload to protect.
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    if let Some(origin) = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
    {
        if !state.cors.is_allowed(origin) {
            warn!("rejected request from origin {}", origin);
            return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
        }
    }

    let ip = addr.ip();
    if !state.ip_allowlist.is_allowed(ip) {
        warn!("rejected request from address {}", ip);
        return (StatusCode::FORBIDDEN, "address not allowed").into_response();
    }

    if let Err(retry_after) = state.rate_limiter.check(&ip.to_string(), &state.config.rate_limit) {
        state.rate_limiter.cleanup_stale(&state.config.rate_limit);
        let mut response =
            (StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded").into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(request).await
}
