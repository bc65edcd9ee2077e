use super::http_layers::{log_requests, security_gate};
use super::state::GatewayState;
use crate::auth::AuthResolver;
use crate::config::GatewayConfig;
use crate::content::ContentStore;
use crate::mcp::tools::register_all_tools;
use crate::mcp::{McpGateway, ToolRegistry};
use crate::security::{CorsPolicy, IpAllowlist, RateLimiter};
use crate::user::UserStore;
use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// URL namespace all gateway endpoints live under.
pub const NAMESPACE: &str = "/wp-mcp/v1";

pub fn make_app(
    config: GatewayConfig,
    store: Arc<dyn ContentStore>,
    users: Arc<dyn UserStore>,
) -> Result<Router> {
    let registry = Arc::new(ToolRegistry::new(config.required_capability));
    register_all_tools(&registry);

    let resolver = AuthResolver::new(
        users,
        config.required_capability,
        config.bearer_fallback_headers.clone(),
    );
    let gateway = Arc::new(McpGateway::new(registry, resolver, store));

    let state = GatewayState {
        gateway,
        cors: Arc::new(CorsPolicy::new(config.cors_allowed_origins.clone())),
        ip_allowlist: Arc::new(IpAllowlist::parse(&config.ip_allowlist)?),
        rate_limiter: Arc::new(RateLimiter::new()),
        config,
        start_time: Instant::now(),
    };

    let mcp_routes = Router::new()
        .route("/mcp", post(rpc_handler).options(preflight_handler))
        .route("/rpc", post(rpc_handler).options(preflight_handler))
        .route("/tools", get(tools_manifest_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_gate,
        ))
        .with_state(state.clone());

    Ok(Router::new()
        .route("/", get(home_handler))
        .with_state(state.clone())
        .nest(NAMESPACE, mcp_routes)
        .layer(middleware::from_fn_with_state(state, log_requests)))
}

pub async fn run_server(
    config: GatewayConfig,
    store: Arc<dyn ContentStore>,
    users: Arc<dyn UserStore>,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store, users)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Ready to serve at port {}!", port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ORIGIN).and_then(|v| v.to_str().ok())
}

async fn rpc_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (status, rpc_response) = state.gateway.handle(&headers, &body).await;
    let mut metadata = state
        .gateway
        .response_headers(&headers, rpc_response.is_error());
    state.cors.apply(&mut metadata, origin(&headers));

    let mut response = (status, Json(rpc_response)).into_response();
    response.headers_mut().extend(metadata);
    response
}

async fn preflight_handler(State(state): State<GatewayState>, headers: HeaderMap) -> Response {
    let mut cors_headers = HeaderMap::new();
    state.cors.apply(&mut cors_headers, origin(&headers));
    let mut response = StatusCode::OK.into_response();
    response.headers_mut().extend(cors_headers);
    response
}

/// Unauthenticated manifest of the enabled tools.
async fn tools_manifest_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Response {
    let manifest = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.gateway.registry().manifest(),
    });
    let mut cors_headers = HeaderMap::new();
    state.cors.apply(&mut cors_headers, origin(&headers));
    let mut response = (StatusCode::OK, Json(manifest)).into_response();
    response.headers_mut().extend(cors_headers);
    response
}

#[derive(Serialize)]
struct ServerStats {
    name: &'static str,
    version: &'static str,
    uptime: String,
}

async fn home_handler(State(state): State<GatewayState>) -> Json<ServerStats> {
    let secs = state.start_time.elapsed().as_secs();
    Json(ServerStats {
        name: crate::mcp::protocol::SERVER_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime: format!(
            "{}d {:02}:{:02}:{:02}",
            secs / 86400,
            (secs % 86400) / 3600,
            (secs % 3600) / 60,
            secs % 60
        ),
    })
}
