use crate::config::GatewayConfig;
use crate::mcp::McpGateway;
use crate::security::{CorsPolicy, IpAllowlist, RateLimiter};
use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

/// Shared state handed to every route and middleware. Cheap to clone, all
/// heavy parts live behind `Arc`s.
#[derive(Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub gateway: Arc<McpGateway>,
    pub cors: Arc<CorsPolicy>,
    pub ip_allowlist: Arc<IpAllowlist>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl FromRef<GatewayState> for GatewayConfig {
    fn from_ref(state: &GatewayState) -> Self {
        state.config.clone()
    }
}

impl FromRef<GatewayState> for Arc<McpGateway> {
    fn from_ref(state: &GatewayState) -> Self {
        state.gateway.clone()
    }
}

impl FromRef<GatewayState> for Arc<CorsPolicy> {
    fn from_ref(state: &GatewayState) -> Self {
        state.cors.clone()
    }
}

impl FromRef<GatewayState> for Arc<IpAllowlist> {
    fn from_ref(state: &GatewayState) -> Self {
        state.ip_allowlist.clone()
    }
}

impl FromRef<GatewayState> for Arc<RateLimiter> {
    fn from_ref(state: &GatewayState) -> Self {
        state.rate_limiter.clone()
    }
}
