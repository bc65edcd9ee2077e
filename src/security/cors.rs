use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};

/// Origins admitted regardless of configuration, for local tooling.
const LOOPBACK_ORIGINS: &[&str] = &[
    "http://localhost",
    "https://localhost",
    "http://127.0.0.1",
    "https://127.0.0.1",
    "http://[::1]",
];

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Authorization, Content-Type, X-API-Key, X-MCP-Session-Id";

/// Origin allow-list with literal prefix matching, so a configured
/// `https://app.example.com` also admits `https://app.example.com:8443`.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed: Vec<String>,
}

impl CorsPolicy {
    pub fn new(configured: Vec<String>) -> Self {
        let mut allowed: Vec<String> =
            LOOPBACK_ORIGINS.iter().map(|s| s.to_string()).collect();
        allowed.extend(configured);
        Self { allowed }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.iter().any(|entry| origin.starts_with(entry))
    }

    /// Write CORS headers onto a response. Disallowed origins never get
    /// here, the security gate rejects them first.
    pub fn apply(&self, headers: &mut HeaderMap, origin: Option<&str>) {
        let allow_origin = match origin {
            Some(origin) => HeaderValue::from_str(origin)
                .unwrap_or_else(|_| HeaderValue::from_static("*")),
            None => HeaderValue::from_static("*"),
        };
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
    }
}
