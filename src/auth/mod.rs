use crate::user::{token_digest, Capability, Principal, UserRecord, UserStore};
use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;
use tracing::debug;

pub const API_KEY_HEADER: &str = "x-api-key";
const AUTHORIZATION_HEADER: &str = "authorization";
const BEARER_PREFIX: &str = "Bearer ";
const BASIC_PREFIX: &str = "Basic ";

/// Default alternate bearer header names, for clients behind proxies that
/// strip `Authorization`.
pub const DEFAULT_BEARER_FALLBACK_HEADERS: &[&str] = &["x-authorization", "x-wp-authorization"];

/// Resolves request credentials to a [`Principal`].
///
/// Strategies run in fixed precedence: `X-API-Key`, then `Authorization:
/// Bearer` (with configured fallback header names), then HTTP Basic. The
/// first strategy that yields a principal holding the required capability
/// wins; a principal lacking the capability counts as a failed attempt.
pub struct AuthResolver {
    users: Arc<dyn UserStore>,
    required_capability: Capability,
    bearer_fallback_headers: Vec<String>,
}

impl AuthResolver {
    pub fn new(
        users: Arc<dyn UserStore>,
        required_capability: Capability,
        bearer_fallback_headers: Vec<String>,
    ) -> Self {
        Self {
            users,
            required_capability,
            bearer_fallback_headers,
        }
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Option<Principal> {
        if let Some(value) = header_str(headers, API_KEY_HEADER) {
            if let Some(principal) = self.try_credential(value) {
                return Some(principal);
            }
        }
        if let Some(token) = self.bearer_token(headers) {
            if let Some(principal) = self.try_credential(token) {
                return Some(principal);
            }
        }
        if let Some((login, password)) = basic_credentials(headers) {
            if let Some(principal) = self.validate_password(&login, &password) {
                return Some(principal);
            }
        }
        None
    }

    fn bearer_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        if let Some(value) = header_str(headers, AUTHORIZATION_HEADER) {
            return value.strip_prefix(BEARER_PREFIX);
        }
        for name in &self.bearer_fallback_headers {
            if let Some(value) = header_str(headers, name) {
                return Some(value.strip_prefix(BEARER_PREFIX).unwrap_or(value));
            }
        }
        None
    }

    /// A candidate that base64-decodes to `login:password` is validated as
    /// an application password; anything else is looked up as an opaque
    /// token by digest.
    fn try_credential(&self, raw: &str) -> Option<Principal> {
        if let Ok(decoded) = BASE64.decode(raw.trim()) {
            if let Ok(text) = String::from_utf8(decoded) {
                if let Some((login, password)) = text.split_once(':') {
                    return self.validate_password(login, password);
                }
            }
        }
        self.validate_token(raw)
    }

    fn validate_password(&self, login: &str, password: &str) -> Option<Principal> {
        let user = self.users.find_user(login)?;
        let verified = user.passwords.iter().any(|stored| stored.verify(password))
            || self.users.validate_builtin(login, password);
        if !verified {
            debug!("password validation failed for {}", login);
            return None;
        }
        self.admit(&user)
    }

    // No token -> user index; this scans every stored credential. Fine for
    // the user counts a single site sees, revisit if that changes.
    fn validate_token(&self, raw: &str) -> Option<Principal> {
        let digest = token_digest(raw);
        for user in self.users.all_users() {
            if user.passwords.iter().any(|p| p.matches_digest(&digest)) {
                return self.admit(&user);
            }
        }
        None
    }

    fn admit(&self, user: &UserRecord) -> Option<Principal> {
        if !user.capabilities.contains(&self.required_capability) {
            debug!(
                "user {} lacks required capability {}",
                user.login, self.required_capability
            );
            return None;
        }
        Some(user.principal())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = header_str(headers, AUTHORIZATION_HEADER)?;
    let encoded = value.strip_prefix(BASIC_PREFIX)?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (login, password) = text.split_once(':')?;
    Some((login.to_string(), password.to_string()))
}
