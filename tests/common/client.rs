//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with helpers for the gateway's endpoints and the
//! different credential schemes. When routes or request formats change,
//! update only this file.

use super::constants::*;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

const NAMESPACE: &str = "/wp-mcp/v1";

enum Credential {
    None,
    ApiKey(String),
    Bearer(String),
    Basic(String),
}

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    credential: Credential,
}

impl TestClient {
    fn build(base_url: String, credential: Credential) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");
        Self {
            client,
            base_url,
            credential,
        }
    }

    /// Creates a new unauthenticated client.
    pub fn new(base_url: String) -> Self {
        Self::build(base_url, Credential::None)
    }

    /// Client authenticating with `X-API-Key: base64(login:secret)`.
    pub fn with_api_key(base_url: String, login: &str, secret: &str) -> Self {
        let key = BASE64.encode(format!("{}:{}", login, secret));
        Self::build(base_url, Credential::ApiKey(key))
    }

    /// Client authenticating with `Authorization: Bearer <token>`.
    pub fn with_bearer(base_url: String, token: &str) -> Self {
        Self::build(base_url, Credential::Bearer(token.to_string()))
    }

    /// Client authenticating with HTTP Basic credentials.
    pub fn with_basic(base_url: String, login: &str, secret: &str) -> Self {
        let encoded = BASE64.encode(format!("{}:{}", login, secret));
        Self::build(base_url, Credential::Basic(encoded))
    }

    /// The most common client: the editor user via API key.
    pub fn editor(base_url: String) -> Self {
        Self::with_api_key(base_url, EDITOR_USER, EDITOR_SECRET)
    }

    fn apply_credential(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Credential::None => request,
            Credential::ApiKey(key) => request.header("X-API-Key", key),
            Credential::Bearer(token) => {
                request.header("Authorization", format!("Bearer {}", token))
            }
            Credential::Basic(encoded) => {
                request.header("Authorization", format!("Basic {}", encoded))
            }
        }
    }

    /// POST a raw JSON-RPC body to the canonical endpoint.
    pub async fn rpc_raw(&self, body: String) -> Response {
        self.apply_credential(
            self.client
                .post(format!("{}{}/mcp", self.base_url, NAMESPACE))
                .header("Content-Type", "application/json"),
        )
        .body(body)
        .send()
        .await
        .expect("rpc request failed")
    }

    /// POST a JSON-RPC call with the given method and params.
    pub async fn rpc(&self, method: &str, params: Value) -> Response {
        self.rpc_raw(
            json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}).to_string(),
        )
        .await
    }

    /// Like `rpc`, returning the parsed response body.
    pub async fn call(&self, method: &str, params: Value) -> Value {
        self.rpc(method, params)
            .await
            .json()
            .await
            .expect("response was not JSON")
    }

    /// POST to the legacy /rpc endpoint.
    pub async fn rpc_legacy(&self, method: &str, params: Value) -> Response {
        self.apply_credential(
            self.client
                .post(format!("{}{}/rpc", self.base_url, NAMESPACE))
                .header("Content-Type", "application/json"),
        )
        .json(&json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}))
        .send()
        .await
        .expect("rpc request failed")
    }

    /// GET the unauthenticated tools manifest.
    pub async fn get_tools(&self) -> Response {
        self.client
            .get(format!("{}{}/tools", self.base_url, NAMESPACE))
            .send()
            .await
            .expect("manifest request failed")
    }

    /// OPTIONS preflight against the canonical endpoint.
    pub async fn preflight(&self, origin: &str) -> Response {
        self.client
            .request(
                reqwest::Method::OPTIONS,
                format!("{}{}/mcp", self.base_url, NAMESPACE),
            )
            .header("Origin", origin)
            .send()
            .await
            .expect("preflight request failed")
    }
}

/// Extract the text of the first content block of a tools/call result.
pub fn result_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("result has no text content block")
}
