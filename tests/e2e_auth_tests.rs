//! End-to-end tests for the credential resolution chain.

mod common;

use common::{
    result_text, TestClient, TestServer, EDITOR_SECRET, EDITOR_USER, VIEWER_SECRET, VIEWER_USER,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn whoami_login(client: &TestClient) -> Option<String> {
    let body = client
        .call("tools/call", json!({"name": "wp_whoami", "arguments": {}}))
        .await;
    if body.get("error").is_some() {
        return None;
    }
    let identity: Value = serde_json::from_str(result_text(&body)).unwrap();
    Some(identity["login"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn api_key_authenticates() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_api_key(server.base_url.clone(), EDITOR_USER, EDITOR_SECRET);
    assert_eq!(whoami_login(&client).await.as_deref(), Some(EDITOR_USER));
}

#[tokio::test]
async fn bearer_token_authenticates_with_the_raw_secret() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_bearer(server.base_url.clone(), EDITOR_SECRET);
    assert_eq!(whoami_login(&client).await.as_deref(), Some(EDITOR_USER));
}

#[tokio::test]
async fn bearer_token_accepts_encoded_credentials_too() {
    let server = TestServer::spawn().await;
    let token = BASE64.encode(format!("{}:{}", EDITOR_USER, EDITOR_SECRET));
    let client = TestClient::with_bearer(server.base_url.clone(), &token);
    assert_eq!(whoami_login(&client).await.as_deref(), Some(EDITOR_USER));
}

#[tokio::test]
async fn http_basic_authenticates() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_basic(server.base_url.clone(), EDITOR_USER, EDITOR_SECRET);
    assert_eq!(whoami_login(&client).await.as_deref(), Some(EDITOR_USER));
}

#[tokio::test]
async fn api_key_takes_precedence_over_bearer() {
    let server = TestServer::spawn().await;
    let api_key = BASE64.encode(format!("{}:{}", EDITOR_USER, EDITOR_SECRET));

    // Both credentials are individually valid; the API key must win. The
    // bearer belongs to the viewer, who cannot call wp_whoami anyway, so a
    // successful editor identity proves precedence.
    let response = TestClient::new(server.base_url.clone())
        .client
        .post(format!("{}/wp-mcp/v1/mcp", server.base_url))
        .header("Content-Type", "application/json")
        .header("X-API-Key", api_key)
        .header("Authorization", format!("Bearer {}", VIEWER_SECRET))
        .body(
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
                "name": "wp_whoami", "arguments": {}
            }})
            .to_string(),
        )
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let identity: Value = serde_json::from_str(result_text(&body)).unwrap();
    assert_eq!(identity["login"], EDITOR_USER);
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_api_key(server.base_url.clone(), EDITOR_USER, "wrong-secret");
    let body = client.call("tools/list", json!({})).await;
    assert_eq!(body["error"]["code"], -1);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Authentication required"));
}

#[tokio::test]
async fn missing_capability_reads_as_unauthenticated() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_api_key(server.base_url.clone(), VIEWER_USER, VIEWER_SECRET);
    let body = client.call("tools/list", json!({})).await;
    // The viewer's credentials are valid but lack edit_posts; the error is
    // indistinguishable from bad credentials.
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Authentication required"));
}

#[tokio::test]
async fn no_credentials_cannot_call_tools() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .rpc("tools/call", json!({"name": "wp_get_posts", "arguments": {}}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("result").is_none());
    assert_eq!(body["error"]["code"], -1);
}

#[tokio::test]
async fn handshake_is_open_but_tools_are_gated() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let initialized = client.call("initialize", json!({})).await;
    assert!(initialized.get("error").is_none());

    let listed = client.call("tools/list", json!({})).await;
    assert!(listed.get("error").is_some());
}
