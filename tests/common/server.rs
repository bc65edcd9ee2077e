//! Test server lifecycle management
//!
//! Each test gets an isolated server on a random port with its own
//! in-memory content and user stores.

use super::constants::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wp_mcp_gateway::config::GatewayConfig;
use wp_mcp_gateway::content::{InMemoryContentStore, SiteInfo};
use wp_mcp_gateway::security::RateLimitSettings;
use wp_mcp_gateway::server::{make_app, RequestsLoggingLevel};
use wp_mcp_gateway::user::{Capability, InMemoryUserStore};

/// Test server instance.
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a test server with a permissive default configuration.
    pub async fn spawn() -> Self {
        let config = GatewayConfig {
            logging_level: RequestsLoggingLevel::None,
            // High enough that ordinary tests never trip it
            rate_limit: RateLimitSettings {
                max_requests: 10_000,
                window_secs: 60,
            },
            ..GatewayConfig::default()
        };
        Self::spawn_with(config).await
    }

    /// Spawns a test server with an explicit configuration, for security
    /// gate tests.
    pub async fn spawn_with(config: GatewayConfig) -> Self {
        let store = Arc::new(InMemoryContentStore::with_sample_data(SiteInfo::default()));

        let mut users = InMemoryUserStore::new();
        users.add_user(EDITOR_USER, vec![Capability::Read, Capability::EditPosts]);
        users
            .add_application_password(EDITOR_USER, "tests", EDITOR_SECRET)
            .expect("Failed to add editor credential");
        users.add_user(VIEWER_USER, vec![Capability::Read]);
        users
            .add_application_password(VIEWER_USER, "tests", VIEWER_SECRET)
            .expect("Failed to add viewer credential");

        let app = make_app(config, store, Arc::new(users)).expect("Failed to build app");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Waits for the server to become ready by polling the home route.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
