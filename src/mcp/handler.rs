use super::context::ToolContext;
use super::protocol::{
    InitializeParams, InitializeResult, McpError, McpMethod, McpRequest, McpResponse,
    ResourcesListResult, ResourcesReadParams, ResourcesReadResult, ServerCapabilities,
    ServerInfo, ToolsCallParams, ToolsListResult, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use super::registry::ToolRegistry;
use super::resources;
use crate::auth::AuthResolver;
use crate::content::ContentStore;
use crate::user::Principal;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-mcp-session-id";
pub const TRANSPORT_HEADER: &str = "x-mcp-transport";
pub const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";
pub const SESSION_STATUS_HEADER: &str = "x-mcp-session-status";
pub const SERVER_HEADER: &str = "x-mcp-server";

const TRANSPORT: &str = "http";

/// The protocol engine: parses JSON-RPC requests, resolves credentials,
/// dispatches methods and shapes responses. One instance per server, all
/// shared state is interior.
pub struct McpGateway {
    registry: Arc<ToolRegistry>,
    resolver: AuthResolver,
    store: Arc<dyn ContentStore>,
    session_id: String,
    handshake_complete: AtomicBool,
    start_time: Instant,
}

impl McpGateway {
    pub fn new(
        registry: Arc<ToolRegistry>,
        resolver: AuthResolver,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            registry,
            resolver,
            store,
            session_id: Uuid::new_v4().to_string(),
            handshake_complete: AtomicBool::new(false),
            start_time: Instant::now(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn handshake_complete(&self) -> bool {
        self.handshake_complete.load(Ordering::Relaxed)
    }

    /// Serve one JSON-RPC request. Protocol-level failures still produce an
    /// HTTP 200 envelope; only an unparseable body is a 400.
    pub async fn handle(&self, headers: &HeaderMap, body: &[u8]) -> (StatusCode, McpResponse) {
        let request: McpRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                debug!("unparseable request body: {}", e);
                return (
                    StatusCode::BAD_REQUEST,
                    McpResponse::error(None, &McpError::MalformedBody(e.to_string())),
                );
            }
        };

        let method = McpMethod::parse(&request.method);
        let principal = if method.bypasses_auth() {
            None
        } else {
            match self.resolver.resolve(headers) {
                Some(principal) => Some(principal),
                None => {
                    return (
                        StatusCode::OK,
                        McpResponse::error(request.id, &McpError::Unauthenticated),
                    )
                }
            }
        };

        let id = request.id.clone();
        match self.dispatch(method, request.params, principal).await {
            Ok(result) => (StatusCode::OK, McpResponse::success(id, result)),
            Err(error) => {
                warn!("{} failed: {}", request.method, error);
                (StatusCode::OK, McpResponse::error(id, &error))
            }
        }
    }

    async fn dispatch(
        &self,
        method: McpMethod,
        params: Option<Value>,
        principal: Option<Principal>,
    ) -> Result<Value, McpError> {
        match method {
            McpMethod::Initialize => self.handle_initialize(params),
            McpMethod::Ping => Ok(json!({})),
            McpMethod::Initialized => {
                self.handshake_complete.store(true, Ordering::Relaxed);
                info!("client handshake complete");
                Ok(json!({}))
            }
            McpMethod::ToolsList => to_value(ToolsListResult {
                tools: self.registry.manifest(),
            }),
            McpMethod::ToolsCall => {
                let params: ToolsCallParams = parse_params(params)?;
                self.call_tool(&params.name, params.arguments, principal)
                    .await
            }
            McpMethod::ResourcesList => to_value(ResourcesListResult {
                resources: resources::list_resources(self.store.as_ref()),
            }),
            McpMethod::ResourcesRead => {
                let params: ResourcesReadParams = parse_params(params)?;
                to_value(ResourcesReadResult {
                    contents: resources::read_resource(self.store.as_ref(), &params.uri)?,
                })
            }
            McpMethod::LegacyGetPosts => {
                self.call_tool("wp_get_posts", params.unwrap_or(json!({})), principal)
                    .await
            }
            McpMethod::LegacyCreatePost => {
                self.call_tool("wp_create_post", params.unwrap_or(json!({})), principal)
                    .await
            }
            // Unknown method names that match a registered tool are treated
            // as an implicit tools/call.
            McpMethod::Other(name) => {
                if self.registry.resolve(&name).is_some() {
                    self.call_tool(&name, params.unwrap_or(json!({})), principal)
                        .await
                } else {
                    Err(McpError::MethodNotFound(name))
                }
            }
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = parse_params(params).unwrap_or_default();
        if let Some(version) = &params.protocol_version {
            if version != MCP_PROTOCOL_VERSION {
                warn!(
                    "client protocol version {} differs from {}",
                    version, MCP_PROTOCOL_VERSION
                );
            }
        }
        if let Some(client) = &params.client_info {
            info!(
                "initialize from {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }
        to_value(InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION,
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
        principal: Option<Principal>,
    ) -> Result<Value, McpError> {
        let mut ctx = ToolContext::new(self.store.clone(), principal);
        ctx.start_time = self.start_time;
        let result = self.registry.execute(name, arguments, ctx).await?;
        to_value(result)
    }

    /// Metadata headers attached to every response. A client-supplied
    /// session id is echoed back in place of ours.
    pub fn response_headers(&self, request_headers: &HeaderMap, is_error: bool) -> HeaderMap {
        let session_id = request_headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(&self.session_id);
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(session_id) {
            headers.insert(SESSION_HEADER, value);
        }
        headers.insert(TRANSPORT_HEADER, HeaderValue::from_static(TRANSPORT));
        headers.insert(
            PROTOCOL_VERSION_HEADER,
            HeaderValue::from_static(MCP_PROTOCOL_VERSION),
        );
        headers.insert(
            SESSION_STATUS_HEADER,
            HeaderValue::from_static(if is_error { "error" } else { "active" }),
        );
        let server = format!("{}/{}", SERVER_NAME, env!("CARGO_PKG_VERSION"));
        if let Ok(value) = HeaderValue::from_str(&server) {
            headers.insert(SERVER_HEADER, value);
        }
        headers
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    serde_json::from_value(params.unwrap_or(Value::Object(Map::new())))
        .map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DEFAULT_BEARER_FALLBACK_HEADERS;
    use crate::content::{InMemoryContentStore, SiteInfo};
    use crate::mcp::tools::register_all_tools;
    use crate::user::{Capability, InMemoryUserStore};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    const SECRET: &str = "editor-secret-value";

    fn gateway() -> McpGateway {
        let registry = Arc::new(ToolRegistry::new(Capability::EditPosts));
        register_all_tools(&registry);

        let mut users = InMemoryUserStore::new();
        users.add_user("editor", vec![Capability::Read, Capability::EditPosts]);
        users
            .add_application_password("editor", "cli", SECRET)
            .unwrap();
        let resolver = AuthResolver::new(
            Arc::new(users),
            Capability::EditPosts,
            DEFAULT_BEARER_FALLBACK_HEADERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        let store = Arc::new(InMemoryContentStore::with_sample_data(SiteInfo::default()));
        McpGateway::new(registry, resolver, store)
    }

    fn authed_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        let key = BASE64.encode(format!("editor:{}", SECRET));
        headers.insert("x-api-key", HeaderValue::from_str(&key).unwrap());
        headers
    }

    async fn call(gateway: &McpGateway, headers: &HeaderMap, body: Value) -> (StatusCode, Value) {
        let (status, response) = gateway
            .handle(headers, body.to_string().as_bytes())
            .await;
        (status, serde_json::to_value(&response).unwrap())
    }

    #[tokio::test]
    async fn initialize_works_without_credentials() {
        let gateway = gateway();
        let (status, response) = call(
            &gateway,
            &HeaderMap::new(),
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "clientInfo": {"name": "test-client", "version": "0.1"}
            }}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], SERVER_NAME);
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn initialized_marks_the_handshake() {
        let gateway = gateway();
        assert!(!gateway.handshake_complete());
        call(
            &gateway,
            &HeaderMap::new(),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await;
        assert!(gateway.handshake_complete());
    }

    #[tokio::test]
    async fn tools_list_requires_credentials() {
        let gateway = gateway();
        let (status, response) = call(
            &gateway,
            &HeaderMap::new(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.get("result").is_none());
        assert_eq!(response["error"]["code"], -1);
    }

    #[tokio::test]
    async fn tools_list_returns_the_manifest() {
        let gateway = gateway();
        let (_, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        )
        .await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert!(tools.iter().any(|t| t["name"] == "wp_get_posts"));
        for tool in tools {
            assert!(tool["inputSchema"]["properties"].is_object());
        }
    }

    #[tokio::test]
    async fn tools_call_runs_a_tool() {
        let gateway = gateway();
        let (_, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "wp_get_site_info", "arguments": {}
            }}),
        )
        .await;
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let info: Value = serde_json::from_str(text).unwrap();
        assert!(info["name"].is_string());
    }

    #[tokio::test]
    async fn unknown_tool_produces_an_error_envelope() {
        let gateway = gateway();
        let (status, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
                "name": "wp_launch_rockets", "arguments": {}
            }}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.get("result").is_none());
        assert!(!response["error"]["message"].as_str().unwrap().is_empty());
        assert_eq!(response["id"], 4);
    }

    #[tokio::test]
    async fn tool_names_work_as_implicit_methods() {
        let gateway = gateway();
        let (_, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 5, "method": "wp_get_post", "params": {"id": 1}}),
        )
        .await;
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let post: Value = serde_json::from_str(text).unwrap();
        assert_eq!(post["id"], 1);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let gateway = gateway();
        let (_, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 6, "method": "frobnicate"}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn legacy_get_posts_forwards_to_the_tool() {
        let gateway = gateway();
        let (_, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "getPosts", "params": {"category": "news"}}),
        )
        .await;
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let posts: Value = serde_json::from_str(text).unwrap();
        assert_eq!(posts.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn legacy_create_post_forwards_to_the_tool() {
        let gateway = gateway();
        let (_, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 8, "method": "createPost", "params": {"title": "Legacy"}}),
        )
        .await;
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let post: Value = serde_json::from_str(text).unwrap();
        assert_eq!(post["title"], "Legacy");
    }

    #[tokio::test]
    async fn resources_list_and_read() {
        let gateway = gateway();
        let (_, listed) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 9, "method": "resources/list"}),
        )
        .await;
        let resources = listed["result"]["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 3);

        let (_, read) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 10, "method": "resources/read", "params": {
                "uri": "wp://posts/news"
            }}),
        )
        .await;
        let contents = read["result"]["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["mimeType"], "text/plain");
    }

    #[tokio::test]
    async fn malformed_body_is_a_400() {
        let gateway = gateway();
        let (status, response) = gateway.handle(&HeaderMap::new(), b"{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn missing_tool_name_is_invalid_params() {
        let gateway = gateway();
        let (_, response) = call(
            &gateway,
            &authed_headers(),
            json!({"jsonrpc": "2.0", "id": 11, "method": "tools/call", "params": {}}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
    }

    #[test]
    fn response_headers_carry_session_metadata() {
        let gateway = gateway();
        let headers = gateway.response_headers(&HeaderMap::new(), false);
        assert_eq!(
            headers.get(SESSION_HEADER).unwrap().to_str().unwrap(),
            gateway.session_id()
        );
        assert_eq!(headers.get(TRANSPORT_HEADER).unwrap(), "http");
        assert_eq!(
            headers.get(PROTOCOL_VERSION_HEADER).unwrap(),
            MCP_PROTOCOL_VERSION
        );
        assert_eq!(headers.get(SESSION_STATUS_HEADER).unwrap(), "active");
    }

    #[test]
    fn client_session_id_overrides_the_generated_one() {
        let gateway = gateway();
        let mut request_headers = HeaderMap::new();
        request_headers.insert(SESSION_HEADER, HeaderValue::from_static("client-session"));
        let headers = gateway.response_headers(&request_headers, true);
        assert_eq!(headers.get(SESSION_HEADER).unwrap(), "client-session");
        assert_eq!(headers.get(SESSION_STATUS_HEADER).unwrap(), "error");
    }
}
