use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "wp-mcp-gateway";

/// Method names understood by the gateway.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const PING: &str = "ping";
    pub const INITIALIZED: &str = "initialized";
    pub const NOTIFICATIONS_INITIALIZED: &str = "notifications/initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
    pub const LEGACY_GET_POSTS: &str = "getPosts";
    pub const LEGACY_CREATE_POST: &str = "createPost";
}

/// Parsed dispatch target. Unknown names are kept verbatim so the handler
/// can fall back to a registry lookup before reporting `MethodNotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpMethod {
    Initialize,
    Ping,
    Initialized,
    ToolsList,
    ToolsCall,
    ResourcesList,
    ResourcesRead,
    LegacyGetPosts,
    LegacyCreatePost,
    Other(String),
}

impl McpMethod {
    pub fn parse(name: &str) -> Self {
        match name {
            methods::INITIALIZE => McpMethod::Initialize,
            methods::PING => McpMethod::Ping,
            methods::INITIALIZED | methods::NOTIFICATIONS_INITIALIZED => McpMethod::Initialized,
            methods::TOOLS_LIST => McpMethod::ToolsList,
            methods::TOOLS_CALL => McpMethod::ToolsCall,
            methods::RESOURCES_LIST => McpMethod::ResourcesList,
            methods::RESOURCES_READ => McpMethod::ResourcesRead,
            methods::LEGACY_GET_POSTS => McpMethod::LegacyGetPosts,
            methods::LEGACY_CREATE_POST => McpMethod::LegacyCreatePost,
            other => McpMethod::Other(other.to_string()),
        }
    }

    /// Initialization-phase methods are served without credentials.
    pub fn bypasses_auth(&self) -> bool {
        matches!(
            self,
            McpMethod::Initialize | McpMethod::Ping | McpMethod::Initialized
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct McpResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpErrorResponse>,
    pub id: Option<RequestId>,
}

impl McpResponse {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<RequestId>, error: &McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(McpErrorResponse {
                code: error.code(),
                message: error.message(),
                data: error.data(),
            }),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct McpErrorResponse {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Everything that can go wrong while serving a request. Protocol-level
/// failures carry their JSON-RPC standard codes; domain failures share a
/// single generic code and are distinguished by message.
#[derive(Debug, Clone, PartialEq)]
pub enum McpError {
    MalformedBody(String),
    MethodNotFound(String),
    InvalidParams(String),
    MissingParameter(String),
    Internal(String),
    ToolNotFound(String),
    ToolDisabled(String),
    Unauthenticated,
    Forbidden(String),
    ResourceNotFound(String),
    BackingApi { status: u16, message: String },
}

pub const GENERIC_ERROR_CODE: i64 = -1;

impl McpError {
    pub fn code(&self) -> i64 {
        match self {
            McpError::MalformedBody(_) => -32700,
            McpError::MethodNotFound(_) => -32601,
            McpError::InvalidParams(_) | McpError::MissingParameter(_) => -32602,
            McpError::Internal(_) => -32603,
            McpError::ToolNotFound(_)
            | McpError::ToolDisabled(_)
            | McpError::Unauthenticated
            | McpError::Forbidden(_)
            | McpError::ResourceNotFound(_)
            | McpError::BackingApi { .. } => GENERIC_ERROR_CODE,
        }
    }

    pub fn message(&self) -> String {
        match self {
            McpError::MalformedBody(detail) => format!("Parse error: {}", detail),
            McpError::MethodNotFound(method) => format!("Method not found: {}", method),
            McpError::InvalidParams(detail) => format!("Invalid params: {}", detail),
            McpError::MissingParameter(name) => {
                format!("Missing required parameter: {}", name)
            }
            McpError::Internal(detail) => format!("Internal error: {}", detail),
            McpError::ToolNotFound(name) => format!("Tool not found: {}", name),
            McpError::ToolDisabled(name) => format!("Tool is disabled: {}", name),
            McpError::Unauthenticated => "Authentication required".to_string(),
            McpError::Forbidden(capability) => {
                format!("Missing required capability: {}", capability)
            }
            McpError::ResourceNotFound(uri) => format!("Resource not found: {}", uri),
            McpError::BackingApi { status, message } => {
                format!("Backing API error ({}): {}", status, message)
            }
        }
    }

    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::BackingApi { status, .. } => {
                Some(serde_json::json!({ "status": status }))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for McpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: &'static str,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    pub tools: CapabilityFlags,
    pub resources: CapabilityFlags,
    pub prompts: CapabilityFlags,
    pub logging: EmptyCapability,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: CapabilityFlags::default(),
            resources: CapabilityFlags::default(),
            prompts: CapabilityFlags::default(),
            logging: EmptyCapability {},
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityFlags {
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmptyCapability {}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCallResult {
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolsCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// Pretty-print a JSON value into a single text block.
    pub fn json(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourcesListResult {
    pub resources: Vec<ResourceDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesReadParams {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourcesReadResult {
    pub contents: Vec<ResourceContent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: &'static str,
    pub text: String,
}
