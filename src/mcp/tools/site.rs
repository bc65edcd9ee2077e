use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{OperationKind, ToolBuilder, ToolRegistry, ToolResult};
use serde_json::{json, Value};

pub fn register_tools(registry: &ToolRegistry) {
    registry.register(
        ToolBuilder::new("wp_get_site_info")
            .description("Get the site's name, description, URL, version and language")
            .kind(OperationKind::Read)
            .callback(site_info_handler),
    );

    registry.register(
        ToolBuilder::new("wp_whoami")
            .description("Show the identity and capabilities this request runs as")
            .kind(OperationKind::Read)
            .callback(whoami_handler),
    );
}

async fn site_info_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let info = ctx.store.site_info();
    let value = json!({
        "name": info.name,
        "description": info.description,
        "url": info.url,
        "version": info.version,
        "language": info.language,
        "gateway_version": ctx.server_version,
    });
    Ok(ToolsCallResult::json(&value))
}

async fn whoami_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let principal = ctx.principal.as_ref().ok_or(McpError::Unauthenticated)?;
    let capabilities: Vec<&str> = principal
        .capabilities
        .iter()
        .map(|c| c.as_str())
        .collect();
    Ok(ToolsCallResult::json(&json!({
        "id": principal.id,
        "login": principal.login,
        "capabilities": capabilities,
    })))
}
