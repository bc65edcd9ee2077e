mod posts;
mod site;

use super::registry::ToolRegistry;
use tracing::info;

/// Register the full tool set. Called once at startup.
pub fn register_all_tools(registry: &ToolRegistry) {
    site::register_tools(registry);
    posts::register_tools(registry);
    info!("tool registry ready with {} tools", registry.tool_count());
}
