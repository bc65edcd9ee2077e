//! JSON-RPC 2.0 (MCP) gateway over a WordPress-flavoured content store.
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod auth;
pub mod config;
pub mod content;
pub mod mcp;
pub mod security;
pub mod server;
pub mod user;

// Re-export commonly used types for convenience
pub use config::{CliConfig, FileConfig, GatewayConfig};
pub use content::{ContentStore, InMemoryContentStore};
pub use mcp::{McpGateway, ToolRegistry};
pub use server::{make_app, run_server, RequestsLoggingLevel};
pub use user::{Capability, InMemoryUserStore, UserStore};
