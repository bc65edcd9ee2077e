pub mod context;
pub mod handler;
pub mod protocol;
pub mod proxy;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod tools;

pub use context::ToolContext;
pub use handler::McpGateway;
pub use registry::{OperationKind, ToolBuilder, ToolRegistry};
pub use schema::{ParamKind, ParamSpec};
