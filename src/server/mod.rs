mod http_layers;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;

pub use http_layers::RequestsLoggingLevel;
pub use server::{make_app, run_server, NAMESPACE};
pub use state::GatewayState;
