mod requests_logging;
mod security_gate;

pub use requests_logging::{log_requests, RequestsLoggingLevel};
pub use security_gate::security_gate;
