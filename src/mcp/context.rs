use crate::content::{ApiDispatcher, ContentStore};
use crate::user::Principal;
use std::sync::Arc;
use std::time::Instant;

/// Everything a tool handler gets to work with.
#[derive(Clone)]
pub struct ToolContext {
    /// Resolved identity, `None` only for handshake-phase calls.
    pub principal: Option<Principal>,
    pub store: Arc<dyn ContentStore>,
    pub dispatcher: ApiDispatcher,
    pub server_version: String,
    pub start_time: Instant,
}

impl ToolContext {
    pub fn new(store: Arc<dyn ContentStore>, principal: Option<Principal>) -> Self {
        Self {
            principal,
            dispatcher: ApiDispatcher::new(store.clone()),
            store,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}
