mod dispatcher;
mod memory_store;
mod models;
mod store;

pub use dispatcher::{ApiDispatcher, ApiError, ApiRequest, Verb, API_ROOT};
pub use memory_store::InMemoryContentStore;
pub use models::{Category, Post, PostStatus, SiteInfo};
pub use store::{Collection, ContentError, ContentStore, ListFilter};
