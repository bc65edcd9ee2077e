use super::store::{Collection, ContentError, ContentStore, ListFilter};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }

    /// Mutating verbs carry their arguments as a JSON body, GET carries
    /// them as query parameters.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Verb::Get)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A REST-shaped request under the versioned content root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub verb: Verb,
    pub path: String,
    pub query: Vec<(String, Value)>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    fn no_route(verb: Verb, path: &str) -> Self {
        Self {
            status: 404,
            message: format!("no route for {} {}", verb, path),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// Versioned root all content routes live under.
pub const API_ROOT: &str = "/wp/v2";

/// Maps REST-shaped requests onto [`ContentStore`] verbs, in process.
#[derive(Clone)]
pub struct ApiDispatcher {
    store: Arc<dyn ContentStore>,
}

impl ApiDispatcher {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn dispatch(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        debug!("dispatching {} {}", request.verb, request.path);
        let relative = request
            .path
            .strip_prefix(API_ROOT)
            .ok_or_else(|| ApiError::no_route(request.verb, &request.path))?;
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [collection] => {
                let collection = Collection::from_segment(collection)
                    .ok_or_else(|| ApiError::no_route(request.verb, &request.path))?;
                match request.verb {
                    Verb::Get => {
                        let filter = list_filter(&request.query);
                        Ok(Value::Array(self.store.list(collection, &filter)?))
                    }
                    Verb::Post => {
                        let body = request.body.clone().unwrap_or(Value::Null);
                        Ok(self.store.create(collection, &body)?)
                    }
                    _ => Err(ApiError::no_route(request.verb, &request.path)),
                }
            }
            [collection, id] => {
                let collection = Collection::from_segment(collection)
                    .ok_or_else(|| ApiError::no_route(request.verb, &request.path))?;
                let id: u64 = id.parse().map_err(|_| ApiError {
                    status: 400,
                    message: format!("invalid id: {}", id),
                })?;
                match request.verb {
                    Verb::Get => Ok(self.store.get(collection, id)?),
                    Verb::Put | Verb::Patch => {
                        let body = request.body.clone().unwrap_or(Value::Null);
                        Ok(self.store.update(collection, id, &body)?)
                    }
                    Verb::Delete => Ok(self.store.delete(collection, id)?),
                    Verb::Post => Err(ApiError::no_route(request.verb, &request.path)),
                }
            }
            _ => Err(ApiError::no_route(request.verb, &request.path)),
        }
    }
}

fn list_filter(query: &[(String, Value)]) -> ListFilter {
    let mut filter = ListFilter::new();
    for (key, value) in query {
        match key.as_str() {
            "search" => filter.search = value.as_str().map(|s| s.to_string()),
            "category" => filter.category = value.as_str().map(|s| s.to_string()),
            "page" => {
                if let Some(page) = number_param(value) {
                    filter.page = page;
                }
            }
            "per_page" => {
                if let Some(per_page) = number_param(value) {
                    filter.per_page = per_page;
                }
            }
            _ => {}
        }
    }
    filter
}

// Tool arguments may arrive as JSON numbers or as strings.
fn number_param(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
