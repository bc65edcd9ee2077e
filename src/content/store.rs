use super::models::{Category, SiteInfo};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("{collection} {id} not found")]
    NotFound { collection: Collection, id: u64 },

    #[error("invalid {0}")]
    Invalid(String),

    #[error("unsupported operation on {0}")]
    Unsupported(Collection),
}

impl ContentError {
    /// HTTP-shaped status, consumed by the dispatcher when reporting
    /// backing-API failures.
    pub fn status(&self) -> u16 {
        match self {
            ContentError::NotFound { .. } => 404,
            ContentError::Invalid(_) => 400,
            ContentError::Unsupported(_) => 405,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Posts,
    Categories,
}

impl Collection {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "posts" => Some(Collection::Posts),
            "categories" => Some(Collection::Categories),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Categories => "categories",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: usize,
    pub per_page: usize,
}

impl ListFilter {
    pub const DEFAULT_PER_PAGE: usize = 10;
    pub const MAX_PER_PAGE: usize = 100;

    pub fn new() -> Self {
        Self {
            search: None,
            category: None,
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }

    pub fn with_category(slug: impl Into<String>) -> Self {
        let mut filter = Self::new();
        filter.category = Some(slug.into());
        filter
    }
}

/// Storage seam between the gateway and the host CMS. Items cross the
/// boundary as REST-shaped JSON values so adapters stay free to back them
/// with whatever the host actually stores.
pub trait ContentStore: Send + Sync {
    fn site_info(&self) -> SiteInfo;

    fn categories(&self) -> Vec<Category>;

    fn list(&self, collection: Collection, filter: &ListFilter) -> Result<Vec<Value>, ContentError>;

    fn get(&self, collection: Collection, id: u64) -> Result<Value, ContentError>;

    fn create(&self, collection: Collection, data: &Value) -> Result<Value, ContentError>;

    fn update(&self, collection: Collection, id: u64, data: &Value) -> Result<Value, ContentError>;

    fn delete(&self, collection: Collection, id: u64) -> Result<Value, ContentError>;
}
