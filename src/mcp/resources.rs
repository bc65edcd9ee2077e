use super::protocol::{McpError, ResourceContent, ResourceDefinition};
use crate::content::{Collection, ContentStore, ListFilter};

/// Posts returned per resource read.
pub const RESOURCE_PAGE_SIZE: usize = 10;

const URI_PREFIX: &str = "wp://posts/";
const MIME_TEXT: &str = "text/plain";

/// One resource per category, addressed as `wp://posts/{slug}`.
pub fn list_resources(store: &dyn ContentStore) -> Vec<ResourceDefinition> {
    store
        .categories()
        .into_iter()
        .map(|category| ResourceDefinition {
            uri: format!("{}{}", URI_PREFIX, category.slug),
            name: category.name,
            description: if category.description.is_empty() {
                "Posts in this category".to_string()
            } else {
                category.description
            },
            mime_type: MIME_TEXT,
        })
        .collect()
}

pub fn read_resource(
    store: &dyn ContentStore,
    uri: &str,
) -> Result<Vec<ResourceContent>, McpError> {
    let slug = uri
        .strip_prefix(URI_PREFIX)
        .filter(|slug| !slug.is_empty() && !slug.contains('/'))
        .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;
    if !store.categories().iter().any(|c| c.slug == slug) {
        return Err(McpError::ResourceNotFound(uri.to_string()));
    }

    let mut filter = ListFilter::with_category(slug);
    filter.per_page = RESOURCE_PAGE_SIZE;
    let posts = store
        .list(Collection::Posts, &filter)
        .map_err(|e| McpError::Internal(e.to_string()))?;

    Ok(posts
        .iter()
        .map(|post| {
            let title = post["title"].as_str().unwrap_or("");
            let content = post["content"].as_str().unwrap_or("");
            ResourceContent {
                uri: uri.to_string(),
                mime_type: MIME_TEXT,
                text: format!("{}\n\n{}", title, content),
            }
        })
        .collect())
}
