use super::models::{Category, Post, PostStatus, SiteInfo};
use super::store::{Collection, ContentError, ContentStore, ListFilter};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory [`ContentStore`] used by the default binary and the tests.
pub struct InMemoryContentStore {
    site: SiteInfo,
    categories: Vec<Category>,
    posts: RwLock<PostsTable>,
}

struct PostsTable {
    rows: BTreeMap<u64, Post>,
    next_id: u64,
}

impl InMemoryContentStore {
    pub fn new(site: SiteInfo, categories: Vec<Category>) -> Self {
        Self {
            site,
            categories,
            posts: RwLock::new(PostsTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn with_sample_data(site: SiteInfo) -> Self {
        let categories = vec![
            Category {
                id: 1,
                slug: "uncategorized".to_string(),
                name: "Uncategorized".to_string(),
                description: String::new(),
            },
            Category {
                id: 2,
                slug: "news".to_string(),
                name: "News".to_string(),
                description: "Site announcements".to_string(),
            },
            Category {
                id: 3,
                slug: "tutorials".to_string(),
                name: "Tutorials".to_string(),
                description: "Step by step guides".to_string(),
            },
        ];
        let store = Self::new(site, categories);
        store.seed_post("Hello world", "Welcome to the demo site.", "news");
        store.seed_post("Getting started", "First steps with the gateway.", "tutorials");
        store.seed_post("Second tutorial", "More advanced material.", "tutorials");
        store
    }

    fn seed_post(&self, title: &str, content: &str, category: &str) {
        let mut table = self.posts.write().unwrap();
        let id = table.next_id;
        table.next_id += 1;
        table.rows.insert(
            id,
            Post {
                id,
                title: title.to_string(),
                content: content.to_string(),
                excerpt: String::new(),
                status: PostStatus::Publish,
                category: category.to_string(),
                author: 1,
            },
        );
    }

    fn matches(post: &Post, filter: &ListFilter) -> bool {
        if let Some(category) = &filter.category {
            if &post.category != category {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

fn post_value(post: &Post) -> Value {
    json!({
        "id": post.id,
        "title": post.title,
        "content": post.content,
        "excerpt": post.excerpt,
        "status": post.status,
        "category": post.category,
        "author": post.author,
    })
}

fn category_value(category: &Category) -> Value {
    json!({
        "id": category.id,
        "slug": category.slug,
        "name": category.name,
        "description": category.description,
    })
}

fn string_field(data: &Value, field: &str) -> Option<String> {
    data.get(field)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

impl ContentStore for InMemoryContentStore {
    fn site_info(&self) -> SiteInfo {
        self.site.clone()
    }

    fn categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    fn list(&self, collection: Collection, filter: &ListFilter) -> Result<Vec<Value>, ContentError> {
        match collection {
            Collection::Categories => Ok(self.categories.iter().map(category_value).collect()),
            Collection::Posts => {
                let per_page = filter.per_page.clamp(1, ListFilter::MAX_PER_PAGE);
                let page = filter.page.max(1);
                let table = self.posts.read().unwrap();
                Ok(table
                    .rows
                    .values()
                    .filter(|post| Self::matches(post, filter))
                    .skip((page - 1) * per_page)
                    .take(per_page)
                    .map(post_value)
                    .collect())
            }
        }
    }

    fn get(&self, collection: Collection, id: u64) -> Result<Value, ContentError> {
        match collection {
            Collection::Categories => self
                .categories
                .iter()
                .find(|c| c.id == id)
                .map(category_value)
                .ok_or(ContentError::NotFound { collection, id }),
            Collection::Posts => {
                let table = self.posts.read().unwrap();
                table
                    .rows
                    .get(&id)
                    .map(post_value)
                    .ok_or(ContentError::NotFound { collection, id })
            }
        }
    }

    fn create(&self, collection: Collection, data: &Value) -> Result<Value, ContentError> {
        if collection != Collection::Posts {
            return Err(ContentError::Unsupported(collection));
        }
        let title = string_field(data, "title")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ContentError::Invalid("missing field: title".to_string()))?;
        let status = data
            .get("status")
            .cloned()
            .map(serde_json::from_value::<PostStatus>)
            .transpose()
            .map_err(|_| ContentError::Invalid("unknown status".to_string()))?
            .unwrap_or_default();

        let mut table = self.posts.write().unwrap();
        let id = table.next_id;
        table.next_id += 1;
        let post = Post {
            id,
            title,
            content: string_field(data, "content").unwrap_or_default(),
            excerpt: string_field(data, "excerpt").unwrap_or_default(),
            status,
            category: string_field(data, "category")
                .unwrap_or_else(|| "uncategorized".to_string()),
            author: data.get("author").and_then(Value::as_u64).unwrap_or(0),
        };
        let value = post_value(&post);
        table.rows.insert(id, post);
        Ok(value)
    }

    fn update(&self, collection: Collection, id: u64, data: &Value) -> Result<Value, ContentError> {
        if collection != Collection::Posts {
            return Err(ContentError::Unsupported(collection));
        }
        let mut table = self.posts.write().unwrap();
        let post = table
            .rows
            .get_mut(&id)
            .ok_or(ContentError::NotFound { collection, id })?;
        if let Some(title) = string_field(data, "title") {
            post.title = title;
        }
        if let Some(content) = string_field(data, "content") {
            post.content = content;
        }
        if let Some(excerpt) = string_field(data, "excerpt") {
            post.excerpt = excerpt;
        }
        if let Some(category) = string_field(data, "category") {
            post.category = category;
        }
        if let Some(status) = data.get("status") {
            post.status = serde_json::from_value(status.clone())
                .map_err(|_| ContentError::Invalid("unknown status".to_string()))?;
        }
        Ok(post_value(post))
    }

    fn delete(&self, collection: Collection, id: u64) -> Result<Value, ContentError> {
        if collection != Collection::Posts {
            return Err(ContentError::Unsupported(collection));
        }
        let mut table = self.posts.write().unwrap();
        table
            .rows
            .remove(&id)
            .map(|post| post_value(&post))
            .ok_or(ContentError::NotFound { collection, id })
    }
}
