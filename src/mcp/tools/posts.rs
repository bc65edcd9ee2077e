use crate::content::{ListFilter, Verb};
use crate::mcp::registry::{OperationKind, ToolBuilder, ToolRegistry};
use crate::mcp::schema::ParamSpec;
use serde_json::json;

fn status_choices() -> Vec<serde_json::Value> {
    vec![json!("publish"), json!("draft"), json!("pending"), json!("private")]
}

pub fn register_tools(registry: &ToolRegistry) {
    registry.register(
        ToolBuilder::new("wp_get_posts")
            .description("List posts, optionally filtered by search term or category")
            .kind(OperationKind::Read)
            .param("search", ParamSpec::string("Full-text search term"))
            .param("category", ParamSpec::string("Category slug to filter by"))
            .param(
                "page",
                ParamSpec::integer("Result page, starting at 1")
                    .minimum(1)
                    .default_value(json!(1)),
            )
            .param(
                "per_page",
                ParamSpec::integer("Posts per page")
                    .minimum(1)
                    .maximum(ListFilter::MAX_PER_PAGE as i64)
                    .default_value(json!(ListFilter::DEFAULT_PER_PAGE)),
            )
            .alias(Verb::Get, "/posts"),
    );

    registry.register(
        ToolBuilder::new("wp_get_post")
            .description("Fetch a single post by id")
            .kind(OperationKind::Read)
            .param("id", ParamSpec::integer("Post id").required())
            .alias(Verb::Get, "/posts/{id}"),
    );

    registry.register(
        ToolBuilder::new("wp_create_post")
            .description("Create a new post")
            .kind(OperationKind::Create)
            .param("title", ParamSpec::string("Post title").required())
            .param("content", ParamSpec::string("Post body"))
            .param("excerpt", ParamSpec::string("Short summary"))
            .param(
                "status",
                ParamSpec::string("Publication status")
                    .choices(status_choices())
                    .default_value(json!("draft")),
            )
            .param("category", ParamSpec::string("Category slug"))
            .alias(Verb::Post, "/posts"),
    );

    registry.register(
        ToolBuilder::new("wp_update_post")
            .description("Update fields of an existing post")
            .kind(OperationKind::Update)
            .param("id", ParamSpec::integer("Post id").required())
            .param("title", ParamSpec::string("New title"))
            .param("content", ParamSpec::string("New body"))
            .param("excerpt", ParamSpec::string("New summary"))
            .param(
                "status",
                ParamSpec::string("New publication status").choices(status_choices()),
            )
            .param("category", ParamSpec::string("New category slug"))
            .alias(Verb::Put, "/posts/{id}"),
    );

    registry.register(
        ToolBuilder::new("wp_delete_post")
            .description("Delete a post by id")
            .kind(OperationKind::Delete)
            .param("id", ParamSpec::integer("Post id").required())
            .alias(Verb::Delete, "/posts/{id}"),
    );

    registry.register(
        ToolBuilder::new("wp_get_categories")
            .description("List all categories")
            .kind(OperationKind::Read)
            .alias(Verb::Get, "/categories"),
    );
}
