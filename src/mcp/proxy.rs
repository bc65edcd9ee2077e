use super::protocol::{McpError, ToolsCallResult};
use super::registry::{ApiAlias, ToolResult};
use crate::content::{ApiDispatcher, ApiRequest, API_ROOT};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Turn an alias plus tool arguments into a concrete backing-API request.
///
/// `{name}` placeholders in the route are substituted from the arguments;
/// placeholders with no matching argument stay literal. Arguments consumed
/// by the path are not forwarded again; the rest travel as query
/// parameters (GET) or as the JSON body (everything else).
pub fn build_request(alias: &ApiAlias, args: &Map<String, Value>) -> ApiRequest {
    let mut consumed = HashSet::new();
    let path: String = alias
        .route
        .split('/')
        .map(|segment| {
            let placeholder = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'));
            match placeholder.and_then(|name| args.get(name).map(|v| (name, v))) {
                Some((name, value)) => {
                    consumed.insert(name.to_string());
                    path_segment(value)
                }
                None => segment.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    let path = normalize_root(&path);

    let leftover: Vec<(String, Value)> = args
        .iter()
        .filter(|(name, _)| !consumed.contains(*name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    if alias.verb.is_mutating() {
        let body = leftover.into_iter().collect::<Map<String, Value>>();
        ApiRequest {
            verb: alias.verb,
            path,
            query: Vec::new(),
            body: Some(Value::Object(body)),
        }
    } else {
        ApiRequest {
            verb: alias.verb,
            path,
            query: leftover,
            body: None,
        }
    }
}

fn path_segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn normalize_root(path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if path.starts_with(API_ROOT) {
        path
    } else {
        format!("{}{}", API_ROOT, path)
    }
}

pub fn execute_alias(
    alias: &ApiAlias,
    args: &Map<String, Value>,
    dispatcher: &ApiDispatcher,
) -> ToolResult {
    let request = build_request(alias, args);
    match dispatcher.dispatch(&request) {
        Ok(value) => Ok(ToolsCallResult::json(&value)),
        Err(err) => Err(McpError::BackingApi {
            status: err.status,
            message: err.message,
        }),
    }
}
