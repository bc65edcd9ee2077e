use super::context::ToolContext;
use super::protocol::{McpError, ToolDefinition, ToolsCallResult};
use super::proxy;
use super::schema::{input_schema, ParamSpec};
use crate::content::Verb;
use crate::user::Capability;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

pub type ToolResult = Result<ToolsCallResult, McpError>;
type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;
pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> ToolFuture + Send + Sync>;

/// Broad operation class, used for manifest metadata and sensible
/// capability defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }

    /// Capability a tool of this kind requires when none was set
    /// explicitly. Read-only tools need only `read`; anything mutating
    /// needs the registry's configured capability.
    pub fn default_capability(&self, mutating_default: Capability) -> Capability {
        match self {
            OperationKind::Read => Capability::Read,
            _ => mutating_default,
        }
    }
}

/// Route template plus verb a tool forwards to on the backing API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiAlias {
    pub verb: Verb,
    pub route: String,
}

pub enum ToolExecution {
    Callback(ToolHandler),
    Alias(ApiAlias),
}

pub struct ToolDescriptor {
    name: String,
    description: String,
    kind: OperationKind,
    enabled: AtomicBool,
    capability: RwLock<Option<Capability>>,
    params: BTreeMap<String, ParamSpec>,
    execution: ToolExecution,
}

impl ToolDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Capability required to call this tool, if one was set explicitly.
    pub fn required_capability(&self) -> Option<Capability> {
        *self.capability.read().unwrap()
    }

    pub fn set_capability(&self, capability: Capability) {
        *self.capability.write().unwrap() = Some(capability);
    }

    pub fn params(&self) -> &BTreeMap<String, ParamSpec> {
        &self.params
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: input_schema(&self.params),
        }
    }
}

pub struct ToolBuilder {
    name: String,
    description: String,
    kind: OperationKind,
    capability: Option<Capability>,
    params: BTreeMap<String, ParamSpec>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: OperationKind::Read,
            capability: None,
            params: BTreeMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn kind(mut self, kind: OperationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.params.insert(name.into(), spec);
        self
    }

    pub fn callback<F, Fut>(self, handler: F) -> ToolDescriptor
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        self.finish(ToolExecution::Callback(Arc::new(move |ctx, params| {
            Box::pin(handler(ctx, params))
        })))
    }

    pub fn alias(self, verb: Verb, route: impl Into<String>) -> ToolDescriptor {
        self.finish(ToolExecution::Alias(ApiAlias {
            verb,
            route: route.into(),
        }))
    }

    fn finish(self, execution: ToolExecution) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name,
            description: self.description,
            kind: self.kind,
            enabled: AtomicBool::new(true),
            capability: RwLock::new(self.capability),
            params: self.params,
            execution,
        }
    }
}

/// Registry of callable tools. Registration happens at startup; afterwards
/// tools are only flipped on and off or re-gated, never removed.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<ToolDescriptor>>>,
    default_capability: Capability,
}

impl ToolRegistry {
    pub fn new(default_capability: Capability) -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            default_capability,
        }
    }

    /// Register a tool. Invalid descriptors and duplicate names are
    /// rejected with a warning; an existing registration is never
    /// overwritten.
    pub fn register(&self, tool: ToolDescriptor) {
        if tool.name.is_empty() || tool.description.is_empty() {
            warn!("refusing to register tool with empty name or description");
            return;
        }
        let mut tools = self.tools.write().unwrap();
        if tools.contains_key(&tool.name) {
            warn!("tool {} already registered, keeping existing", tool.name);
            return;
        }
        info!("registered {} tool {}", tool.kind.as_str(), tool.name);
        tools.insert(tool.name.clone(), Arc::new(tool));
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<ToolDescriptor>> {
        self.tools.read().unwrap().get(name).cloned()
    }

    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.resolve(name) {
            Some(tool) => {
                tool.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    pub fn set_capability(&self, name: &str, capability: Capability) -> bool {
        match self.resolve(name) {
            Some(tool) => {
                tool.set_capability(capability);
                true
            }
            None => false,
        }
    }

    pub fn tool_count(&self) -> usize {
        self.tools.read().unwrap().len()
    }

    /// Manifest of enabled tools, sorted by name for stable output.
    pub fn manifest(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().unwrap();
        let mut definitions: Vec<ToolDefinition> = tools
            .values()
            .filter(|tool| tool.is_enabled())
            .map(|tool| tool.definition())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Run a tool. Checks run in a fixed order so callers get the most
    /// specific failure: existence, enablement, authentication, capability,
    /// then argument validation.
    pub async fn execute(&self, name: &str, arguments: Value, ctx: ToolContext) -> ToolResult {
        let tool = self
            .resolve(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;
        if !tool.is_enabled() {
            return Err(McpError::ToolDisabled(name.to_string()));
        }
        let principal = ctx.principal.as_ref().ok_or(McpError::Unauthenticated)?;
        let required = tool
            .required_capability()
            .unwrap_or_else(|| tool.kind().default_capability(self.default_capability));
        if !principal.has_capability(required) {
            return Err(McpError::Forbidden(required.as_str().to_string()));
        }

        let mut args = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => {
                return Err(McpError::InvalidParams(
                    "arguments must be an object".to_string(),
                ))
            }
        };
        for (name, spec) in &tool.params {
            if !args.contains_key(name) {
                if let Some(default) = &spec.default {
                    args.insert(name.clone(), default.clone());
                } else if spec.required {
                    return Err(McpError::MissingParameter(name.clone()));
                }
            }
        }

        match &tool.execution {
            ToolExecution::Callback(handler) => handler(ctx, Value::Object(args)).await,
            ToolExecution::Alias(alias) => proxy::execute_alias(alias, &args, &ctx.dispatcher),
        }
    }
}
