//! Tool catalogue and execution framework
//!
//! A tool is a [`ToolDescriptor`] (what `tools/list` advertises) paired with
//! a [`ToolExecutor`] (what `tools/call` runs). Most tools are a plain
//! handler function over a typed parameter struct, wrapped by
//! [`TypedTool`]; the [`ToolRegistry`] keeps both halves in canonical order.

pub mod args;
pub mod contexts;
pub mod decisions;
pub mod dispatcher;
pub mod memories;
pub mod organizations;
pub mod packs;
pub mod projects;
pub mod registry_builder;
pub mod reports;
pub mod resolve;
pub mod tasks;

pub use args::{Arguments, FromArguments};
pub use dispatcher::Dispatcher;
pub use registry_builder::{build_catalogue, CATALOGUE_VERSION};

use crate::client::DomainClient;
use crate::error::Result;
use crate::mcp::normalize::ToolValue;
use crate::mcp::types::{ListToolsResponse, McpTool, ToolAnnotations};
use crate::state::StateStore;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a handler may touch while running
///
/// Built once at server start and shared by every call.
#[derive(Clone)]
pub struct ToolContext {
    pub client: Arc<dyn DomainClient>,
    pub state: Arc<StateStore>,
}

impl ToolContext {
    pub fn new(client: Arc<dyn DomainClient>, state: Arc<StateStore>) -> Self {
        Self { client, state }
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("state", &self.state.path())
            .finish_non_exhaustive()
    }
}

/// How a tool affects backend state, advertised as MCP annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Only reads
    Read,
    /// Creates or changes records
    Write,
    /// Deletes records
    Destructive,
}

impl ToolKind {
    pub fn annotations(&self) -> ToolAnnotations {
        match self {
            ToolKind::Read => ToolAnnotations {
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
            },
            ToolKind::Write => ToolAnnotations {
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                idempotent_hint: None,
            },
            ToolKind::Destructive => ToolAnnotations {
                read_only_hint: Some(false),
                destructive_hint: Some(true),
                idempotent_hint: Some(true),
            },
        }
    }
}

/// Static description of one tool
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub kind: ToolKind,
}

impl ToolDescriptor {
    pub fn new(name: &'static str, description: &'static str, input_schema: Schema) -> Self {
        Self {
            name,
            description,
            input_schema: input_schema.build(),
            kind: ToolKind::Read,
        }
    }

    /// Mark the tool as creating or changing records
    pub fn writes(mut self) -> Self {
        self.kind = ToolKind::Write;
        self
    }

    /// Mark the tool as deleting records
    pub fn destructive(mut self) -> Self {
        self.kind = ToolKind::Destructive;
        self
    }

    /// The `tools/list` entry for this descriptor
    pub fn to_mcp_tool(&self) -> McpTool {
        McpTool {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema.clone(),
            annotations: Some(self.kind.annotations()),
        }
    }
}

/// Builder for the JSON-schema-like object describing a tool's arguments
///
/// # Examples
///
/// ```
/// use ramorie::tools::Schema;
///
/// let schema = Schema::object()
///     .required_string("taskId", "Task ID or prefix")
///     .number("limit", "Maximum results")
///     .build();
/// assert_eq!(schema["required"][0], "taskId");
/// assert_eq!(schema["properties"]["limit"]["type"], "number");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl Schema {
    pub fn object() -> Self {
        Self::default()
    }

    fn property(mut self, name: &str, mut spec: Value, description: &str, required: bool) -> Self {
        if !description.is_empty() {
            spec["description"] = Value::String(description.to_string());
        }
        self.properties.insert(name.to_string(), spec);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn string(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "string"}), description, false)
    }

    pub fn required_string(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "string"}), description, true)
    }

    pub fn number(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "number"}), description, false)
    }

    pub fn required_number(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "number"}), description, true)
    }

    pub fn string_array(self, name: &str, description: &str) -> Self {
        self.property(
            name,
            json!({"type": "array", "items": {"type": "string"}}),
            description,
            false,
        )
    }

    pub fn required_string_array(self, name: &str, description: &str) -> Self {
        self.property(
            name,
            json!({"type": "array", "items": {"type": "string"}}),
            description,
            true,
        )
    }

    pub fn build(self) -> Value {
        let mut schema = json!({
            "type": "object",
            "properties": Value::Object(self.properties),
        });
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        schema
    }
}

/// Tool executor trait
///
/// Executors receive the already-coerced [`Arguments`] of one call and the
/// shared [`ToolContext`]. Failures are returned as errors and become soft
/// failures in the `tools/call` envelope.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute the tool
    ///
    /// # Errors
    ///
    /// Returns an error when arguments are invalid or the Domain Client fails.
    async fn execute(&self, ctx: &ToolContext, args: &Arguments) -> Result<ToolValue>;
}

/// Signature of a typed tool handler
pub type Handler<P> = for<'a> fn(&'a ToolContext, P) -> BoxFuture<'a, Result<ToolValue>>;

/// Adapter running a typed handler after building its parameters
pub struct TypedTool<P> {
    handler: Handler<P>,
}

impl<P> TypedTool<P> {
    pub fn new(handler: Handler<P>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<P> ToolExecutor for TypedTool<P>
where
    P: FromArguments + Send + 'static,
{
    async fn execute(&self, ctx: &ToolContext, args: &Arguments) -> Result<ToolValue> {
        let params = P::from_arguments(args)?;
        (self.handler)(ctx, params).await
    }
}

/// Ordered tool catalogue with name lookup
///
/// Listing order is registration order. Registering a name twice replaces
/// the earlier entry in place.
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
    version: String,
}

impl ToolRegistry {
    /// Create an empty registry for catalogue `version`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            descriptors: Vec::new(),
            tools: HashMap::new(),
            version: version.into(),
        }
    }

    /// Register a tool executor under its descriptor
    pub fn register(&mut self, descriptor: ToolDescriptor, executor: Arc<dyn ToolExecutor>) {
        let name = descriptor.name;
        match self.descriptors.iter_mut().find(|d| d.name == name) {
            Some(existing) => {
                tracing::warn!(tool = name, "Replacing previously registered tool");
                *existing = descriptor;
            }
            None => self.descriptors.push(descriptor),
        }
        self.tools.insert(name.to_string(), executor);
    }

    /// Register a typed handler function
    pub fn add<P>(&mut self, descriptor: ToolDescriptor, handler: Handler<P>)
    where
        P: FromArguments + Send + 'static,
    {
        self.register(descriptor, Arc::new(TypedTool::new(handler)));
    }

    /// Get a tool executor by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.get(name).cloned()
    }

    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Descriptors in listing order
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The complete `tools/list` payload
    pub fn list_response(&self) -> ListToolsResponse {
        ListToolsResponse {
            tools: self.descriptors.iter().map(ToolDescriptor::to_mcp_tool).collect(),
            meta: Some(json!({ "catalogueVersion": self.version })),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(CATALOGUE_VERSION)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("version", &self.version)
            .field("tools", &self.descriptors.iter().map(|d| d.name).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeDomainClient;
    use crate::tools::args::{NoParams, TaskRef};

    fn ctx() -> ToolContext {
        ToolContext::new(
            Arc::new(FakeDomainClient::new()),
            Arc::new(StateStore::default()),
        )
    }

    fn echo(_ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
        Box::pin(async move { Ok(ToolValue::Json(json!({ "task": p.0 }))) })
    }

    fn pong(_ctx: &ToolContext, _p: NoParams) -> BoxFuture<'_, Result<ToolValue>> {
        Box::pin(async move { Ok(ToolValue::ok()) })
    }

    fn descriptor(name: &'static str) -> ToolDescriptor {
        ToolDescriptor::new(name, "test tool", Schema::object())
    }

    #[test]
    fn test_schema_omits_empty_required() {
        let schema = Schema::object().build();
        assert_eq!(schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn test_schema_array_items() {
        let schema = Schema::object()
            .required_string_array("taskIds", "")
            .build();
        assert_eq!(
            schema["properties"]["taskIds"],
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(schema["required"], json!(["taskIds"]));
    }

    #[test]
    fn test_kind_annotations() {
        let read = ToolKind::Read.annotations();
        assert_eq!(read.read_only_hint, Some(true));
        let destructive = ToolKind::Destructive.annotations();
        assert_eq!(destructive.destructive_hint, Some(true));
        assert_eq!(destructive.read_only_hint, Some(false));
    }

    #[test]
    fn test_registry_keeps_registration_order() {
        let mut registry = ToolRegistry::new("test");
        registry.add(descriptor("zeta"), pong);
        registry.add(descriptor("alpha"), pong);
        registry.add(descriptor("mid"), echo);
        let names: Vec<_> = registry.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_registry_duplicate_replaces_in_place() {
        let mut registry = ToolRegistry::new("test");
        registry.add(descriptor("one"), pong);
        registry.add(descriptor("two"), pong);
        registry.add(descriptor("one").destructive(), echo);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.descriptors()[0].kind, ToolKind::Destructive);
    }

    #[test]
    fn test_list_response_carries_version() {
        let mut registry = ToolRegistry::new("9.9");
        registry.add(descriptor("one"), pong);
        let listed = serde_json::to_value(registry.list_response()).unwrap();
        assert_eq!(listed["_meta"]["catalogueVersion"], "9.9");
        assert_eq!(listed["tools"][0]["name"], "one");
        assert_eq!(listed["tools"][0]["inputSchema"]["type"], "object");
        assert_eq!(listed["tools"][0]["annotations"]["readOnlyHint"], true);
    }

    #[tokio::test]
    async fn test_typed_tool_validates_before_handler() {
        let tool = TypedTool::new(echo as Handler<TaskRef>);
        let ctx = ctx();

        let missing = tool.execute(&ctx, &Arguments::default()).await.unwrap_err();
        assert_eq!(missing.to_string(), "taskId is required");

        let mut map = Map::new();
        map.insert("taskId".to_string(), json!(" t-1 "));
        let value = tool.execute(&ctx, &Arguments::new(map)).await.unwrap();
        assert_eq!(value, ToolValue::Json(json!({"task": "t-1"})));
    }
}
