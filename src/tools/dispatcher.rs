//! Name-keyed tool dispatch

use super::{Arguments, ToolContext, ToolRegistry};
use crate::error::{RamorieError, Result};
use crate::mcp::normalize::ToolValue;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Routes `tools/call` requests to registered executors
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    context: ToolContext,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, context: ToolContext) -> Self {
        Self { registry, context }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    /// Run tool `name` with `arguments`
    ///
    /// # Errors
    ///
    /// Returns [`RamorieError::ToolNotImplemented`] for names outside the
    /// catalogue, otherwise whatever the tool itself reports.
    pub async fn dispatch(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolValue> {
        let executor = self.registry.get(name).ok_or_else(|| {
            tracing::debug!(tool = name, "Unknown tool requested");
            RamorieError::ToolNotImplemented(name.to_string())
        })?;

        let args = Arguments::new(arguments);
        let started = Instant::now();
        let outcome = executor.execute(&self.context, &args).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(_) => tracing::debug!(tool = name, elapsed_ms, "Tool call succeeded"),
            Err(e) => tracing::debug!(tool = name, elapsed_ms, error = %e, "Tool call failed"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{task, FakeDomainClient};
    use crate::state::StateStore;
    use crate::tools::build_catalogue;
    use serde_json::json;

    fn dispatcher(client: FakeDomainClient) -> (Dispatcher, Arc<FakeDomainClient>) {
        let client = Arc::new(client);
        let ctx = ToolContext::new(client.clone(), Arc::new(StateStore::default()));
        (Dispatcher::new(Arc::new(build_catalogue()), ctx), client)
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_implemented() {
        let (dispatcher, _) = dispatcher(FakeDomainClient::new());
        let err = dispatcher
            .dispatch("launch_rocket", Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "tool not implemented: launch_rocket");
    }

    #[tokio::test]
    async fn test_dispatch_reaches_client() {
        let (dispatcher, client) =
            dispatcher(FakeDomainClient::new().with_tasks(vec![task("t-1", "x", "TODO", "M")]));
        let out = dispatcher
            .dispatch("start_task", args(json!({"taskId": "t-1"})))
            .await
            .unwrap();
        assert_eq!(out, ToolValue::ok());
        assert_eq!(client.calls(), vec!["start_task:t-1"]);
    }

    #[tokio::test]
    async fn test_validation_failure_skips_client() {
        let (dispatcher, client) = dispatcher(FakeDomainClient::new());
        let err = dispatcher
            .dispatch("create_task", args(json!({"description": "   "})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "description is required");
        assert!(client.calls().is_empty());
    }
}
