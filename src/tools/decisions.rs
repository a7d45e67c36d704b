//! Architectural decision record tools

use super::args::{Arguments, DecisionRef, FromArguments};
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::client::{DecisionQuery, NewDecision};
use crate::error::Result;
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ListDecisionsParams(pub DecisionQuery);

impl FromArguments for ListDecisionsParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self(DecisionQuery {
            status: args.non_empty("status"),
            area: args.non_empty("area"),
            limit: args.integer("limit").filter(|n| *n > 0),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDecisionParams(pub NewDecision);

impl FromArguments for CreateDecisionParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self(NewDecision {
            title: args.required("title")?,
            description: args.non_empty("description"),
            status: args.non_empty("status"),
            area: args.non_empty("area"),
            context: args.non_empty("context"),
            consequences: args.non_empty("consequences"),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDecisionParams {
    pub decision_id: String,
    pub updates: Map<String, Value>,
}

impl FromArguments for UpdateDecisionParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            decision_id: args.required("decisionId")?,
            // free-text fields may be cleared; labels may not
            updates: args.updates(
                &["title", "description", "status", "area", "context", "consequences"],
                &["description", "context", "consequences"],
            ),
        })
    }
}

fn list_decisions(ctx: &ToolContext, p: ListDecisionsParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.list_decisions(p.0).await?) })
}

fn get_decision(ctx: &ToolContext, p: DecisionRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.get_decision(&p.0).await?) })
}

fn create_decision(ctx: &ToolContext, p: CreateDecisionParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.create_decision(p.0).await?) })
}

fn update_decision(ctx: &ToolContext, p: UpdateDecisionParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let decision = ctx.client.update_decision(&p.decision_id, p.updates).await?;
        ToolValue::from_serialize(&decision)
    })
}

fn delete_decision(ctx: &ToolContext, p: DecisionRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.delete_decision(&p.0).await?;
        Ok(ToolValue::deleted(&p.0))
    })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    let decision_id = |description: &str| Schema::object().required_string("decisionId", description);
    let status = "Status: draft, proposed, approved, deprecated";
    let area = "Area: Frontend, Backend, Architecture, DevOps, etc.";

    registry.add(
        ToolDescriptor::new(
            "list_decisions",
            "List architectural decisions (ADRs).",
            Schema::object()
                .string("status", status)
                .string("area", area)
                .number("limit", ""),
        ),
        list_decisions,
    );
    registry.add(
        ToolDescriptor::new(
            "get_decision",
            "Get decision details.",
            decision_id("Decision ID or ADR number (e.g., ADR-001)"),
        ),
        get_decision,
    );
    registry.add(
        ToolDescriptor::new(
            "create_decision",
            "Create a new architectural decision (ADR). Use to record important technical decisions.",
            Schema::object()
                .required_string("title", "Decision title")
                .string("description", "Short description")
                .string("status", status)
                .string("area", area)
                .string("context", "Context and reasoning for the decision")
                .string("consequences", "Consequences and impacts of the decision"),
        )
        .writes(),
        create_decision,
    );
    registry.add(
        ToolDescriptor::new(
            "update_decision",
            "Update an existing decision.",
            decision_id("")
                .string("title", "")
                .string("description", "")
                .string("status", "")
                .string("area", "")
                .string("context", "")
                .string("consequences", ""),
        )
        .writes(),
        update_decision,
    );
    registry.add(
        ToolDescriptor::new("delete_decision", "Delete a decision.", decision_id(""))
            .destructive(),
        delete_decision,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeDomainClient;
    use crate::state::StateStore;
    use serde_json::json;
    use std::sync::Arc;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => Arguments::new(map),
            _ => Arguments::default(),
        }
    }

    #[test]
    fn test_update_clears_free_text_only() {
        let p = UpdateDecisionParams::from_arguments(&args(json!({
            "decisionId": "ADR-001",
            "title": "",
            "area": " ",
            "context": "",
            "consequences": " Slower builds "
        })))
        .unwrap();
        assert_eq!(
            Value::Object(p.updates),
            json!({"context": "", "consequences": "Slower builds"})
        );
    }

    #[test]
    fn test_create_requires_title() {
        let err = CreateDecisionParams::from_arguments(&args(json!({"area": "Backend"})))
            .unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[tokio::test]
    async fn test_create_and_delete() {
        let mut registry = ToolRegistry::new("test");
        register(&mut registry);
        let client = Arc::new(FakeDomainClient::new());
        let ctx = ToolContext::new(client.clone(), Arc::new(StateStore::default()));

        let created = registry
            .get("create_decision")
            .unwrap()
            .execute(&ctx, &args(json!({"title": "Adopt tokio", "status": "approved"})))
            .await
            .unwrap();
        let ToolValue::Json(created) = created else {
            panic!("expected json");
        };
        assert_eq!(created["status"], "approved");

        let deleted = registry
            .get("delete_decision")
            .unwrap()
            .execute(&ctx, &args(json!({"decisionId": "d-new-1"})))
            .await
            .unwrap();
        assert_eq!(deleted, ToolValue::deleted("d-new-1"));
        assert_eq!(
            client.calls(),
            vec!["create_decision:Adopt tokio", "delete_decision:d-new-1"]
        );
    }
}
