//! Context pack tools

use super::args::{Arguments, FromArguments, NoParams, PackRef};
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::client::{ContextPackQuery, NewContextPack};
use crate::error::Result;
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

const DEFAULT_PACK_TYPE: &str = "custom";

#[derive(Debug, Clone, PartialEq)]
pub struct ListPacksParams(pub ContextPackQuery);

impl FromArguments for ListPacksParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self(ContextPackQuery {
            pack_type: args.non_empty("type"),
            status: args.non_empty("status"),
            query: args.non_empty("query"),
            limit: args.integer("limit").filter(|n| *n > 0),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePackParams(pub NewContextPack);

impl FromArguments for CreatePackParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self(NewContextPack {
            name: args.required("name")?,
            pack_type: args
                .non_empty("type")
                .unwrap_or_else(|| DEFAULT_PACK_TYPE.to_string()),
            description: args.non_empty("description"),
            status: args.non_empty("status"),
            tags: args.string_list("tags")?.unwrap_or_default(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePackParams {
    pub pack_id: String,
    pub updates: Map<String, Value>,
}

impl FromArguments for UpdatePackParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let pack_id = args.required("packId")?;
        let mut updates = args.updates(&["name", "type", "description", "status"], &["description"]);
        if let Some(tags) = args.string_list("tags")? {
            updates.insert("tags".to_string(), json!(tags));
        }
        Ok(Self { pack_id, updates })
    }
}

fn list_context_packs(ctx: &ToolContext, p: ListPacksParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.list_context_packs(p.0).await?) })
}

fn get_context_pack(ctx: &ToolContext, p: PackRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.get_context_pack(&p.0).await?) })
}

fn create_context_pack(ctx: &ToolContext, p: CreatePackParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.create_context_pack(p.0).await?) })
}

fn update_context_pack(ctx: &ToolContext, p: UpdatePackParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let pack = ctx.client.update_context_pack(&p.pack_id, p.updates).await?;
        ToolValue::from_serialize(&pack)
    })
}

fn delete_context_pack(ctx: &ToolContext, p: PackRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.delete_context_pack(&p.0).await?;
        Ok(ToolValue::deleted(&p.0))
    })
}

fn activate_context_pack(ctx: &ToolContext, p: PackRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let pack = ctx.client.activate_context_pack(&p.0).await?;
        Ok(ToolValue::Json(json!({ "ok": true, "pack": pack })))
    })
}

fn get_active_context_pack(ctx: &ToolContext, _p: NoParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ToolValue::from_serialize(&ctx.client.get_active_context_pack().await?)
    })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    let pack_id = || Schema::object().required_string("packId", "");
    let pack_type = "Pack type: project, integration, decision, custom";
    let pack_status = "Pack status: draft, published";

    registry.add(
        ToolDescriptor::new(
            "list_context_packs",
            "List context packs. Filter by type, status, or search query.",
            Schema::object()
                .string("type", pack_type)
                .string("status", pack_status)
                .string("query", "Search in name/description")
                .number("limit", ""),
        ),
        list_context_packs,
    );
    registry.add(
        ToolDescriptor::new("get_context_pack", "Get context pack details.", pack_id()),
        get_context_pack,
    );
    registry.add(
        ToolDescriptor::new(
            "create_context_pack",
            "Create a new context pack.",
            Schema::object()
                .required_string("name", "")
                .string("type", pack_type)
                .string("description", "")
                .string("status", pack_status)
                .string_array("tags", ""),
        )
        .writes(),
        create_context_pack,
    );
    registry.add(
        ToolDescriptor::new(
            "update_context_pack",
            "Update an existing context pack.",
            pack_id()
                .string("name", "")
                .string("type", "")
                .string("description", "")
                .string("status", "")
                .string_array("tags", ""),
        )
        .writes(),
        update_context_pack,
    );
    registry.add(
        ToolDescriptor::new("delete_context_pack", "Delete a context pack.", pack_id())
            .destructive(),
        delete_context_pack,
    );
    registry.add(
        ToolDescriptor::new(
            "activate_context_pack",
            "Activate (publish) a context pack.",
            pack_id(),
        )
        .writes(),
        activate_context_pack,
    );
    registry.add(
        ToolDescriptor::new(
            "get_active_context_pack",
            "Get the currently active context pack.",
            Schema::object(),
        ),
        get_active_context_pack,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeDomainClient;
    use crate::state::StateStore;
    use std::sync::Arc;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => Arguments::new(map),
            _ => Arguments::default(),
        }
    }

    async fn call(ctx: &ToolContext, name: &str, value: Value) -> Result<ToolValue> {
        let mut registry = ToolRegistry::new("test");
        register(&mut registry);
        registry
            .get(name)
            .expect("tool registered")
            .execute(ctx, &args(value))
            .await
    }

    #[test]
    fn test_create_pack_defaults_type() {
        let CreatePackParams(pack) =
            CreatePackParams::from_arguments(&args(json!({"name": "api", "tags": ["x"]}))).unwrap();
        assert_eq!(pack.pack_type, "custom");
        assert_eq!(pack.tags, vec!["x"]);
    }

    #[test]
    fn test_update_pack_skips_blank_fields() {
        let p = UpdatePackParams::from_arguments(&args(json!({
            "packId": "cp-1",
            "name": "",
            "type": "project",
            "description": "",
            "status": "  "
        })))
        .unwrap();
        assert_eq!(
            Value::Object(p.updates),
            json!({"type": "project", "description": ""})
        );
    }

    #[test]
    fn test_list_packs_query() {
        let ListPacksParams(q) = ListPacksParams::from_arguments(&args(json!({
            "type": "decision",
            "limit": "5"
        })))
        .unwrap();
        assert_eq!(q.pack_type.as_deref(), Some("decision"));
        assert_eq!(q.limit, Some(5));
        assert!(q.status.is_none());
    }

    #[tokio::test]
    async fn test_activate_wraps_pack() {
        let client = Arc::new(FakeDomainClient::new());
        let ctx = ToolContext::new(client.clone(), Arc::new(StateStore::default()));
        call(&ctx, "create_context_pack", json!({"name": "api"}))
            .await
            .unwrap();

        let ToolValue::Json(out) = call(&ctx, "activate_context_pack", json!({"packId": "cp-new-1"}))
            .await
            .unwrap()
        else {
            panic!("expected json");
        };
        assert_eq!(out["ok"], true);
        assert_eq!(out["pack"]["name"], "api");

        let ToolValue::Json(active) = call(&ctx, "get_active_context_pack", json!({})).await.unwrap()
        else {
            panic!("expected json");
        };
        assert_eq!(active["id"], "cp-new-1");
    }

    #[tokio::test]
    async fn test_delete_requires_pack_id() {
        let ctx = ToolContext::new(Arc::new(FakeDomainClient::new()), Arc::new(StateStore::default()));
        let err = call(&ctx, "delete_context_pack", json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "packId is required");
    }
}
