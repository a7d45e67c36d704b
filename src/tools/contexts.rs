//! Context tools

use super::args::{Arguments, FromArguments, NoParams};
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::error::Result;
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateContextParams {
    pub name: String,
    pub description: Option<String>,
}

impl FromArguments for CreateContextParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            name: args.required("name")?,
            description: args.non_empty("description"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextName(pub String);

impl FromArguments for ContextName {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        args.required("name").map(Self)
    }
}

fn list_contexts(ctx: &ToolContext, _p: NoParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.list_contexts().await?) })
}

fn create_context(ctx: &ToolContext, p: CreateContextParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let context = ctx
            .client
            .create_context(&p.name, p.description.as_deref())
            .await?;
        ToolValue::from_serialize(&context)
    })
}

fn set_active_context(ctx: &ToolContext, p: ContextName) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let context = ctx.client.use_context(&p.0).await?;
        ctx.state.set_active_context(context.id.clone()).await?;
        tracing::info!(context_id = %context.id, name = %context.name, "Active context set");
        ToolValue::from_serialize(&context)
    })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.add(
        ToolDescriptor::new("list_contexts", "List all contexts.", Schema::object()),
        list_contexts,
    );
    registry.add(
        ToolDescriptor::new(
            "create_context",
            "Create a new context.",
            Schema::object()
                .required_string("name", "")
                .string("description", ""),
        )
        .writes(),
        create_context,
    );
    registry.add(
        ToolDescriptor::new(
            "set_active_context",
            "Set the active context.",
            Schema::object().required_string("name", ""),
        )
        .writes(),
        set_active_context,
    );
}
