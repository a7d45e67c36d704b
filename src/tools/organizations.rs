//! Organization tools

use super::args::{Arguments, FromArguments, NoParams, OrgRef};
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::error::Result;
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrganizationParams {
    pub name: String,
    pub description: Option<String>,
}

impl FromArguments for CreateOrganizationParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            name: args.required("name")?,
            description: args.non_empty("description"),
        })
    }
}

fn list_organizations(ctx: &ToolContext, _p: NoParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.list_organizations().await?) })
}

fn get_organization(ctx: &ToolContext, p: OrgRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.get_organization(&p.0).await?) })
}

fn create_organization(
    ctx: &ToolContext,
    p: CreateOrganizationParams,
) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let org = ctx
            .client
            .create_organization(&p.name, p.description.as_deref())
            .await?;
        ToolValue::from_serialize(&org)
    })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.add(
        ToolDescriptor::new("list_organizations", "List organizations.", Schema::object()),
        list_organizations,
    );
    registry.add(
        ToolDescriptor::new(
            "get_organization",
            "Get organization details.",
            Schema::object().required_string("orgId", ""),
        ),
        get_organization,
    );
    registry.add(
        ToolDescriptor::new(
            "create_organization",
            "Create a new organization.",
            Schema::object()
                .required_string("name", "")
                .string("description", ""),
        )
        .writes(),
        create_organization,
    );
}
