//! Project tools

use super::args::{Arguments, FromArguments, NoParams, ProjectRef};
use super::resolve::match_project;
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::error::Result;
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProjectParams {
    pub name: String,
    pub description: Option<String>,
}

impl FromArguments for CreateProjectParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            name: args.required("name")?,
            description: args.non_empty("description"),
        })
    }
}

/// `projectName`: a name, full identifier, or identifier prefix
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveProjectParams(pub String);

impl FromArguments for ActiveProjectParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        args.required("projectName").map(Self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProjectParams {
    pub project_id: String,
    pub updates: Map<String, Value>,
}

impl FromArguments for UpdateProjectParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            project_id: args.required("projectId")?,
            updates: args.updates(&["name", "description"], &["description"]),
        })
    }
}

fn list_projects(ctx: &ToolContext, _p: NoParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.list_projects().await?) })
}

fn create_project(ctx: &ToolContext, p: CreateProjectParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let project = ctx
            .client
            .create_project(&p.name, p.description.as_deref())
            .await?;
        ToolValue::from_serialize(&project)
    })
}

fn set_active_project(ctx: &ToolContext, p: ActiveProjectParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let projects = ctx.client.list_projects().await?;
        let project = match_project(&projects, &p.0)?;
        ctx.client.set_project_active(&project.id).await?;
        ctx.state.set_active_project(project.id.clone()).await?;
        tracing::info!(project_id = %project.id, name = %project.name, "Active project set");
        Ok(ToolValue::Json(json!({
            "ok": true,
            "project_id": project.id,
            "name": project.name,
        })))
    })
}

fn get_project(ctx: &ToolContext, p: ProjectRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.get_project(&p.0).await?) })
}

fn update_project(ctx: &ToolContext, p: UpdateProjectParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let project = ctx.client.update_project(&p.project_id, p.updates).await?;
        ToolValue::from_serialize(&project)
    })
}

fn delete_project(ctx: &ToolContext, p: ProjectRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.delete_project(&p.0).await?;
        Ok(ToolValue::deleted(&p.0))
    })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    let project_id = || Schema::object().required_string("projectId", "");

    registry.add(
        ToolDescriptor::new(
            "list_projects",
            "List all projects. Always call this before create_project to check existing projects.",
            Schema::object(),
        ),
        list_projects,
    );
    registry.add(
        ToolDescriptor::new(
            "create_project",
            "Create a new project. Call list_projects first and reuse a project with a similar name or purpose.",
            Schema::object()
                .required_string("name", "Project name, must be unique")
                .string("description", ""),
        )
        .writes(),
        create_project,
    );
    registry.add(
        ToolDescriptor::new(
            "set_active_project",
            "Set the active project for new tasks.",
            Schema::object().required_string("projectName", "Project name, ID, or ID prefix"),
        )
        .writes(),
        set_active_project,
    );
    registry.add(
        ToolDescriptor::new("get_project", "Get project details.", project_id()),
        get_project,
    );
    registry.add(
        ToolDescriptor::new(
            "update_project",
            "Update project name or description.",
            project_id().string("name", "").string("description", ""),
        )
        .writes(),
        update_project,
    );
    registry.add(
        ToolDescriptor::new("delete_project", "Delete a project.", project_id()).destructive(),
        delete_project,
    );
}
