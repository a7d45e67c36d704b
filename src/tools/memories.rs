//! Memory tools

use super::args::{Arguments, FromArguments, MemoryRef, TaskRef};
use super::resolve::{resolve_optional_project, resolve_project_id};
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::client::Memory;
use crate::error::Result;
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct AddMemoryParams {
    pub content: String,
    pub project: Option<String>,
}

impl FromArguments for AddMemoryParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            content: args.required("content")?,
            project: args.non_empty("project"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListMemoriesParams {
    pub project: Option<String>,
    pub term: Option<String>,
    pub limit: Option<i64>,
}

impl FromArguments for ListMemoriesParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            project: args.non_empty("project"),
            term: args.non_empty("term"),
            limit: args.integer("limit").filter(|n| *n > 0),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkParams {
    pub task_id: String,
    pub memory_id: String,
    pub relation_type: Option<String>,
}

impl FromArguments for LinkParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let (task_id, memory_id) = args.required_pair("taskId", "memoryId")?;
        Ok(Self {
            task_id,
            memory_id,
            relation_type: args.non_empty("relationType"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateMemoryParams {
    pub memory_id: String,
    pub updates: Map<String, Value>,
}

impl FromArguments for UpdateMemoryParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let memory_id = args.required("memoryId")?;
        let mut updates = args.updates(&["content"], &[]);
        if let Some(tags) = args.string_list("tags")? {
            updates.insert("tags".to_string(), json!(tags));
        }
        Ok(Self { memory_id, updates })
    }
}

/// Case-insensitive substring match on memory content
pub fn matching<'a>(memories: &'a [Memory], term: &str) -> Vec<&'a Memory> {
    let needle = term.to_lowercase();
    memories
        .iter()
        .filter(|m| m.content.to_lowercase().contains(&needle))
        .collect()
}

fn add_memory(ctx: &ToolContext, p: AddMemoryParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let project_id = resolve_project_id(ctx, p.project.as_deref()).await?;
        let memory = ctx.client.create_memory(&project_id, &p.content).await?;
        ToolValue::from_serialize(&memory)
    })
}

fn list_memories(ctx: &ToolContext, p: ListMemoriesParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let project_id = resolve_optional_project(ctx, p.project.as_deref()).await?;
        let memories = ctx.client.list_memories(project_id.as_deref()).await?;
        let mut selected: Vec<&Memory> = match &p.term {
            Some(term) => matching(&memories, term),
            None => memories.iter().collect(),
        };
        if let Some(limit) = p.limit {
            selected.truncate(limit as usize);
        }
        ToolValue::from_serialize(&selected)
    })
}

fn get_task_memories(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.list_task_memories(&p.0).await?) })
}

fn memory_tasks(ctx: &ToolContext, p: MemoryRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.list_memory_tasks(&p.0).await?) })
}

fn create_memory_task_link(ctx: &ToolContext, p: LinkParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let body = ctx
            .client
            .create_memory_task_link(&p.task_id, &p.memory_id, p.relation_type.as_deref())
            .await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Null) | Err(_) => Ok(ToolValue::ok()),
            Ok(link) => Ok(ToolValue::Json(link)),
        }
    })
}

fn get_memory(ctx: &ToolContext, p: MemoryRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.get_memory(&p.0).await?) })
}

fn update_memory(ctx: &ToolContext, p: UpdateMemoryParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let memory = ctx.client.update_memory(&p.memory_id, p.updates).await?;
        ToolValue::from_serialize(&memory)
    })
}

fn delete_memory(ctx: &ToolContext, p: MemoryRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.delete_memory(&p.0).await?;
        Ok(ToolValue::deleted(&p.0))
    })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    let memory_id = || Schema::object().required_string("memoryId", "");

    registry.add(
        ToolDescriptor::new(
            "add_memory",
            "Add a memory to the knowledge base. Use for important information, learnings, decisions, or context.",
            Schema::object()
                .required_string("content", "Memory content, be descriptive")
                .string("project", "Project name or ID (uses active project if not specified)"),
        )
        .writes(),
        add_memory,
    );
    registry.add(
        ToolDescriptor::new(
            "list_memories",
            "List memories with optional filtering.",
            Schema::object()
                .string("project", "")
                .string("term", "Case-insensitive text filter")
                .number("limit", ""),
        ),
        list_memories,
    );
    registry.add(
        ToolDescriptor::new(
            "get_task_memories",
            "Get memories linked to a specific task.",
            Schema::object().required_string("taskId", ""),
        ),
        get_task_memories,
    );
    registry.add(
        ToolDescriptor::new(
            "memory_tasks",
            "Get tasks linked to a specific memory.",
            memory_id(),
        ),
        memory_tasks,
    );
    registry.add(
        ToolDescriptor::new(
            "create_memory_task_link",
            "Create a manual link between a task and a memory.",
            Schema::object()
                .required_string("taskId", "")
                .required_string("memoryId", "")
                .string("relationType", ""),
        )
        .writes(),
        create_memory_task_link,
    );
    registry.add(
        ToolDescriptor::new("get_memory", "Get memory details by ID.", memory_id()),
        get_memory,
    );
    registry.add(
        ToolDescriptor::new(
            "update_memory",
            "Update memory content or tags.",
            memory_id().string("content", "").string_array("tags", ""),
        )
        .writes(),
        update_memory,
    );
    registry.add(
        ToolDescriptor::new("delete_memory", "Delete a memory.", memory_id()).destructive(),
        delete_memory,
    );
}
