//! Task tools

use super::args::{Arguments, FromArguments, NoParams, TaskRef};
use super::resolve::{resolve_optional_project, resolve_project_id, resolve_task_ids};
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::client::{status, NewTask, Priority, Task, TaskQuery};
use crate::error::{RamorieError, Result};
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};
use std::cmp::Reverse;

const DEFAULT_NEXT_COUNT: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskParams {
    pub description: String,
    pub priority: Priority,
    pub project: Option<String>,
}

impl FromArguments for CreateTaskParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            description: args.required("description")?,
            priority: args
                .non_empty("priority")
                .and_then(|p| Priority::parse(&p))
                .unwrap_or_default(),
            project: args.non_empty("project"),
        })
    }
}

/// Shared filters of `list_tasks` and `search_tasks`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub query: Option<String>,
    pub status: Option<String>,
    pub project: Option<String>,
    pub tag: Option<String>,
    pub limit: Option<i64>,
}

impl TaskFilter {
    fn read(args: &Arguments) -> Self {
        Self {
            query: args.non_empty("query"),
            status: args.non_empty("status"),
            project: args.non_empty("project"),
            tag: args.non_empty("tag"),
            limit: args.integer("limit").filter(|n| *n > 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListTasksParams(pub TaskFilter);

impl FromArguments for ListTasksParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let mut filter = TaskFilter::read(args);
        filter.query = None;
        filter.tag = None;
        Ok(Self(filter))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchTasksParams(pub TaskFilter);

impl FromArguments for SearchTasksParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let query = args.required("query")?;
        Ok(Self(TaskFilter {
            query: Some(query),
            ..TaskFilter::read(args)
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextTasksParams {
    pub count: usize,
    pub project: Option<String>,
    pub tag: Option<String>,
}

impl FromArguments for NextTasksParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            count: args.positive_or("count", DEFAULT_NEXT_COUNT) as usize,
            project: args.non_empty("project"),
            tag: args.non_empty("tag"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatusParams {
    pub task_id: String,
    pub status: String,
}

impl FromArguments for UpdateStatusParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let (task_id, status) = args.required_pair("taskId", "status")?;
        Ok(Self { task_id, status })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProgressParams {
    pub task_id: String,
    pub progress: i64,
}

impl FromArguments for UpdateProgressParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let task_id = args.required("taskId")?;
        let progress = args
            .integer("progress")
            .ok_or_else(|| RamorieError::required("progress"))?;
        if !(0..=100).contains(&progress) {
            return Err(RamorieError::InvalidArgument(
                "progress must be between 0 and 100".to_string(),
            )
            .into());
        }
        Ok(Self { task_id, progress })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskNoteParams {
    pub task_id: String,
    pub note: String,
}

impl FromArguments for TaskNoteParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let (task_id, note) = args.required_pair("taskId", "note")?;
        Ok(Self { task_id, note })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtaskParams {
    pub parent_task_id: String,
    pub description: String,
}

impl FromArguments for SubtaskParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let (parent_task_id, description) = args.required_pair("parentTaskId", "description")?;
        Ok(Self {
            parent_task_id,
            description,
        })
    }
}

/// `taskIds` of the bulk tools
#[derive(Debug, Clone, PartialEq)]
pub struct TaskIdList(pub Vec<String>);

impl FromArguments for TaskIdList {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        args.required_list("taskIds").map(Self)
    }
}

/// Ranking used by `get_next_tasks`; unknown priorities sort last
pub fn priority_rank(priority: &str) -> u8 {
    match Priority::parse(priority) {
        Some(Priority::High) => 3,
        Some(Priority::Medium) => 2,
        Some(Priority::Low) => 1,
        None => 0,
    }
}

/// Highest priority first, then oldest first
pub fn order_for_work(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (Reverse(priority_rank(&t.priority)), t.created_at));
}

fn truncate<T>(mut items: Vec<T>, limit: Option<i64>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }
    items
}

async fn filtered_tasks(ctx: &ToolContext, filter: TaskFilter) -> Result<Vec<Task>> {
    let project_id = resolve_optional_project(ctx, filter.project.as_deref()).await?;
    let tasks = ctx
        .client
        .list_tasks(TaskQuery {
            project_id,
            status: filter.status,
            query: filter.query,
            tags: filter.tag.into_iter().collect(),
        })
        .await?;
    Ok(truncate(tasks, filter.limit))
}

fn create_task(ctx: &ToolContext, p: CreateTaskParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let project_id = resolve_project_id(ctx, p.project.as_deref()).await?;
        let task = ctx
            .client
            .create_task(NewTask {
                project_id,
                title: p.description,
                description: None,
                priority: p.priority,
            })
            .await?;
        ToolValue::from_serialize(&task)
    })
}

fn list_tasks(ctx: &ToolContext, p: ListTasksParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&filtered_tasks(ctx, p.0).await?) })
}

fn search_tasks(ctx: &ToolContext, p: SearchTasksParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&filtered_tasks(ctx, p.0).await?) })
}

fn get_next_tasks(ctx: &ToolContext, p: NextTasksParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let filter = TaskFilter {
            status: Some(status::TODO.to_string()),
            project: p.project,
            tag: p.tag,
            ..TaskFilter::default()
        };
        let mut tasks = filtered_tasks(ctx, filter).await?;
        order_for_work(&mut tasks);
        tasks.truncate(p.count);
        ToolValue::from_serialize(&tasks)
    })
}

fn get_task(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.get_task(&p.0).await?) })
}

fn start_task(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.start_task(&p.0).await?;
        Ok(ToolValue::ok())
    })
}

fn complete_task(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.complete_task(&p.0).await?;
        Ok(ToolValue::ok())
    })
}

fn stop_task(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.stop_task(&p.0).await?;
        Ok(ToolValue::ok())
    })
}

fn get_active_task(ctx: &ToolContext, _p: NoParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { ToolValue::from_serialize(&ctx.client.get_active_task().await?) })
}

fn delete_task(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        ctx.client.delete_task(&p.0).await?;
        Ok(ToolValue::deleted(&p.0))
    })
}

fn update_task_status(ctx: &ToolContext, p: UpdateStatusParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let mut updates = Map::new();
        updates.insert("status".to_string(), Value::String(p.status));
        ToolValue::from_serialize(&ctx.client.update_task(&p.task_id, updates).await?)
    })
}

fn update_progress(ctx: &ToolContext, p: UpdateProgressParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let mut updates = Map::new();
        updates.insert("progress".to_string(), json!(p.progress));
        ToolValue::from_serialize(&ctx.client.update_task(&p.task_id, updates).await?)
    })
}

fn add_task_note(ctx: &ToolContext, p: TaskNoteParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let note = ctx.client.create_annotation(&p.task_id, &p.note).await?;
        ToolValue::from_serialize(&note)
    })
}

fn create_subtask(ctx: &ToolContext, p: SubtaskParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let subtask = ctx
            .client
            .create_subtask(&p.parent_task_id, &p.description)
            .await?;
        ToolValue::from_serialize(&subtask)
    })
}

async fn bulk_status(ctx: &ToolContext, references: &[String], status: &str) -> Result<ToolValue> {
    let ids = resolve_task_ids(ctx, references).await?;
    ctx.client.bulk_update_status(&ids, status).await?;
    Ok(ToolValue::Json(json!({ "ok": true, "count": ids.len() })))
}

fn bulk_start_tasks(ctx: &ToolContext, p: TaskIdList) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { bulk_status(ctx, &p.0, status::IN_PROGRESS).await })
}

fn bulk_complete_tasks(ctx: &ToolContext, p: TaskIdList) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move { bulk_status(ctx, &p.0, status::COMPLETED).await })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    let task_id = || Schema::object().required_string("taskId", "Task ID or prefix");

    registry.add(
        ToolDescriptor::new(
            "create_task",
            "Create a new task in an existing project. Check list_tasks first to avoid duplicates.",
            Schema::object()
                .required_string("description", "Task description, clear and actionable")
                .string("priority", "Priority: H=High, M=Medium, L=Low")
                .string("project", "Project name or ID (uses active project if not specified)"),
        )
        .writes(),
        create_task,
    );
    registry.add(
        ToolDescriptor::new(
            "list_tasks",
            "List tasks with filtering. Call this before create_task to avoid duplicates.",
            Schema::object()
                .string("status", "Filter by status: TODO, IN_PROGRESS, COMPLETED")
                .string("project", "Project name or ID")
                .number("limit", "Maximum results"),
        ),
        list_tasks,
    );
    registry.add(
        ToolDescriptor::new(
            "search_tasks",
            "Search tasks by keyword.",
            Schema::object()
                .required_string("query", "Search query")
                .string("status", "")
                .string("project", "")
                .string("tag", "")
                .number("limit", ""),
        ),
        search_tasks,
    );
    registry.add(
        ToolDescriptor::new(
            "get_next_tasks",
            "Get prioritized TODO tasks, sorted by priority (H>M>L) then age.",
            Schema::object()
                .number("count", "Number of tasks (default: 5)")
                .string("project", "")
                .string("tag", ""),
        ),
        get_next_tasks,
    );
    registry.add(
        ToolDescriptor::new(
            "get_task",
            "Get task details including notes and metadata.",
            task_id(),
        ),
        get_task,
    );
    registry.add(
        ToolDescriptor::new(
            "start_task",
            "Start a task (sets status to IN_PROGRESS).",
            task_id(),
        )
        .writes(),
        start_task,
    );
    registry.add(
        ToolDescriptor::new(
            "complete_task",
            "Complete a task (sets status to COMPLETED).",
            task_id(),
        )
        .writes(),
        complete_task,
    );
    registry.add(
        ToolDescriptor::new(
            "stop_task",
            "Pause a task (clears active task, keeps IN_PROGRESS status).",
            task_id(),
        )
        .writes(),
        stop_task,
    );
    registry.add(
        ToolDescriptor::new(
            "get_active_task",
            "Get the currently active task.",
            Schema::object(),
        ),
        get_active_task,
    );
    registry.add(
        ToolDescriptor::new("delete_task", "Delete a task.", task_id()).destructive(),
        delete_task,
    );
    registry.add(
        ToolDescriptor::new(
            "update_task_status",
            "Update task status (TODO, IN_PROGRESS, COMPLETED).",
            task_id().required_string("status", ""),
        )
        .writes(),
        update_task_status,
    );
    registry.add(
        ToolDescriptor::new(
            "update_progress",
            "Update task progress percentage (0-100).",
            task_id().required_number("progress", ""),
        )
        .writes(),
        update_progress,
    );
    registry.add(
        ToolDescriptor::new(
            "add_task_note",
            "Add a note to a task.",
            task_id().required_string("note", ""),
        )
        .writes(),
        add_task_note,
    );
    registry.add(
        ToolDescriptor::new(
            "create_subtask",
            "Create a subtask for breaking down work.",
            Schema::object()
                .required_string("parentTaskId", "")
                .required_string("description", ""),
        )
        .writes(),
        create_subtask,
    );
    registry.add(
        ToolDescriptor::new(
            "bulk_start_tasks",
            "Start multiple tasks at once.",
            Schema::object().required_string_array("taskIds", ""),
        )
        .writes(),
        bulk_start_tasks,
    );
    registry.add(
        ToolDescriptor::new(
            "bulk_complete_tasks",
            "Complete multiple tasks at once.",
            Schema::object().required_string_array("taskIds", ""),
        )
        .writes(),
        bulk_complete_tasks,
    );
}
