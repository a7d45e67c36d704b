//! Reporting, analysis, and cross-record task tools
//!
//! Report endpoints are not modelled by the Domain Client; their bodies are
//! fetched through the raw request escape hatch and handed to the normalizer
//! as text.

use super::args::{Arguments, FromArguments, TaskRef};
use super::resolve::{match_project, resolve_optional_project, resolve_project_ref, resolve_task_ids};
use super::tasks::TaskIdList;
use super::{Schema, ToolContext, ToolDescriptor, ToolRegistry};
use crate::client::{status, Analysis, NewTask, Priority, Project, Task, TaskQuery};
use crate::error::{RamorieError, Result};
use crate::mcp::normalize::ToolValue;
use futures::future::BoxFuture;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::fmt::Write as _;

const DEFAULT_DAYS: i64 = 7;
const DEFAULT_RECALL_LIMIT: i64 = 10;
const DEFAULT_EXPORT_FORMAT: &str = "markdown";

#[derive(Debug, Clone, PartialEq)]
pub struct StatsParams {
    pub project: Option<String>,
}

impl FromArguments for StatsParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            project: args.non_empty("project"),
        })
    }
}

/// `days` and `project` of `get_history` and `timeline`
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryParams {
    /// Zero or absent means the default window; negative asks for the
    /// backend's own default
    pub days: i64,
    pub project: Option<String>,
}

impl FromArguments for HistoryParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let days = match args.integer("days").unwrap_or(0) {
            0 => DEFAULT_DAYS,
            n => n,
        };
        Ok(Self {
            days,
            project: args.non_empty("project"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateParams {
    pub task_id: String,
    pub new_title: Option<String>,
}

impl FromArguments for DuplicateParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            task_id: args.required("taskId")?,
            new_title: args.non_empty("newDescription"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveParams {
    pub task_ids: Vec<String>,
    pub target_project: String,
}

impl FromArguments for MoveParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let target_project = args.required("targetProject")?;
        let TaskIdList(task_ids) = TaskIdList::from_arguments(args)?;
        Ok(Self {
            task_ids,
            target_project,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecallParams {
    pub term: String,
    pub limit: usize,
}

impl FromArguments for RecallParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            term: args.required("term")?,
            limit: args.positive_or("limit", DEFAULT_RECALL_LIMIT) as usize,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    pub project: String,
    pub format: String,
}

impl FromArguments for ExportParams {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        Ok(Self {
            project: args.required("project")?,
            format: args
                .non_empty("format")
                .unwrap_or_else(|| DEFAULT_EXPORT_FORMAT.to_string()),
        })
    }
}

fn history_path(days: i64, project_id: Option<&str>) -> String {
    let mut path = if days > 0 {
        format!("/reports/history?days={}", days)
    } else {
        "/reports/history".to_string()
    };
    if let Some(pid) = project_id {
        let sep = if path.contains('?') { '&' } else { '?' };
        let _ = write!(path, "{}project_id={}", sep, pid);
    }
    path
}

async fn fetch_report(ctx: &ToolContext, path: &str) -> Result<ToolValue> {
    let body = ctx.client.request(Method::GET, path, None).await?;
    Ok(ToolValue::Text(body))
}

/// Render the markdown report of `export_project`
pub fn render_markdown(project: &Project, tasks: &[Task]) -> String {
    let completed = tasks.iter().filter(|t| t.status == status::COMPLETED).count();
    let in_progress = tasks.iter().filter(|t| t.status == status::IN_PROGRESS).count();
    let pending = tasks.len() - completed - in_progress;

    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", project.name);
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "{}\n", description);
    }

    out.push_str("## Statistics\n\n");
    let _ = writeln!(out, "- **Total:** {}", tasks.len());
    let _ = writeln!(out, "- **Completed:** {}", completed);
    let _ = writeln!(out, "- **In progress:** {}", in_progress);
    let _ = writeln!(out, "- **Pending:** {}\n", pending);

    out.push_str("## Tasks\n\n");
    for task in tasks {
        let mark = match task.status.as_str() {
            status::COMPLETED => "[x]",
            status::IN_PROGRESS => "[~]",
            _ => "[ ]",
        };
        let _ = writeln!(out, "- {} **{}** [{}]", mark, task.title, task.priority);
    }
    out
}

fn get_stats(ctx: &ToolContext, p: StatsParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let path = match resolve_optional_project(ctx, p.project.as_deref()).await? {
            Some(pid) => format!("/reports/stats?project_id={}", pid),
            None => "/reports/stats".to_string(),
        };
        fetch_report(ctx, &path).await
    })
}

fn get_history(ctx: &ToolContext, p: HistoryParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let project_id = resolve_optional_project(ctx, p.project.as_deref()).await?;
        fetch_report(ctx, &history_path(p.days, project_id.as_deref())).await
    })
}

fn timeline(ctx: &ToolContext, p: HistoryParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let project_id = match resolve_optional_project(ctx, p.project.as_deref()).await {
            Ok(pid) => pid,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unresolved timeline project");
                None
            }
        };
        fetch_report(ctx, &history_path(p.days, project_id.as_deref())).await
    })
}

fn analyze_task_risks(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let analysis = ctx.client.analyze_task(&p.0, Analysis::Risks).await?;
        Ok(ToolValue::Json(analysis))
    })
}

fn analyze_task_dependencies(ctx: &ToolContext, p: TaskRef) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let analysis = ctx.client.analyze_task(&p.0, Analysis::Dependencies).await?;
        Ok(ToolValue::Json(analysis))
    })
}

fn duplicate_task(ctx: &ToolContext, p: DuplicateParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let original = ctx.client.get_task(&p.task_id).await?;
        let project_id = original.project_id.clone().ok_or_else(|| {
            RamorieError::InvalidResponse(format!("task {} has no project", original.id))
        })?;
        let title = p
            .new_title
            .unwrap_or_else(|| format!("{} (copy)", original.title));

        let copy = ctx
            .client
            .create_task(NewTask {
                project_id,
                title,
                description: original.description.clone(),
                priority: Priority::parse(&original.priority).unwrap_or_default(),
            })
            .await?;

        for note in &original.annotations {
            if let Err(e) = ctx.client.create_annotation(&copy.id, &note.content).await {
                tracing::warn!(task_id = %copy.id, error = %e, "Failed to copy task note");
            }
        }

        Ok(ToolValue::Json(json!({
            "ok": true,
            "original_id": original.id,
            "new_id": copy.id,
            "title": copy.title,
        })))
    })
}

fn move_tasks_to_project(ctx: &ToolContext, p: MoveParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let ids = resolve_task_ids(ctx, &p.task_ids).await?;
        let project_id = resolve_project_ref(ctx, &p.target_project).await?;

        let mut moved = 0usize;
        for id in &ids {
            let mut updates = Map::new();
            updates.insert("project_id".to_string(), Value::String(project_id.clone()));
            match ctx.client.update_task(id, updates).await {
                Ok(_) => moved += 1,
                Err(e) => tracing::warn!(task_id = %id, error = %e, "Failed to move task"),
            }
        }

        Ok(ToolValue::Json(json!({
            "ok": true,
            "moved": moved,
            "total": ids.len(),
            "project_id": project_id,
        })))
    })
}

fn recall(ctx: &ToolContext, p: RecallParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let memories = ctx.client.list_memories(None).await?;
        let results: Vec<Value> = super::memories::matching(&memories, &p.term)
            .into_iter()
            .take(p.limit)
            .map(|m| json!({ "id": m.id, "content": m.content, "created_at": m.created_at }))
            .collect();
        Ok(ToolValue::Json(json!({
            "term": p.term,
            "count": results.len(),
            "results": results,
        })))
    })
}

fn export_project(ctx: &ToolContext, p: ExportParams) -> BoxFuture<'_, Result<ToolValue>> {
    Box::pin(async move {
        let projects = ctx.client.list_projects().await?;
        let project = match_project(&projects, &p.project)?;
        let tasks = ctx
            .client
            .list_tasks(TaskQuery {
                project_id: Some(project.id.clone()),
                ..TaskQuery::default()
            })
            .await?;
        Ok(ToolValue::Json(json!({
            "project": project.name,
            "format": p.format,
            "markdown": render_markdown(project, &tasks),
        })))
    })
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    let task_id = || Schema::object().required_string("taskId", "");

    registry.add(
        ToolDescriptor::new(
            "get_stats",
            "Get task statistics and completion rates.",
            Schema::object().string("project", ""),
        ),
        get_stats,
    );
    registry.add(
        ToolDescriptor::new(
            "get_history",
            "Get task activity history for the last N days.",
            Schema::object()
                .number("days", "Number of days (default: 7)")
                .string("project", ""),
        ),
        get_history,
    );
    registry.add(
        ToolDescriptor::new(
            "analyze_task_risks",
            "Analyze potential risks for a task using AI.",
            task_id(),
        ),
        analyze_task_risks,
    );
    registry.add(
        ToolDescriptor::new(
            "analyze_task_dependencies",
            "Analyze dependencies and blockers for a task using AI.",
            task_id(),
        ),
        analyze_task_dependencies,
    );
    registry.add(
        ToolDescriptor::new(
            "duplicate_task",
            "Duplicate a task with its notes (status reset to TODO, progress to 0).",
            task_id().string("newDescription", "Title for the copy"),
        )
        .writes(),
        duplicate_task,
    );
    registry.add(
        ToolDescriptor::new(
            "move_tasks_to_project",
            "Move tasks to another existing project.",
            Schema::object()
                .required_string_array("taskIds", "")
                .required_string("targetProject", "Target project name or ID"),
        )
        .writes(),
        move_tasks_to_project,
    );
    registry.add(
        ToolDescriptor::new(
            "timeline",
            "Get activity timeline for the last N days.",
            Schema::object().number("days", "").string("project", ""),
        ),
        timeline,
    );
    registry.add(
        ToolDescriptor::new(
            "recall",
            "Search memories by text (keyword search).",
            Schema::object()
                .required_string("term", "")
                .number("limit", ""),
        ),
        recall,
    );
    registry.add(
        ToolDescriptor::new(
            "export_project",
            "Export a project report in markdown format.",
            Schema::object()
                .required_string("project", "")
                .string("format", ""),
        ),
        export_project,
    );
}
