//! Identifier and active-project resolution
//!
//! Agents refer to projects by name, by full identifier, or by an
//! identifier prefix, and often not at all. These helpers turn such a
//! reference into a full identifier using the local state and the Domain
//! Client.

use super::ToolContext;
use crate::client::Project;
use crate::error::{RamorieError, Result};
use uuid::Uuid;

/// Resolve an optional project reference to a project identifier
///
/// With no reference: the locally persisted active project, then the
/// project the backend flags active, else [`RamorieError::NoActiveProject`].
/// With a reference: see [`resolve_project_ref`].
pub async fn resolve_project_id(ctx: &ToolContext, reference: Option<&str>) -> Result<String> {
    match reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => resolve_project_ref(ctx, reference).await,
        None => active_project_id(ctx).await,
    }
}

/// Resolve only when a reference was given; `None` stays `None`
pub async fn resolve_optional_project(
    ctx: &ToolContext,
    reference: Option<&str>,
) -> Result<Option<String>> {
    match reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => resolve_project_ref(ctx, reference).await.map(Some),
        None => Ok(None),
    }
}

async fn active_project_id(ctx: &ToolContext) -> Result<String> {
    if let Some(id) = ctx.state.active_project_id().await {
        tracing::debug!(project_id = %id, "Using locally active project");
        return Ok(id);
    }
    let projects = ctx.client.list_projects().await?;
    projects
        .into_iter()
        .find(|p| p.is_active)
        .map(|p| p.id)
        .ok_or_else(|| RamorieError::NoActiveProject.into())
}

/// Resolve an explicit project reference
///
/// A well-formed UUID is taken as-is. Otherwise the project list is searched:
/// an exact name or identifier match wins; failing that, a unique identifier
/// prefix. No match is "not found", several prefix matches are ambiguous.
pub async fn resolve_project_ref(ctx: &ToolContext, reference: &str) -> Result<String> {
    if Uuid::parse_str(reference).is_ok() {
        return Ok(reference.to_string());
    }
    let projects = ctx.client.list_projects().await?;
    match_project(&projects, reference).map(|p| p.id.clone())
}

/// Pick the project `reference` designates out of `projects`
pub fn match_project<'a>(projects: &'a [Project], reference: &str) -> Result<&'a Project> {
    let reference = reference.trim();
    if let Some(exact) = projects
        .iter()
        .find(|p| p.id == reference || p.name == reference)
    {
        return Ok(exact);
    }

    let by_prefix: Vec<&Project> = projects
        .iter()
        .filter(|p| p.id.starts_with(reference))
        .collect();
    match by_prefix.as_slice() {
        [single] => Ok(single),
        [] => Err(RamorieError::NotFound {
            kind: "project",
            reference: reference.to_string(),
        }
        .into()),
        many => Err(RamorieError::Ambiguous {
            kind: "project",
            reference: reference.to_string(),
            matches: many.len(),
        }
        .into()),
    }
}

/// Expand every task reference to its full identifier
///
/// The backend accepts short identifiers on single-task reads but bulk
/// operations need full ones, so each reference is looked up.
pub async fn resolve_task_ids(ctx: &ToolContext, references: &[String]) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(references.len());
    for reference in references {
        let task = ctx.client.get_task(reference).await?;
        ids.push(task.id);
    }
    if ids.is_empty() {
        return Err(RamorieError::InvalidArgument("no valid task ids".to_string()).into());
    }
    Ok(ids)
}
