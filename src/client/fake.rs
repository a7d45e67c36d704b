//! In-memory [`DomainClient`] for unit tests
//!
//! Holds projects, tasks, memories, and friends in plain vectors and records
//! every call as a short string such as `"start_task:t-1"`, so tests can
//! assert both on results and on what reached the backend.

use super::models::*;
use super::DomainClient;
use crate::error::{RamorieError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeData {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub memories: Vec<Memory>,
    pub contexts: Vec<Context>,
    pub packs: Vec<ContextPack>,
    pub organizations: Vec<Organization>,
    pub decisions: Vec<Decision>,
    pub active_task: Option<String>,
    pub active_pack: Option<String>,
    /// Canned bodies for [`DomainClient::request`], keyed by path
    pub raw: HashMap<String, String>,
    /// Body returned by `create_memory_task_link`
    pub link_body: String,
    /// Task ids whose updates fail
    pub failing_updates: Vec<String>,
    pub calls: Vec<String>,
    next_id: u32,
}

#[derive(Debug, Default)]
pub struct FakeDomainClient {
    pub data: Mutex<FakeData>,
}

pub fn project(id: &str, name: &str, is_active: bool) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        is_active,
        ..Project::default()
    }
}

pub fn task(id: &str, title: &str, status: &str, priority: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        status: status.to_string(),
        priority: priority.to_string(),
        ..Task::default()
    }
}

pub fn memory(id: &str, content: &str) -> Memory {
    Memory {
        id: id.to_string(),
        content: content.to_string(),
        ..Memory::default()
    }
}

fn not_found(kind: &'static str, id: &str) -> anyhow::Error {
    RamorieError::Api {
        status: 404,
        message: format!("{} {} not found", kind, id),
    }
    .into()
}

/// Apply a partial update map onto a serializable record
fn merge<T>(record: &T, updates: &Map<String, Value>) -> Result<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        for (k, v) in updates {
            map.insert(k.clone(), v.clone());
        }
    }
    Ok(serde_json::from_value(value)?)
}

impl FakeDomainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.lock().projects = projects;
        self
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.lock().tasks = tasks;
        self
    }

    pub fn with_memories(self, memories: Vec<Memory>) -> Self {
        self.lock().memories = memories;
        self
    }

    pub fn with_raw(self, path: &str, body: &str) -> Self {
        self.lock().raw.insert(path.to_string(), body.to_string());
        self
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, FakeData> {
        self.data.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.lock().calls.push(call.into());
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut data = self.lock();
        data.next_id += 1;
        format!("{}-new-{}", prefix, data.next_id)
    }
}

#[async_trait]
impl DomainClient for FakeDomainClient {
    async fn create_task(&self, new: NewTask) -> Result<Task> {
        self.record(format!("create_task:{}:{}", new.project_id, new.title));
        let created = Task {
            id: self.fresh_id("t"),
            title: new.title,
            description: new.description,
            status: status::TODO.to_string(),
            priority: new.priority.as_str().to_string(),
            project_id: Some(new.project_id),
            ..Task::default()
        };
        self.lock().tasks.push(created.clone());
        Ok(created)
    }

    async fn list_tasks(&self, query: TaskQuery) -> Result<Vec<Task>> {
        self.record(format!(
            "list_tasks:{}:{}",
            query.project_id.clone().unwrap_or_default(),
            query.status.clone().unwrap_or_default()
        ));
        let data = self.lock();
        Ok(data
            .tasks
            .iter()
            .filter(|t| {
                query
                    .project_id
                    .as_ref()
                    .map_or(true, |p| t.project_id.as_ref() == Some(p))
            })
            .filter(|t| query.status.as_ref().map_or(true, |s| &t.status == s))
            .filter(|t| {
                query.query.as_ref().map_or(true, |q| {
                    t.title.to_lowercase().contains(&q.to_lowercase())
                })
            })
            .cloned()
            .collect())
    }

    async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.record(format!("get_task:{}", task_id));
        let data = self.lock();
        data.tasks
            .iter()
            .find(|t| t.id == task_id || t.id.starts_with(task_id))
            .cloned()
            .ok_or_else(|| not_found("task", task_id))
    }

    async fn update_task(&self, task_id: &str, updates: Map<String, Value>) -> Result<Task> {
        self.record(format!(
            "update_task:{}:{}",
            task_id,
            Value::Object(updates.clone())
        ));
        let mut data = self.lock();
        if data.failing_updates.iter().any(|id| id == task_id) {
            return Err(RamorieError::Api {
                status: 500,
                message: "update failed".to_string(),
            }
            .into());
        }
        let slot = data
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| not_found("task", task_id))?;
        *slot = merge(slot, &updates)?;
        Ok(slot.clone())
    }

    async fn delete_task(&self, task_id: &str) -> Result<()> {
        self.record(format!("delete_task:{}", task_id));
        self.lock().tasks.retain(|t| t.id != task_id);
        Ok(())
    }

    async fn start_task(&self, task_id: &str) -> Result<()> {
        self.record(format!("start_task:{}", task_id));
        let mut data = self.lock();
        data.active_task = Some(task_id.to_string());
        Ok(())
    }

    async fn complete_task(&self, task_id: &str) -> Result<()> {
        self.record(format!("complete_task:{}", task_id));
        Ok(())
    }

    async fn stop_task(&self, task_id: &str) -> Result<()> {
        self.record(format!("stop_task:{}", task_id));
        self.lock().active_task = None;
        Ok(())
    }

    async fn get_active_task(&self) -> Result<Option<Task>> {
        self.record("get_active_task");
        let data = self.lock();
        Ok(data
            .active_task
            .as_ref()
            .and_then(|id| data.tasks.iter().find(|t| &t.id == id).cloned()))
    }

    async fn create_annotation(&self, task_id: &str, content: &str) -> Result<Annotation> {
        self.record(format!("create_annotation:{}:{}", task_id, content));
        Ok(Annotation {
            id: self.fresh_id("a"),
            task_id: task_id.to_string(),
            content: content.to_string(),
            created_at: None,
        })
    }

    async fn create_subtask(&self, parent_task_id: &str, description: &str) -> Result<Task> {
        self.record(format!("create_subtask:{}:{}", parent_task_id, description));
        Ok(Task {
            id: self.fresh_id("t"),
            title: description.to_string(),
            status: status::TODO.to_string(),
            parent_task_id: Some(parent_task_id.to_string()),
            ..Task::default()
        })
    }

    async fn bulk_update_status(&self, task_ids: &[String], status: &str) -> Result<()> {
        self.record(format!("bulk_update_status:{}:{}", task_ids.join(","), status));
        Ok(())
    }

    async fn analyze_task(&self, task_id: &str, analysis: Analysis) -> Result<Value> {
        self.record(format!("analyze_task:{}:{}", task_id, analysis.path_segment()));
        Ok(json!({ "task_id": task_id, "analysis": analysis.path_segment(), "findings": [] }))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.record("list_projects");
        Ok(self.lock().projects.clone())
    }

    async fn create_project(&self, name: &str, description: Option<&str>) -> Result<Project> {
        self.record(format!("create_project:{}", name));
        let created = Project {
            id: self.fresh_id("p"),
            name: name.to_string(),
            description: description.map(str::to_string),
            ..Project::default()
        };
        self.lock().projects.push(created.clone());
        Ok(created)
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.record(format!("get_project:{}", project_id));
        self.lock()
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| not_found("project", project_id))
    }

    async fn update_project(
        &self,
        project_id: &str,
        updates: Map<String, Value>,
    ) -> Result<Project> {
        self.record(format!(
            "update_project:{}:{}",
            project_id,
            Value::Object(updates.clone())
        ));
        let mut data = self.lock();
        let slot = data
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| not_found("project", project_id))?;
        *slot = merge(slot, &updates)?;
        Ok(slot.clone())
    }

    async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.record(format!("delete_project:{}", project_id));
        Ok(())
    }

    async fn set_project_active(&self, project_id: &str) -> Result<()> {
        self.record(format!("set_project_active:{}", project_id));
        for p in self.lock().projects.iter_mut() {
            p.is_active = p.id == project_id;
        }
        Ok(())
    }

    async fn create_memory(&self, project_id: &str, content: &str) -> Result<Memory> {
        self.record(format!("create_memory:{}:{}", project_id, content));
        let created = Memory {
            id: self.fresh_id("m"),
            content: content.to_string(),
            project_id: Some(project_id.to_string()),
            ..Memory::default()
        };
        self.lock().memories.push(created.clone());
        Ok(created)
    }

    async fn list_memories(&self, project_id: Option<&str>) -> Result<Vec<Memory>> {
        self.record(format!("list_memories:{}", project_id.unwrap_or_default()));
        Ok(self
            .lock()
            .memories
            .iter()
            .filter(|m| project_id.map_or(true, |p| m.project_id.as_deref() == Some(p)))
            .cloned()
            .collect())
    }

    async fn get_memory(&self, memory_id: &str) -> Result<Memory> {
        self.record(format!("get_memory:{}", memory_id));
        self.lock()
            .memories
            .iter()
            .find(|m| m.id == memory_id)
            .cloned()
            .ok_or_else(|| not_found("memory", memory_id))
    }

    async fn update_memory(&self, memory_id: &str, updates: Map<String, Value>) -> Result<Memory> {
        self.record(format!(
            "update_memory:{}:{}",
            memory_id,
            Value::Object(updates.clone())
        ));
        let mut data = self.lock();
        let slot = data
            .memories
            .iter_mut()
            .find(|m| m.id == memory_id)
            .ok_or_else(|| not_found("memory", memory_id))?;
        *slot = merge(slot, &updates)?;
        Ok(slot.clone())
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<()> {
        self.record(format!("delete_memory:{}", memory_id));
        Ok(())
    }

    async fn list_task_memories(&self, task_id: &str) -> Result<Vec<Memory>> {
        self.record(format!("list_task_memories:{}", task_id));
        Ok(Vec::new())
    }

    async fn list_memory_tasks(&self, memory_id: &str) -> Result<Vec<Task>> {
        self.record(format!("list_memory_tasks:{}", memory_id));
        Ok(Vec::new())
    }

    async fn create_memory_task_link(
        &self,
        task_id: &str,
        memory_id: &str,
        relation_type: Option<&str>,
    ) -> Result<String> {
        self.record(format!(
            "create_memory_task_link:{}:{}:{}",
            task_id,
            memory_id,
            relation_type.unwrap_or_default()
        ));
        Ok(self.lock().link_body.clone())
    }

    async fn list_contexts(&self) -> Result<Vec<Context>> {
        self.record("list_contexts");
        Ok(self.lock().contexts.clone())
    }

    async fn create_context(&self, name: &str, description: Option<&str>) -> Result<Context> {
        self.record(format!("create_context:{}", name));
        Ok(Context {
            id: self.fresh_id("c"),
            name: name.to_string(),
            description: description.map(str::to_string),
            ..Context::default()
        })
    }

    async fn use_context(&self, name: &str) -> Result<Context> {
        self.record(format!("use_context:{}", name));
        let mut data = self.lock();
        let mut found = None;
        for ctx in data.contexts.iter_mut() {
            ctx.is_active = ctx.name == name;
            if ctx.is_active {
                found = Some(ctx.clone());
            }
        }
        found.ok_or_else(|| not_found("context", name))
    }

    async fn list_context_packs(&self, query: ContextPackQuery) -> Result<ContextPackList> {
        self.record(format!(
            "list_context_packs:{}:{}",
            query.pack_type.clone().unwrap_or_default(),
            query.limit.unwrap_or_default()
        ));
        let packs = self.lock().packs.clone();
        Ok(ContextPackList {
            total: packs.len() as i64,
            context_packs: packs,
            extra: Map::new(),
        })
    }

    async fn get_context_pack(&self, pack_id: &str) -> Result<ContextPack> {
        self.record(format!("get_context_pack:{}", pack_id));
        self.lock()
            .packs
            .iter()
            .find(|p| p.id == pack_id)
            .cloned()
            .ok_or_else(|| not_found("context pack", pack_id))
    }

    async fn create_context_pack(&self, pack: NewContextPack) -> Result<ContextPack> {
        self.record(format!("create_context_pack:{}:{}", pack.name, pack.pack_type));
        let created = ContextPack {
            id: self.fresh_id("cp"),
            name: pack.name,
            pack_type: pack.pack_type,
            description: pack.description,
            status: pack.status.unwrap_or_else(|| "draft".to_string()),
            tags: pack.tags,
            extra: Map::new(),
        };
        self.lock().packs.push(created.clone());
        Ok(created)
    }

    async fn update_context_pack(
        &self,
        pack_id: &str,
        updates: Map<String, Value>,
    ) -> Result<ContextPack> {
        self.record(format!(
            "update_context_pack:{}:{}",
            pack_id,
            Value::Object(updates.clone())
        ));
        let mut data = self.lock();
        let slot = data
            .packs
            .iter_mut()
            .find(|p| p.id == pack_id)
            .ok_or_else(|| not_found("context pack", pack_id))?;
        *slot = merge(slot, &updates)?;
        Ok(slot.clone())
    }

    async fn delete_context_pack(&self, pack_id: &str) -> Result<()> {
        self.record(format!("delete_context_pack:{}", pack_id));
        Ok(())
    }

    async fn activate_context_pack(&self, pack_id: &str) -> Result<ContextPack> {
        self.record(format!("activate_context_pack:{}", pack_id));
        let mut data = self.lock();
        data.active_pack = Some(pack_id.to_string());
        data.packs
            .iter()
            .find(|p| p.id == pack_id)
            .cloned()
            .ok_or_else(|| not_found("context pack", pack_id))
    }

    async fn get_active_context_pack(&self) -> Result<Option<ContextPack>> {
        self.record("get_active_context_pack");
        let data = self.lock();
        Ok(data
            .active_pack
            .as_ref()
            .and_then(|id| data.packs.iter().find(|p| &p.id == id).cloned()))
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.record("list_organizations");
        Ok(self.lock().organizations.clone())
    }

    async fn get_organization(&self, org_id: &str) -> Result<Organization> {
        self.record(format!("get_organization:{}", org_id));
        self.lock()
            .organizations
            .iter()
            .find(|o| o.id == org_id)
            .cloned()
            .ok_or_else(|| not_found("organization", org_id))
    }

    async fn create_organization(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Organization> {
        self.record(format!("create_organization:{}", name));
        Ok(Organization {
            id: self.fresh_id("o"),
            name: name.to_string(),
            description: description.map(str::to_string),
            extra: Map::new(),
        })
    }

    async fn list_decisions(&self, query: DecisionQuery) -> Result<Vec<Decision>> {
        self.record(format!(
            "list_decisions:{}:{}",
            query.status.clone().unwrap_or_default(),
            query.area.clone().unwrap_or_default()
        ));
        Ok(self.lock().decisions.clone())
    }

    async fn get_decision(&self, decision_id: &str) -> Result<Decision> {
        self.record(format!("get_decision:{}", decision_id));
        self.lock()
            .decisions
            .iter()
            .find(|d| d.id == decision_id)
            .cloned()
            .ok_or_else(|| not_found("decision", decision_id))
    }

    async fn create_decision(&self, decision: NewDecision) -> Result<Decision> {
        self.record(format!("create_decision:{}", decision.title));
        let created = Decision {
            id: self.fresh_id("d"),
            title: decision.title,
            description: decision.description,
            status: decision.status.unwrap_or_else(|| "draft".to_string()),
            area: decision.area,
            context: decision.context,
            consequences: decision.consequences,
            extra: Map::new(),
        };
        self.lock().decisions.push(created.clone());
        Ok(created)
    }

    async fn update_decision(
        &self,
        decision_id: &str,
        updates: Map<String, Value>,
    ) -> Result<Decision> {
        self.record(format!(
            "update_decision:{}:{}",
            decision_id,
            Value::Object(updates.clone())
        ));
        let mut data = self.lock();
        let slot = data
            .decisions
            .iter_mut()
            .find(|d| d.id == decision_id)
            .ok_or_else(|| not_found("decision", decision_id))?;
        *slot = merge(slot, &updates)?;
        Ok(slot.clone())
    }

    async fn delete_decision(&self, decision_id: &str) -> Result<()> {
        self.record(format!("delete_decision:{}", decision_id));
        Ok(())
    }

    async fn request(&self, method: Method, path: &str, _body: Option<Value>) -> Result<String> {
        self.record(format!("request:{}:{}", method, path));
        self.lock()
            .raw
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("endpoint", path))
    }
}
