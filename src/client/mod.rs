//! Domain Client boundary
//!
//! Tool handlers never talk to the backend directly; they go through the
//! [`DomainClient`] trait. The production implementation is
//! [`http::HttpDomainClient`]; tests use the in-memory fake.

pub mod http;
pub mod models;

#[cfg(test)]
pub mod fake;

pub use http::HttpDomainClient;
pub use models::*;

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};

/// Operations the tool server consumes from the Ramorie backend
///
/// Every method either returns a value or an error whose `Display` text is
/// presented to the agent verbatim. Partial updates take a JSON map holding
/// only the fields to change.
#[async_trait]
pub trait DomainClient: Send + Sync {
    // Tasks

    async fn create_task(&self, task: NewTask) -> Result<Task>;
    async fn list_tasks(&self, query: TaskQuery) -> Result<Vec<Task>>;
    async fn get_task(&self, task_id: &str) -> Result<Task>;
    async fn update_task(&self, task_id: &str, updates: Map<String, Value>) -> Result<Task>;
    async fn delete_task(&self, task_id: &str) -> Result<()>;
    async fn start_task(&self, task_id: &str) -> Result<()>;
    async fn complete_task(&self, task_id: &str) -> Result<()>;
    async fn stop_task(&self, task_id: &str) -> Result<()>;
    /// The task currently being worked on, if any
    async fn get_active_task(&self) -> Result<Option<Task>>;
    async fn create_annotation(&self, task_id: &str, content: &str) -> Result<Annotation>;
    async fn create_subtask(&self, parent_task_id: &str, description: &str) -> Result<Task>;
    /// Set the status of several tasks at once; ids must be full identifiers
    async fn bulk_update_status(&self, task_ids: &[String], status: &str) -> Result<()>;
    async fn analyze_task(&self, task_id: &str, analysis: Analysis) -> Result<Value>;

    // Projects

    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn create_project(&self, name: &str, description: Option<&str>) -> Result<Project>;
    async fn get_project(&self, project_id: &str) -> Result<Project>;
    async fn update_project(&self, project_id: &str, updates: Map<String, Value>)
        -> Result<Project>;
    async fn delete_project(&self, project_id: &str) -> Result<()>;
    async fn set_project_active(&self, project_id: &str) -> Result<()>;

    // Memories

    async fn create_memory(&self, project_id: &str, content: &str) -> Result<Memory>;
    async fn list_memories(&self, project_id: Option<&str>) -> Result<Vec<Memory>>;
    async fn get_memory(&self, memory_id: &str) -> Result<Memory>;
    async fn update_memory(&self, memory_id: &str, updates: Map<String, Value>) -> Result<Memory>;
    async fn delete_memory(&self, memory_id: &str) -> Result<()>;
    async fn list_task_memories(&self, task_id: &str) -> Result<Vec<Memory>>;
    async fn list_memory_tasks(&self, memory_id: &str) -> Result<Vec<Task>>;
    /// Returns the raw response body; backends differ in what they echo back
    async fn create_memory_task_link(
        &self,
        task_id: &str,
        memory_id: &str,
        relation_type: Option<&str>,
    ) -> Result<String>;

    // Contexts

    async fn list_contexts(&self) -> Result<Vec<Context>>;
    async fn create_context(&self, name: &str, description: Option<&str>) -> Result<Context>;
    /// Mark the named context active and return it
    async fn use_context(&self, name: &str) -> Result<Context>;

    // Context packs

    async fn list_context_packs(&self, query: ContextPackQuery) -> Result<ContextPackList>;
    async fn get_context_pack(&self, pack_id: &str) -> Result<ContextPack>;
    async fn create_context_pack(&self, pack: NewContextPack) -> Result<ContextPack>;
    async fn update_context_pack(
        &self,
        pack_id: &str,
        updates: Map<String, Value>,
    ) -> Result<ContextPack>;
    async fn delete_context_pack(&self, pack_id: &str) -> Result<()>;
    async fn activate_context_pack(&self, pack_id: &str) -> Result<ContextPack>;
    async fn get_active_context_pack(&self) -> Result<Option<ContextPack>>;

    // Organizations

    async fn list_organizations(&self) -> Result<Vec<Organization>>;
    async fn get_organization(&self, org_id: &str) -> Result<Organization>;
    async fn create_organization(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Organization>;

    // Decisions

    async fn list_decisions(&self, query: DecisionQuery) -> Result<Vec<Decision>>;
    async fn get_decision(&self, decision_id: &str) -> Result<Decision>;
    async fn create_decision(&self, decision: NewDecision) -> Result<Decision>;
    async fn update_decision(
        &self,
        decision_id: &str,
        updates: Map<String, Value>,
    ) -> Result<Decision>;
    async fn delete_decision(&self, decision_id: &str) -> Result<()>;

    /// Low-level escape hatch for endpoints without a modelled operation
    ///
    /// `path` is relative to the API base and may carry a query string.
    /// Returns the response body text on success.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<String>;
}
