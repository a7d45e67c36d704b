//! REST implementation of [`DomainClient`]
//!
//! Maps each domain operation onto the Ramorie HTTP API below the configured
//! base URL. Non-success responses become [`RamorieError::Api`] carrying the
//! backend's own error text.

use super::models::*;
use super::DomainClient;
use crate::config::ApiConfig;
use crate::error::{RamorieError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

/// HTTP client for the Ramorie REST API
#[derive(Debug, Clone)]
pub struct HttpDomainClient {
    base_url: Url,
    client: Client,
}

impl HttpDomainClient {
    /// Build a client from API configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL cannot be used as a base, or
    /// an HTTP error if the underlying client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.url.trim())
            .map_err(|e| RamorieError::Config(format!("Invalid api.url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RamorieError::Config(format!(
                "api.url cannot be used as a base URL: {}",
                config.url
            ))
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ramorie/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RamorieError::from)?;

        Ok(Self { base_url, client })
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RamorieError::Config("api.url cannot be used as a base URL".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Base URL with a raw relative `path` (and optional query) appended
    fn raw_endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| RamorieError::InvalidArgument(format!("invalid path {}: {}", path, e)).into())
    }

    fn build(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "API request");
        Ok(self.client.request(method, url))
    }

    /// Fail with [`RamorieError::Api`] on non-success status
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RamorieError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        }
        .into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check(response).await?;
        let text = response.text().await.map_err(RamorieError::from)?;
        serde_json::from_str(&text).map_err(|e| RamorieError::InvalidResponse(e.to_string()).into())
    }

    /// Decode, treating `404`, an empty body, or `null` as absent
    async fn decode_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response).await?;
        let text = response.text().await.map_err(RamorieError::from)?;
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| RamorieError::InvalidResponse(e.to_string()).into())
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await.map_err(RamorieError::from)?;
        Self::decode(response).await
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await.map_err(RamorieError::from)?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Best human-readable message from an error response body
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(Value::String(text)) = map.get(key) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// `(key, value)` query pairs for the `Some` entries only
fn query_pairs<'a>(pairs: &[(&'a str, Option<&'a str>)]) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .filter_map(|(k, v)| v.map(|v| (*k, v)))
        .collect()
}

#[async_trait]
impl DomainClient for HttpDomainClient {
    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let builder = self.build(Method::POST, &["tasks"])?.json(&task);
        self.send_json(builder).await
    }

    async fn list_tasks(&self, query: TaskQuery) -> Result<Vec<Task>> {
        let tags = query.tags.join(",");
        let tags = (!tags.is_empty()).then_some(tags);
        let pairs = query_pairs(&[
            ("project_id", query.project_id.as_deref()),
            ("status", query.status.as_deref()),
            ("q", query.query.as_deref()),
            ("tags", tags.as_deref()),
        ]);
        let builder = self.build(Method::GET, &["tasks"])?.query(&pairs);
        self.send_json(builder).await
    }

    async fn get_task(&self, task_id: &str) -> Result<Task> {
        let builder = self.build(Method::GET, &["tasks", task_id])?;
        self.send_json(builder).await
    }

    async fn update_task(&self, task_id: &str, updates: Map<String, Value>) -> Result<Task> {
        let builder = self.build(Method::PATCH, &["tasks", task_id])?.json(&updates);
        self.send_json(builder).await
    }

    async fn delete_task(&self, task_id: &str) -> Result<()> {
        let builder = self.build(Method::DELETE, &["tasks", task_id])?;
        self.send_unit(builder).await
    }

    async fn start_task(&self, task_id: &str) -> Result<()> {
        let builder = self.build(Method::POST, &["tasks", task_id, "start"])?;
        self.send_unit(builder).await
    }

    async fn complete_task(&self, task_id: &str) -> Result<()> {
        let builder = self.build(Method::POST, &["tasks", task_id, "complete"])?;
        self.send_unit(builder).await
    }

    async fn stop_task(&self, task_id: &str) -> Result<()> {
        let builder = self.build(Method::POST, &["tasks", task_id, "stop"])?;
        self.send_unit(builder).await
    }

    async fn get_active_task(&self) -> Result<Option<Task>> {
        let response = self
            .build(Method::GET, &["tasks", "active"])?
            .send()
            .await
            .map_err(RamorieError::from)?;
        Self::decode_optional(response).await
    }

    async fn create_annotation(&self, task_id: &str, content: &str) -> Result<Annotation> {
        let builder = self
            .build(Method::POST, &["tasks", task_id, "annotations"])?
            .json(&json!({ "content": content }));
        self.send_json(builder).await
    }

    async fn create_subtask(&self, parent_task_id: &str, description: &str) -> Result<Task> {
        let builder = self
            .build(Method::POST, &["tasks", parent_task_id, "subtasks"])?
            .json(&json!({ "title": description }));
        self.send_json(builder).await
    }

    async fn bulk_update_status(&self, task_ids: &[String], status: &str) -> Result<()> {
        let builder = self
            .build(Method::PATCH, &["tasks", "bulk"])?
            .json(&json!({ "task_ids": task_ids, "status": status }));
        self.send_unit(builder).await
    }

    async fn analyze_task(&self, task_id: &str, analysis: Analysis) -> Result<Value> {
        let builder = self.build(
            Method::POST,
            &["ai", "tasks", task_id, analysis.path_segment()],
        )?;
        self.send_json(builder).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let builder = self.build(Method::GET, &["projects"])?;
        self.send_json(builder).await
    }

    async fn create_project(&self, name: &str, description: Option<&str>) -> Result<Project> {
        let builder = self
            .build(Method::POST, &["projects"])?
            .json(&json!({ "name": name, "description": description }));
        self.send_json(builder).await
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let builder = self.build(Method::GET, &["projects", project_id])?;
        self.send_json(builder).await
    }

    async fn update_project(
        &self,
        project_id: &str,
        updates: Map<String, Value>,
    ) -> Result<Project> {
        let builder = self
            .build(Method::PATCH, &["projects", project_id])?
            .json(&updates);
        self.send_json(builder).await
    }

    async fn delete_project(&self, project_id: &str) -> Result<()> {
        let builder = self.build(Method::DELETE, &["projects", project_id])?;
        self.send_unit(builder).await
    }

    async fn set_project_active(&self, project_id: &str) -> Result<()> {
        let builder = self.build(Method::POST, &["projects", project_id, "activate"])?;
        self.send_unit(builder).await
    }

    async fn create_memory(&self, project_id: &str, content: &str) -> Result<Memory> {
        let builder = self
            .build(Method::POST, &["memories"])?
            .json(&json!({ "project_id": project_id, "content": content }));
        self.send_json(builder).await
    }

    async fn list_memories(&self, project_id: Option<&str>) -> Result<Vec<Memory>> {
        let pairs = query_pairs(&[("project_id", project_id)]);
        let builder = self.build(Method::GET, &["memories"])?.query(&pairs);
        self.send_json(builder).await
    }

    async fn get_memory(&self, memory_id: &str) -> Result<Memory> {
        let builder = self.build(Method::GET, &["memories", memory_id])?;
        self.send_json(builder).await
    }

    async fn update_memory(&self, memory_id: &str, updates: Map<String, Value>) -> Result<Memory> {
        let builder = self
            .build(Method::PATCH, &["memories", memory_id])?
            .json(&updates);
        self.send_json(builder).await
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<()> {
        let builder = self.build(Method::DELETE, &["memories", memory_id])?;
        self.send_unit(builder).await
    }

    async fn list_task_memories(&self, task_id: &str) -> Result<Vec<Memory>> {
        let builder = self.build(Method::GET, &["tasks", task_id, "memories"])?;
        self.send_json(builder).await
    }

    async fn list_memory_tasks(&self, memory_id: &str) -> Result<Vec<Task>> {
        let builder = self.build(Method::GET, &["memories", memory_id, "tasks"])?;
        self.send_json(builder).await
    }

    async fn create_memory_task_link(
        &self,
        task_id: &str,
        memory_id: &str,
        relation_type: Option<&str>,
    ) -> Result<String> {
        let builder = self.build(Method::POST, &["memory-task-links"])?.json(&json!({
            "task_id": task_id,
            "memory_id": memory_id,
            "relation_type": relation_type,
        }));
        let response = builder.send().await.map_err(RamorieError::from)?;
        let response = Self::check(response).await?;
        Ok(response.text().await.map_err(RamorieError::from)?)
    }

    async fn list_contexts(&self) -> Result<Vec<Context>> {
        let builder = self.build(Method::GET, &["contexts"])?;
        self.send_json(builder).await
    }

    async fn create_context(&self, name: &str, description: Option<&str>) -> Result<Context> {
        let builder = self
            .build(Method::POST, &["contexts"])?
            .json(&json!({ "name": name, "description": description }));
        self.send_json(builder).await
    }

    async fn use_context(&self, name: &str) -> Result<Context> {
        let builder = self
            .build(Method::POST, &["contexts", "use"])?
            .json(&json!({ "name": name }));
        self.send_json(builder).await
    }

    async fn list_context_packs(&self, query: ContextPackQuery) -> Result<ContextPackList> {
        let limit = query.limit.filter(|l| *l > 0).map(|l| l.to_string());
        let pairs = query_pairs(&[
            ("type", query.pack_type.as_deref()),
            ("status", query.status.as_deref()),
            ("q", query.query.as_deref()),
            ("limit", limit.as_deref()),
        ]);
        let builder = self.build(Method::GET, &["context-packs"])?.query(&pairs);
        self.send_json(builder).await
    }

    async fn get_context_pack(&self, pack_id: &str) -> Result<ContextPack> {
        let builder = self.build(Method::GET, &["context-packs", pack_id])?;
        self.send_json(builder).await
    }

    async fn create_context_pack(&self, pack: NewContextPack) -> Result<ContextPack> {
        let builder = self.build(Method::POST, &["context-packs"])?.json(&pack);
        self.send_json(builder).await
    }

    async fn update_context_pack(
        &self,
        pack_id: &str,
        updates: Map<String, Value>,
    ) -> Result<ContextPack> {
        let builder = self
            .build(Method::PATCH, &["context-packs", pack_id])?
            .json(&updates);
        self.send_json(builder).await
    }

    async fn delete_context_pack(&self, pack_id: &str) -> Result<()> {
        let builder = self.build(Method::DELETE, &["context-packs", pack_id])?;
        self.send_unit(builder).await
    }

    async fn activate_context_pack(&self, pack_id: &str) -> Result<ContextPack> {
        let builder = self.build(Method::POST, &["context-packs", pack_id, "activate"])?;
        self.send_json(builder).await
    }

    async fn get_active_context_pack(&self) -> Result<Option<ContextPack>> {
        let response = self
            .build(Method::GET, &["context-packs", "active"])?
            .send()
            .await
            .map_err(RamorieError::from)?;
        Self::decode_optional(response).await
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        let builder = self.build(Method::GET, &["organizations"])?;
        self.send_json(builder).await
    }

    async fn get_organization(&self, org_id: &str) -> Result<Organization> {
        let builder = self.build(Method::GET, &["organizations", org_id])?;
        self.send_json(builder).await
    }

    async fn create_organization(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Organization> {
        let builder = self
            .build(Method::POST, &["organizations"])?
            .json(&json!({ "name": name, "description": description }));
        self.send_json(builder).await
    }

    async fn list_decisions(&self, query: DecisionQuery) -> Result<Vec<Decision>> {
        let limit = query.limit.filter(|l| *l > 0).map(|l| l.to_string());
        let pairs = query_pairs(&[
            ("status", query.status.as_deref()),
            ("area", query.area.as_deref()),
            ("limit", limit.as_deref()),
        ]);
        let builder = self.build(Method::GET, &["decisions"])?.query(&pairs);
        self.send_json(builder).await
    }

    async fn get_decision(&self, decision_id: &str) -> Result<Decision> {
        let builder = self.build(Method::GET, &["decisions", decision_id])?;
        self.send_json(builder).await
    }

    async fn create_decision(&self, decision: NewDecision) -> Result<Decision> {
        let builder = self.build(Method::POST, &["decisions"])?.json(&decision);
        self.send_json(builder).await
    }

    async fn update_decision(
        &self,
        decision_id: &str,
        updates: Map<String, Value>,
    ) -> Result<Decision> {
        let builder = self
            .build(Method::PATCH, &["decisions", decision_id])?
            .json(&updates);
        self.send_json(builder).await
    }

    async fn delete_decision(&self, decision_id: &str) -> Result<()> {
        let builder = self.build(Method::DELETE, &["decisions", decision_id])?;
        self.send_unit(builder).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<String> {
        let url = self.raw_endpoint(path)?;
        tracing::debug!(%method, %url, "API raw request");
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let response = builder.send().await.map_err(RamorieError::from)?;
        let response = Self::check(response).await?;
        Ok(response.text().await.map_err(RamorieError::from)?)
    }
}
