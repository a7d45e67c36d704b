//! Locally persisted active-project and active-context selection
//!
//! The store is loaded once at start-up and handed to the dispatcher inside
//! [`crate::tools::ToolContext`]. Handlers read it freely; only the
//! `set_active_project` and `set_active_context` tools write to it.

use crate::error::{RamorieError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Serialized form of the state file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalState {
    /// Identifier of the project used when a tool call names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_project_id: Option<String>,

    /// Identifier of the context last selected with `set_active_context`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_context_id: Option<String>,
}

/// Shared, file-backed holder of [`LocalState`]
#[derive(Debug)]
pub struct StateStore {
    path: Option<PathBuf>,
    inner: RwLock<LocalState>,
}

impl StateStore {
    /// Load state from `path`; a missing file yields empty state
    ///
    /// # Errors
    ///
    /// Returns a state error if the file exists but is unreadable or is not
    /// valid JSON.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                RamorieError::State(format!("Failed to read {}: {}", path.display(), e))
            })?;
            if contents.trim().is_empty() {
                LocalState::default()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    RamorieError::State(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
        } else {
            tracing::debug!("No state file at {}, starting empty", path.display());
            LocalState::default()
        };

        Ok(Self {
            path: Some(path),
            inner: RwLock::new(state),
        })
    }

    /// Purely in-memory store that never touches disk
    pub fn in_memory(state: LocalState) -> Self {
        Self {
            path: None,
            inner: RwLock::new(state),
        }
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> LocalState {
        self.inner.read().await.clone()
    }

    pub async fn active_project_id(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .active_project_id
            .clone()
            .filter(|id| !id.trim().is_empty())
    }

    pub async fn active_context_id(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .active_context_id
            .clone()
            .filter(|id| !id.trim().is_empty())
    }

    /// Record and persist the active project
    ///
    /// # Examples
    ///
    /// ```
    /// use ramorie::state::StateStore;
    ///
    /// # tokio_test::block_on(async {
    /// let store = StateStore::default();
    /// store.set_active_project("p-1").await.unwrap();
    /// assert_eq!(store.active_project_id().await.as_deref(), Some("p-1"));
    /// # });
    /// ```
    pub async fn set_active_project(&self, project_id: impl Into<String>) -> Result<()> {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        next.active_project_id = Some(project_id.into());
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    /// Record and persist the active context
    pub async fn set_active_context(&self, context_id: impl Into<String>) -> Result<()> {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        next.active_context_id = Some(context_id.into());
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    /// Write `state` to the backing file; memory is only updated on success
    async fn persist(&self, state: &LocalState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RamorieError::State(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let data = serde_json::to_string_pretty(state)?;
        tokio::fs::write(path, data).await.map_err(|e| {
            RamorieError::State(format!("Failed to write {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Persisted local state");
        Ok(())
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::in_memory(LocalState::default())
    }
}
