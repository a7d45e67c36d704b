//! Canonical tool catalogue assembly
//!
//! The catalogue is versioned as a whole. Areas register in a fixed order,
//! which is also the `tools/list` order.

use super::{contexts, decisions, memories, organizations, packs, projects, reports, tasks};
use super::ToolRegistry;

/// Version advertised in `tools/list` under `_meta.catalogueVersion`
pub const CATALOGUE_VERSION: &str = "2025.11";

/// Builder for the tool registry
///
/// # Examples
///
/// ```
/// use ramorie::tools::registry_builder::ToolRegistryBuilder;
///
/// let registry = ToolRegistryBuilder::new().build();
/// assert_eq!(registry.descriptors()[0].name, "create_task");
/// assert!(registry.get("export_project").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ToolRegistryBuilder {
    version: String,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self {
            version: CATALOGUE_VERSION.to_string(),
        }
    }

    /// Override the advertised catalogue version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Build the registry with every area registered
    pub fn build(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new(self.version.clone());
        tasks::register(&mut registry);
        projects::register(&mut registry);
        memories::register(&mut registry);
        reports::register(&mut registry);
        contexts::register(&mut registry);
        packs::register(&mut registry);
        organizations::register(&mut registry);
        decisions::register(&mut registry);
        tracing::debug!(
            tools = registry.len(),
            version = %self.version,
            "Tool catalogue built"
        );
        registry
    }
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The canonical catalogue
pub fn build_catalogue() -> ToolRegistry {
    ToolRegistryBuilder::new().build()
}
