//! MCP subcommand handler
//!
//! `ramorie mcp serve` runs the tool server on stdin/stdout. `ramorie mcp
//! tools` prints the catalogue without starting a session.

use crate::client::http::HttpDomainClient;
use crate::config::Config;
use crate::error::{RamorieError, Result};
use crate::mcp::McpServer;
use crate::state::StateStore;
use crate::tools::{build_catalogue, Dispatcher, ToolContext, ToolKind, ToolRegistry};
use prettytable::{row, Table};
use std::sync::Arc;

/// MCP subcommand variants
#[derive(Debug, Clone, clap::Subcommand)]
pub enum McpCommands {
    /// Serve the tool protocol on stdin/stdout until end of input
    Serve,

    /// Print the tool catalogue
    Tools {
        /// Print the exact `tools/list` payload as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle MCP subcommands
///
/// # Errors
///
/// Returns an error if the server cannot be assembled, if serving fails on a
/// stream error, or if the catalogue cannot be serialized.
///
/// # Examples
///
/// ```no_run
/// use ramorie::commands::mcp::{handle_mcp, McpCommands};
/// use ramorie::Config;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config::default();
///     handle_mcp(McpCommands::Tools { json: false }, &config).await
/// }
/// ```
pub async fn handle_mcp(command: McpCommands, config: &Config) -> Result<()> {
    match command {
        McpCommands::Serve => {
            let server = build_server(config)?;
            server.serve_stdio().await
        }
        McpCommands::Tools { json } => {
            let registry = build_catalogue();
            if json {
                println!("{}", catalogue_json(&registry)?);
            } else {
                catalogue_table(&registry).printstd();
            }
            Ok(())
        }
    }
}

/// Assemble the production server: REST client, state file, catalogue
///
/// # Errors
///
/// Returns an error if the API client cannot be built or the state file
/// exists but cannot be read.
pub fn build_server(config: &Config) -> Result<McpServer> {
    let client = HttpDomainClient::new(&config.api)?;
    let state = StateStore::load(config.state.resolved_path()?)?;
    tracing::debug!(
        api_url = %client.base_url(),
        state_path = ?state.path(),
        "Assembling tool server"
    );

    let context = ToolContext::new(Arc::new(client), Arc::new(state));
    let dispatcher = Dispatcher::new(Arc::new(build_catalogue()), context);
    Ok(McpServer::new(dispatcher, &config.mcp))
}

/// Pretty JSON of the `tools/list` result
pub fn catalogue_json(registry: &ToolRegistry) -> Result<String> {
    serde_json::to_string_pretty(&registry.list_response())
        .map_err(|e| RamorieError::Serialization(e).into())
}

fn catalogue_table(registry: &ToolRegistry) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Tool", "Kind", "Description"]);
    for descriptor in registry.descriptors() {
        let kind = match descriptor.kind {
            ToolKind::Read => "read",
            ToolKind::Write => "write",
            ToolKind::Destructive => "destructive",
        };
        table.add_row(row![descriptor.name, kind, descriptor.description]);
    }
    table
}
