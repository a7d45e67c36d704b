//! Ramorie - agent tool server library
//!
//! This library exposes the Ramorie task, project, and memory backend to AI
//! agents as Model Context Protocol tools served over line-delimited
//! JSON-RPC on stdio.
//!
//! # Architecture
//!
//! - `mcp`: wire types, session handshake, result shaping, and the serving loop
//! - `tools`: the versioned tool catalogue, argument coercion, and dispatch
//! - `client`: the domain client boundary and its REST implementation
//! - `state`: locally persisted active project and context
//! - `config`: configuration management and validation
//! - `logging`: tracing subscriber setup (stderr only)
//! - `error`: error types and result aliases
//! - `cli` / `commands`: command-line entry points
//!
//! # Example
//!
//! ```no_run
//! use ramorie::commands::mcp::build_server;
//! use ramorie::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!     build_server(&config)?.serve_stdio().await
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod state;
pub mod tools;

// Re-export commonly used types
pub use client::DomainClient;
pub use config::Config;
pub use error::{RamorieError, Result};
pub use mcp::McpServer;
