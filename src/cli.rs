//! Command-line interface definition for Ramorie
//!
//! This module defines the CLI structure using clap's derive API. The only
//! command family exposed is `mcp`, which serves or describes the agent
//! tool server.

use crate::commands::mcp::McpCommands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ramorie - agent tool server for tasks, projects, and memories
#[derive(Parser, Debug, Clone)]
#[command(name = "ramorie")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to ~/.ramorie/config.yaml)
    #[arg(short, long, env = "RAMORIE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Ramorie
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Agent tool server (Model Context Protocol over stdio)
    Mcp {
        /// MCP subcommand
        #[command(subcommand)]
        command: McpCommands,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            api_url: None,
            verbose: false,
            command: Commands::Mcp {
                command: McpCommands::Serve,
            },
        }
    }
}
