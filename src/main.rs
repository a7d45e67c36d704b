//! Ramorie - agent tool server
//!
//! Main entry point for the `ramorie` binary.

use anyhow::Result;

use ramorie::cli::{Cli, Commands};
use ramorie::commands;
use ramorie::config::{default_config_path, Config};
use ramorie::logging::init_logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli
        .config
        .clone()
        .or_else(default_config_path)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let config = Config::load(&config_path, &cli)?;

    init_logging(&config.logging)?;
    config.validate()?;
    tracing::debug!(config = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Mcp { command } => commands::mcp::handle_mcp(command, &config).await,
    }
}
