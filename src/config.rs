//! Configuration management for Ramorie
//!
//! This module handles loading, parsing, and validating configuration
//! from files, environment variables, and command-line arguments.

use crate::error::{RamorieError, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-user directory holding configuration and local state
pub const RAMORIE_DIR_NAME: &str = ".ramorie";

/// Smallest accepted framing ceiling for a single input line
pub const MIN_LINE_BYTES: usize = 1024 * 1024;

/// Main configuration structure for Ramorie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// REST backend configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Tool server configuration
    #[serde(default)]
    pub mcp: McpConfig,

    /// Local active-project/active-context state
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Ramorie API (including any version prefix)
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080/v1".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_seconds: default_api_timeout(),
        }
    }
}

/// Tool server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Maximum size of a single input line in bytes
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,

    /// Protocol version answered when `initialize` does not request one
    #[serde(default = "default_protocol_version")]
    pub default_protocol_version: String,
}

fn default_max_line_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_protocol_version() -> String {
    crate::mcp::types::LATEST_PROTOCOL_VERSION.to_string()
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: default_max_line_bytes(),
            default_protocol_version: default_protocol_version(),
        }
    }
}

/// Local state file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the JSON state file; defaults to `~/.ramorie/state.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StateConfig {
    /// Resolve the effective state file path
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no path is configured and the
    /// home directory cannot be determined.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        ramorie_dir()
            .map(|dir| dir.join("state.json"))
            .ok_or_else(|| {
                RamorieError::Config("Could not determine home directory".to_string()).into()
            })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level or filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable text
    #[serde(default)]
    pub json: bool,

    /// Optional file to append logs to in addition to stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "ramorie=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file: None,
        }
    }
}

/// The per-user Ramorie directory (`~/.ramorie`), if a home directory exists
pub fn ramorie_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(RAMORIE_DIR_NAME))
}

/// Default configuration file location (`~/.ramorie/config.yaml`)
pub fn default_config_path() -> Option<PathBuf> {
    ramorie_dir().map(|dir| dir.join("config.yaml"))
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged. Environment variables are applied next, then CLI flags.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &Path, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RamorieError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RamorieError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("RAMORIE_API_URL") {
            self.api.url = url;
        }

        if let Ok(timeout) = std::env::var("RAMORIE_API_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid RAMORIE_API_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(path) = std::env::var("RAMORIE_STATE_PATH") {
            self.state.path = Some(PathBuf::from(path));
        }

        if let Ok(level) = std::env::var("RAMORIE_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.api_url {
            self.api.url = url.clone();
        }
        if cli.verbose {
            self.logging.level = "ramorie=debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.api.url.trim().is_empty() {
            return Err(RamorieError::Config("api.url cannot be empty".to_string()).into());
        }

        let parsed = url::Url::parse(&self.api.url)
            .map_err(|e| RamorieError::Config(format!("Invalid api.url: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(RamorieError::Config(format!(
                "api.url must use http or https, got {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(RamorieError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.mcp.max_line_bytes < MIN_LINE_BYTES {
            return Err(RamorieError::Config(format!(
                "mcp.max_line_bytes must be at least {}",
                MIN_LINE_BYTES
            ))
            .into());
        }

        if self.mcp.default_protocol_version.trim().is_empty() {
            return Err(RamorieError::Config(
                "mcp.default_protocol_version cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
