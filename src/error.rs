//! Error types for Ramorie
//!
//! This module defines the application-tier error type used by the tool
//! handlers, the Domain Client, configuration loading, and the serving loop,
//! using `thiserror` for ergonomic error handling.
//!
//! Protocol-tier failures (parse errors, unknown methods, session gating) are
//! not represented here; they are JSON-RPC values built in
//! [`crate::mcp::types::JsonRpcError`].

use thiserror::Error;

/// Main error type for Ramorie operations
///
/// Tool handlers return these through [`Result`]; the dispatcher turns the
/// `Display` text into the soft-failure message of a `tools/call` envelope,
/// so every variant renders as a sentence an agent can act on.
#[derive(Error, Debug)]
pub enum RamorieError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tool argument was missing, empty, or of the wrong shape
    #[error("{0}")]
    InvalidArgument(String),

    /// The requested tool is not part of the catalogue
    #[error("tool not implemented: {0}")]
    ToolNotImplemented(String),

    /// A name, identifier, or prefix matched nothing
    #[error("{kind} not found: {reference}")]
    NotFound {
        /// Entity kind (e.g. `"project"`)
        kind: &'static str,
        /// The reference the caller supplied
        reference: String,
    },

    /// A name or identifier prefix matched more than one candidate
    #[error("{kind} reference '{reference}' is ambiguous ({matches} matches), be more specific")]
    Ambiguous {
        /// Entity kind (e.g. `"project"`)
        kind: &'static str,
        /// The reference the caller supplied
        reference: String,
        /// Number of candidates that matched
        matches: usize,
    },

    /// No project was given and none is marked active
    #[error("no active project: pass a project or call set_active_project first")]
    NoActiveProject,

    /// The REST backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error text returned by the backend
        message: String,
    },

    /// The REST backend answered with a body that could not be decoded
    #[error("Invalid response from API: {0}")]
    InvalidResponse(String),

    /// Local active-project/active-context state could not be read or written
    #[error("State error: {0}")]
    State(String),

    /// An input line exceeded the configured framing ceiling
    #[error("Input line exceeds the maximum of {limit} bytes")]
    LineTooLong {
        /// Configured ceiling in bytes
        limit: usize,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RamorieError {
    /// Shorthand for the "`<key>` is required" argument error
    pub fn required(key: &str) -> Self {
        RamorieError::InvalidArgument(format!("{} is required", key))
    }
}

/// Result type alias for Ramorie operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
