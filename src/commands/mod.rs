//! Command handlers for the CLI
//!
//! - `mcp` -- serve the tool protocol or print the catalogue

pub mod mcp;
