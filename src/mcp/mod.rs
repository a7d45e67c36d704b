//! Model Context Protocol tool server
//!
//! - `types`     -- JSON-RPC 2.0 wire types and MCP payloads
//! - `session`   -- handshake state machine
//! - `normalize` -- structured result shaping and `tools/call` envelopes
//! - `server`    -- line-delimited serving loop and method routing

pub mod normalize;
pub mod server;
pub mod session;
pub mod types;

pub use server::McpServer;
pub use session::{Session, SessionState};
