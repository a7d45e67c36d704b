//! MCP protocol types and JSON-RPC 2.0 primitives
//!
//! This module defines the wire types served by the Ramorie tool server for
//! Model Context Protocol revision **2025-11-25**. Struct fields are
//! `camelCase` on the wire via `#[serde(rename_all = "camelCase")]` unless a
//! `_meta` override is required. `Option<>` fields omit their key from JSON
//! when `None`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Protocol version constants
// ---------------------------------------------------------------------------

/// Protocol revision answered when the client does not request one.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-11-25";

/// JSON-RPC protocol tag carried by every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "ramorie";

// ---------------------------------------------------------------------------
// JSON-RPC method constants
// ---------------------------------------------------------------------------

/// Lifecycle: client sends `initialize` to open a session.
pub const METHOD_INITIALIZE: &str = "initialize";
/// Lifecycle: client sends `notifications/initialized` after the server ACKs.
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
/// Keepalive ping.
pub const METHOD_PING: &str = "ping";
/// List the tool catalogue.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// Invoke a named tool.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Prefix shared by every notification method.
pub const NOTIFICATION_PREFIX: &str = "notifications/";

// ---------------------------------------------------------------------------
// JSON-RPC error codes
// ---------------------------------------------------------------------------

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// MCP: privileged method called before the handshake completed.
pub const SERVER_NOT_INITIALIZED: i64 = -32002;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 wire types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request object.
///
/// `id` is `None` for notifications. Decoding is lenient: a missing
/// `jsonrpc` tag or `method` decodes to an empty string so routing can
/// answer with the proper error instead of a parse failure.
///
/// # Examples
///
/// ```
/// use ramorie::mcp::types::JsonRpcRequest;
///
/// let req: JsonRpcRequest =
///     serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
/// assert_eq!(req.method, "ping");
/// assert_eq!(req.id, Some(serde_json::json!(1)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version identifier; expected to be `"2.0"`.
    #[serde(default)]
    pub jsonrpc: String,
    /// Request correlation identifier. Present for requests, absent for notifications.
    /// A present `null` decodes to `Some(Value::Null)` and is echoed back.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    /// The method name to invoke.
    #[serde(default)]
    pub method: String,
    /// Optional method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Whether this message expects no response.
    pub fn is_notification(&self) -> bool {
        self.method.starts_with(NOTIFICATION_PREFIX)
    }
}

/// Keep any value whose key is present, `null` included.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A JSON-RPC 2.0 response object.
///
/// Exactly one of `result` or `error` is present; use [`JsonRpcResponse::success`]
/// and [`JsonRpcResponse::failure`] rather than building one by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version identifier; always `"2.0"`.
    pub jsonrpc: String,
    /// Mirrors the `id` from the corresponding request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Successful result value; mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object; mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// A success response echoing `id`.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// An error response echoing `id`.
    pub fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// A JSON-RPC 2.0 error object.
///
/// Implements `Display` as `"JSON-RPC error {code}: {message}"`.
///
/// # Examples
///
/// ```
/// use ramorie::mcp::types::JsonRpcError;
///
/// let e = JsonRpcError::method_not_found();
/// assert_eq!(e.to_string(), "JSON-RPC error -32601: Method not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code as defined by JSON-RPC 2.0 or MCP.
    pub code: i64,
    /// Human-readable error description.
    pub message: String,
    /// Optional additional error context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i64, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error")
    }

    pub fn method_not_found() -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found")
    }

    pub fn invalid_params() -> Self {
        Self::new(INVALID_PARAMS, "Invalid params")
    }

    pub fn internal_error() -> Self {
        Self::new(INTERNAL_ERROR, "Internal error")
    }

    pub fn server_not_initialized() -> Self {
        Self::new(SERVER_NOT_INITIALIZED, "Server not initialized")
    }

    /// Attach diagnostic detail under `data`.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

// ---------------------------------------------------------------------------
// Initialize types
// ---------------------------------------------------------------------------

/// Identifies a client or server implementation by name and version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    /// Short name of the implementation (e.g. `"ramorie"`).
    #[serde(default)]
    pub name: String,
    /// Semantic version string.
    #[serde(default)]
    pub version: String,
}

/// The capabilities this server advertises; only tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Server exposes tools via `tools/list` and `tools/call`.
    pub tools: Value,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Value::Object(serde_json::Map::new()),
        }
    }
}

/// Parameters sent by the client in the `initialize` request.
///
/// Every field is optional so that a sparse or malformed handshake still
/// negotiates the default version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializeParams {
    /// The protocol version the client wishes to use.
    pub protocol_version: Option<String>,
    /// Capabilities advertised by the client; accepted but not interpreted.
    pub capabilities: Option<Value>,
    /// Information identifying the client implementation.
    pub client_info: Option<Implementation>,
}

/// Response returned by the server to an `initialize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    /// The protocol version the server has selected for this session.
    pub protocol_version: String,
    /// Capabilities advertised by this server.
    pub capabilities: ServerCapabilities,
    /// Information identifying this server implementation.
    pub server_info: Implementation,
}

// ---------------------------------------------------------------------------
// Tool types
// ---------------------------------------------------------------------------

/// Behavioral hints for tool display and safety classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    /// When `true`, the tool only reads state and never mutates it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    /// When `true`, the tool may make irreversible changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    /// When `true`, repeated identical calls have the effect of one call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
}

/// A tool as listed by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    /// Unique name of the tool within the server.
    pub name: String,
    /// Human-readable description of the tool's purpose.
    pub description: String,
    /// JSON Schema describing the tool's input parameters.
    pub input_schema: Value,
    /// Behavioral hints for display and safety classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

/// Response to a `tools/list` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResponse {
    /// The full catalogue, in canonical order.
    pub tools: Vec<McpTool>,
    /// Catalogue metadata such as its version.
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Parameters for a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolParams {
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments to pass to the tool; `null` and absent both mean none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Map<String, Value>>,
}

/// Result payload of a `tools/call` request.
///
/// Always delivered inside a JSON-RPC success response; `is_error` carries
/// application-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResponse {
    /// The content items produced by the tool.
    pub content: Vec<ToolResponseContent>,
    /// `true` when the tool failed; the text block then holds the message.
    pub is_error: bool,
    /// Object-shaped result; present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Map<String, Value>>,
}

/// A single content item in a tool response.
///
/// Discriminated by the `"type"` field on the wire.
///
/// # Examples
///
/// ```
/// use ramorie::mcp::types::ToolResponseContent;
///
/// let c = ToolResponseContent::Text { text: "hello".to_string() };
/// let json = serde_json::to_value(&c).unwrap();
/// assert_eq!(json["type"], "text");
/// assert_eq!(json["text"], "hello");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolResponseContent {
    /// Plain text output.
    Text {
        /// The text content.
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_params_or_id() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(req.id.is_none());
        assert!(req.params.is_none());
        assert!(req.is_notification());
    }

    #[test]
    fn test_request_null_id_is_kept() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(Value::Null));

        let resp = JsonRpcResponse::success(req.id, serde_json::json!({}));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""id":null"#), "{json}");
    }

    #[test]
    fn test_request_missing_method_decodes_empty() {
        let req: JsonRpcRequest = serde_json::from_str(r#"{"jsonrpc":"2.0","id":7}"#).unwrap();
        assert_eq!(req.method, "");
        assert!(!req.is_notification());
    }

    #[test]
    fn test_request_rejects_non_string_method() {
        let parsed = serde_json::from_str::<JsonRpcRequest>(r#"{"id":1,"method":42}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_success_response_omits_error() {
        let resp = JsonRpcResponse::success(Some(json!("abc")), json!({}));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": "abc", "result": {}}));
    }

    #[test]
    fn test_failure_response_without_id() {
        let resp = JsonRpcResponse::failure(None, JsonRpcError::parse_error());
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "error": {"code": -32700, "message": "Parse error"}})
        );
    }

    #[test]
    fn test_error_constructors_use_fixed_codes() {
        assert_eq!(JsonRpcError::parse_error().code, -32700);
        assert_eq!(JsonRpcError::method_not_found().code, -32601);
        assert_eq!(JsonRpcError::invalid_params().code, -32602);
        assert_eq!(JsonRpcError::internal_error().code, -32603);
        assert_eq!(JsonRpcError::server_not_initialized().code, -32002);
        assert_eq!(
            JsonRpcError::server_not_initialized().message,
            "Server not initialized"
        );
    }

    #[test]
    fn test_initialize_params_tolerate_missing_fields() {
        let params: InitializeParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.protocol_version.is_none());

        let params: InitializeParams = serde_json::from_value(json!({
            "protocolVersion": "2024-01-01",
            "capabilities": {"roots": {}},
            "clientInfo": {"name": "agent", "version": "1"}
        }))
        .unwrap();
        assert_eq!(params.protocol_version.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_initialize_response_wire_shape() {
        let resp = InitializeResponse {
            protocol_version: "2025-11-25".to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: "0.3.0".to_string(),
            },
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["capabilities"], json!({"tools": {}}));
        assert_eq!(value["serverInfo"]["name"], json!("ramorie"));
        assert_eq!(value["protocolVersion"], json!("2025-11-25"));
    }

    #[test]
    fn test_call_tool_params_accept_null_arguments() {
        let params: CallToolParams =
            serde_json::from_value(json!({"name": "get_stats", "arguments": null})).unwrap();
        assert!(params.arguments.is_none());
    }

    #[test]
    fn test_call_tool_params_reject_array_arguments() {
        let parsed =
            serde_json::from_value::<CallToolParams>(json!({"name": "x", "arguments": [1]}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_call_tool_response_error_branch_has_no_structured_content() {
        let resp = CallToolResponse {
            content: vec![ToolResponseContent::Text {
                text: "boom".to_string(),
            }],
            is_error: true,
            structured_content: None,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["isError"], json!(true));
        assert!(value.get("structuredContent").is_none());
    }
}
