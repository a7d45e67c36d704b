//! Tool result normalization and `tools/call` envelope assembly
//!
//! Structured tool output on the wire is always a JSON object. Handlers
//! return a [`ToolValue`]; [`normalize`] shapes it with these rules, first
//! match wins:
//!
//! 1. null → `{"data": null}`
//! 2. sequence → `{"items": [...], "count": n}`
//! 3. mapping → unchanged
//! 4. anything else: serialize, look at the first non-whitespace character,
//!    reparse `[` as rule 2 and `{` as rule 3, otherwise `{"data": value}`.
//!
//! Raw body text is decoded as JSON first when it can be, so a body of
//! `null` or `42` keeps its type under `data`.

use super::types::{CallToolResponse, ToolResponseContent};
use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// A tool's return value before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum ToolValue {
    /// An already-decoded JSON value
    Json(Value),
    /// Body text as received from the backend, expected to hold JSON
    Text(String),
}

impl ToolValue {
    /// Convert any serializable record into a tool value
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `value` has no JSON representation,
    /// such as a map with non-string keys.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Ok(ToolValue::Json(serde_json::to_value(value)?))
    }

    /// The canonical `{"ok": true}` acknowledgement
    pub fn ok() -> Self {
        ToolValue::Json(json!({ "ok": true }))
    }

    /// Acknowledgement of a deletion
    pub fn deleted(id: &str) -> Self {
        ToolValue::Json(json!({ "ok": true, "deleted": id }))
    }
}

impl From<Value> for ToolValue {
    fn from(value: Value) -> Self {
        ToolValue::Json(value)
    }
}

fn wrap_items(items: Vec<Value>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("count".to_string(), json!(items.len()));
    map.insert("items".to_string(), Value::Array(items));
    map
}

fn wrap_data(value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("data".to_string(), value);
    map
}

/// Inspect serialized text and reparse it as a sequence or mapping
fn reparse(text: &str) -> Option<Map<String, Value>> {
    match text.trim_start().chars().next() {
        Some('[') => serde_json::from_str::<Vec<Value>>(text).ok().map(wrap_items),
        Some('{') => serde_json::from_str::<Map<String, Value>>(text).ok(),
        _ => None,
    }
}

/// Shape a tool value into a JSON object
///
/// # Examples
///
/// ```
/// use ramorie::mcp::normalize::{normalize, ToolValue};
/// use serde_json::json;
///
/// let out = normalize(ToolValue::Json(json!([1, 2, 3])));
/// assert_eq!(serde_json::Value::Object(out), json!({"items": [1, 2, 3], "count": 3}));
/// ```
pub fn normalize(value: ToolValue) -> Map<String, Value> {
    match value {
        ToolValue::Json(Value::Null) => wrap_data(Value::Null),
        ToolValue::Json(Value::Array(items)) => wrap_items(items),
        ToolValue::Json(Value::Object(map)) => map,
        ToolValue::Json(scalar) => match serde_json::to_string(&scalar) {
            Ok(text) => reparse(&text).unwrap_or_else(|| wrap_data(scalar)),
            Err(_) => wrap_data(scalar),
        },
        ToolValue::Text(text) => {
            if text.trim().is_empty() {
                return wrap_data(Value::Null);
            }
            match serde_json::from_str::<Value>(text.trim()) {
                Ok(parsed) => normalize(ToolValue::Json(parsed)),
                Err(_) => wrap_data(Value::String(text)),
            }
        }
    }
}

/// Envelope for a successful dispatch: structured object plus its text form
pub fn success_envelope(value: ToolValue) -> CallToolResponse {
    let structured = normalize(value);
    let text = serde_json::to_string(&structured).unwrap_or_else(|_| "{}".to_string());
    CallToolResponse {
        content: vec![ToolResponseContent::Text { text }],
        is_error: false,
        structured_content: Some(structured),
    }
}

/// Envelope for a failed dispatch: message text only
pub fn error_envelope(message: impl Into<String>) -> CallToolResponse {
    CallToolResponse {
        content: vec![ToolResponseContent::Text {
            text: message.into(),
        }],
        is_error: true,
        structured_content: None,
    }
}

/// Assemble the `tools/call` result from a dispatcher outcome
pub fn envelope(outcome: Result<ToolValue>) -> CallToolResponse {
    match outcome {
        Ok(value) => success_envelope(value),
        Err(err) => error_envelope(err.to_string()),
    }
}
