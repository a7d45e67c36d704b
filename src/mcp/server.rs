//! Line-delimited JSON-RPC serving loop
//!
//! [`McpServer`] reads one JSON document per input line and answers with one
//! JSON document per output line. Requests are handled strictly in order: the
//! next line is not read until the current response has been written and
//! flushed. Notifications never produce output.
//!
//! Only stream failures end the loop with an error. Malformed input,
//! sequencing violations and tool failures are all answered in-band.

use super::normalize::envelope;
use super::session::Session;
use super::types::{
    CallToolParams, Implementation, InitializeParams, InitializeResponse, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ServerCapabilities, JSONRPC_VERSION, METHOD_INITIALIZE,
    METHOD_INITIALIZED, METHOD_PING, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, SERVER_NAME,
};
use crate::config::McpConfig;
use crate::error::{RamorieError, Result};
use crate::tools::Dispatcher;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Written verbatim when a response cannot be serialized
pub const FALLBACK_RESPONSE_LINE: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#;

/// Tool server bound to one session and one dispatcher
#[derive(Debug)]
pub struct McpServer {
    session: Session,
    dispatcher: Dispatcher,
    max_line_bytes: usize,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher, config: &McpConfig) -> Self {
        Self {
            session: Session::new(config.default_protocol_version.clone()),
            dispatcher,
            max_line_bytes: config.max_line_bytes,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serve on the process stdin and stdout until end of input
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`
    ///
    /// # Errors
    ///
    /// Returns an error when reading or writing fails, or when a single
    /// line exceeds the configured ceiling. End of input is not an error.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            tools = self.dispatcher.registry().len(),
            max_line_bytes = self.max_line_bytes,
            "Tool server started"
        );

        let limit = self.max_line_bytes as u64 + 1;
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = (&mut reader)
                .take(limit)
                .read_until(b'\n', &mut line)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to read request line");
                    e
                })?;
            if read == 0 {
                break;
            }
            if line.last() != Some(&b'\n') && line.len() > self.max_line_bytes {
                tracing::error!(limit = self.max_line_bytes, "Request line too long");
                return Err(RamorieError::LineTooLong {
                    limit: self.max_line_bytes,
                }
                .into());
            }

            if let Some(response) = self.handle_line(&line).await {
                write_response(&mut writer, &response).await?;
            }
        }

        tracing::info!("Input closed, tool server stopping");
        Ok(())
    }

    /// Handle one raw input line; `None` means nothing is written
    pub async fn handle_line(&self, line: &[u8]) -> Option<JsonRpcResponse> {
        let Ok(text) = std::str::from_utf8(line) else {
            tracing::debug!("Request line is not valid UTF-8");
            return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error()));
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        match parse_request(text) {
            Some(request) => self.handle_request(request).await,
            None => {
                tracing::debug!(bytes = text.len(), "Unparseable request line");
                Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error()))
            }
        }
    }

    /// Route a decoded request; notifications yield `None`
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            tracing::warn!(
                jsonrpc = %request.jsonrpc,
                method = %request.method,
                "Unexpected jsonrpc tag"
            );
        }

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        tracing::debug!(method = %request.method, id = ?request.id, "Request received");
        let outcome = match request.method.as_str() {
            METHOD_INITIALIZE => self.initialize(request.params),
            METHOD_PING => Ok(json!({})),
            METHOD_TOOLS_LIST => self.list_tools(),
            METHOD_TOOLS_CALL => self.call_tool(request.params).await,
            _ => Err(JsonRpcError::method_not_found()),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(error) => {
                tracing::debug!(method = %request.method, code = error.code, "Request rejected");
                JsonRpcResponse::failure(request.id, error)
            }
        })
    }

    fn handle_notification(&self, method: &str) {
        if method == METHOD_INITIALIZED {
            if self.session.mark_initialized() {
                tracing::info!(
                    protocol_version = %self.session.protocol_version(),
                    "Session initialized"
                );
            }
        } else {
            tracing::debug!(method, "Ignoring notification");
        }
    }

    fn initialize(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        let protocol_version = self.session.negotiate(params.protocol_version.as_deref());
        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = %client.version,
                protocol_version = %protocol_version,
                "Initialize requested"
            );
        }

        to_result(&InitializeResponse {
            protocol_version,
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    fn list_tools(&self) -> std::result::Result<Value, JsonRpcError> {
        self.session.require_initialized()?;
        to_result(&self.dispatcher.registry().list_response())
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        self.session.require_initialized()?;
        let params = parse_call_params(params)?;
        tracing::debug!(tool = %params.name, "Tool call");
        let outcome = self
            .dispatcher
            .dispatch(&params.name, params.arguments.unwrap_or_default())
            .await;
        to_result(&envelope(outcome))
    }
}

fn parse_request(text: &str) -> Option<JsonRpcRequest> {
    let value: Value = serde_json::from_str(text).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

fn parse_call_params(params: Option<Value>) -> std::result::Result<CallToolParams, JsonRpcError> {
    match params {
        Some(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|_| JsonRpcError::invalid_params())
        }
        _ => Err(JsonRpcError::invalid_params()),
    }
}

fn to_result<T: Serialize>(value: &T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode result");
        JsonRpcError::internal_error()
    })
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = serde_json::to_string(response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize response");
        FALLBACK_RESPONSE_LINE.to_string()
    });

    let written = async {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
    .await;

    written.map_err(|e| {
        tracing::error!(error = %e, "Failed to write response");
        anyhow::Error::from(RamorieError::Io(e))
    })
}
