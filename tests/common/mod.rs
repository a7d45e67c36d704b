//! Shared helpers for integration tests

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use ramorie::client::http::HttpDomainClient;
use ramorie::config::{ApiConfig, McpConfig};
use ramorie::state::StateStore;
use ramorie::tools::{build_catalogue, Dispatcher, ToolContext};
use ramorie::McpServer;

/// Handshake lines every session test starts with
#[allow(dead_code)]
pub const HANDSHAKE: [&str; 2] = [
    r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2025-11-25","capabilities":{},"clientInfo":{"name":"tests","version":"1"}}}"#,
    r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
];

/// A server wired to `api_url`, with state persisted under `dir`
#[allow(dead_code)]
pub fn server_for(api_url: &str, dir: &TempDir) -> (McpServer, Arc<StateStore>) {
    let client = HttpDomainClient::new(&ApiConfig {
        url: api_url.to_string(),
        timeout_seconds: 5,
    })
    .expect("client builds");
    let state = Arc::new(StateStore::load(dir.path().join("state.json")).expect("state loads"));
    let context = ToolContext::new(Arc::new(client), state.clone());
    let dispatcher = Dispatcher::new(Arc::new(build_catalogue()), context);
    (McpServer::new(dispatcher, &McpConfig::default()), state)
}

/// Feed `lines` to the server and decode every response line
#[allow(dead_code)]
pub async fn run_lines(server: &McpServer, lines: &[String]) -> Vec<Value> {
    let mut input = lines.join("\n");
    input.push('\n');
    let mut output = Vec::new();
    server
        .serve(input.as_bytes(), &mut output)
        .await
        .expect("serve completes");
    String::from_utf8(output)
        .expect("utf-8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("response is json"))
        .collect()
}

/// Handshake followed by `requests`
#[allow(dead_code)]
pub fn session(requests: &[String]) -> Vec<String> {
    HANDSHAKE
        .iter()
        .map(|l| l.to_string())
        .chain(requests.iter().cloned())
        .collect()
}

/// A `tools/call` request line
#[allow(dead_code)]
pub fn call(id: i64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string()
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
