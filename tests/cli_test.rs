//! Binary-level tests for the `ramorie` command

mod common;

use assert_cmd::Command;
use common::{temp_config_file, HANDSHAKE};
use predicates::prelude::*;
use serde_json::Value;

fn ramorie() -> Command {
    let mut cmd = Command::cargo_bin("ramorie").expect("binary builds");
    for var in [
        "RAMORIE_CONFIG",
        "RAMORIE_API_URL",
        "RAMORIE_API_TIMEOUT_SECONDS",
        "RAMORIE_STATE_PATH",
        "RAMORIE_LOG_LEVEL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_tools_json_prints_catalogue() {
    let (_dir, config) = temp_config_file("api:\n  url: http://127.0.0.1:9/v1\n");
    let output = ramorie()
        .arg("--config")
        .arg(&config)
        .args(["mcp", "tools", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tools"].as_array().unwrap().len(), 57);
    assert_eq!(value["_meta"]["catalogueVersion"], "2025.11");
}

#[test]
fn test_tools_table_lists_names() {
    let (_dir, config) = temp_config_file("{}\n");
    ramorie()
        .arg("--config")
        .arg(&config)
        .args(["mcp", "tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create_task"))
        .stdout(predicate::str::contains("delete_decision"));
}

#[test]
fn test_serve_answers_on_stdout_only() {
    let (dir, config) = temp_config_file("{}\n");
    let state = dir.path().join("state.json");
    std::fs::write(
        &config,
        format!(
            "api:\n  url: http://127.0.0.1:9/v1\nstate:\n  path: {}\n",
            state.display()
        ),
    )
    .unwrap();

    let input = format!(
        "{}\n{}\nnot json\n{}\n",
        HANDSHAKE[0],
        HANDSHAKE[1],
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#
    );
    let output = ramorie()
        .arg("--config")
        .arg(&config)
        .args(["mcp", "serve"])
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).expect("stdout carries only protocol lines"))
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["result"]["serverInfo"]["name"], "ramorie");
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert_eq!(lines[2]["id"], 2);
}

#[test]
fn test_invalid_config_fails() {
    let (_dir, config) = temp_config_file("api:\n  url: ftp://example.com\n");
    ramorie()
        .arg("--config")
        .arg(&config)
        .args(["mcp", "tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api.url"));
}

#[test]
fn test_api_url_flag_overrides_file() {
    let (_dir, config) = temp_config_file("api:\n  url: ftp://example.com\n");
    ramorie()
        .arg("--config")
        .arg(&config)
        .args(["--api-url", "http://localhost:8080/v1", "mcp", "tools", "--json"])
        .assert()
        .success();
}

#[test]
fn test_requires_subcommand() {
    ramorie()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
