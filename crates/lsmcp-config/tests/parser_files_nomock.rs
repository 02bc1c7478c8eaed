//! No-mock parser tests against real files on disk.
//!
//! Covers:
//! - Vendor-shaped configuration files (Claude, VS Code, Zed)
//! - Read failures versus parse failures
//! - Settings resolution through the environment variable

use lsmcp_common::TransportKind;
use lsmcp_config::{
    load_settings, ConfigError, ConfigParser, SchemaKey, SettingsOptions, SettingsSource,
    SyntaxMode,
};
use proptest::prelude::*;
use std::fs;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn claude_desktop_config() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "claude_desktop_config.json",
        r#"{
  "mcpServers": {
    "context7": {
      "command": "npx",
      "args": ["-y", "@upstash/context7-mcp@1.0.0", "--api-key", "TOKEN123"]
    },
    "remote": {
      "url": "https://mcp.example.com/mcp",
      "headers": {"Authorization": "Bearer sk-1234567890abcdef"}
    }
  }
}"#,
    );

    let parsed = ConfigParser::new(&path).parse_file().expect("readable");
    assert!(parsed.valid);
    assert_eq!(parsed.syntax, Some(SyntaxMode::Strict));
    assert_eq!(parsed.schema_key, Some(SchemaKey::McpServers));

    let context7 = &parsed.servers["context7"];
    assert_eq!(context7.command, "npx");
    assert_eq!(context7.transport(), Some(TransportKind::Stdio));

    let remote = &parsed.servers["remote"];
    assert_eq!(remote.transport(), Some(TransportKind::Http));
    assert_eq!(
        remote.headers.as_ref().unwrap()["Authorization"],
        "Bearer sk-1234567890abcdef"
    );
}

#[test]
fn vscode_user_settings_with_comments() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "Code/User/settings.json",
        r#"{
  // editor settings live alongside MCP servers
  "editor.tabSize": 2,
  "mcp": {
    "servers": {
      "github": {
        "type": "http",
        "url": "https://api.githubcopilot.com/mcp/",
        "headers": {"Authorization": "${input:github_mcp_pat}"},
      },
    },
  },
}"#,
    );

    let parser = ConfigParser::new(&path);
    assert!(parser.is_valid_syntax());
    assert_eq!(parser.count_servers(), 1);

    let parsed = parser.parse_file().unwrap();
    assert_eq!(parsed.syntax, Some(SyntaxMode::Tolerant));
    assert_eq!(parsed.schema_key, Some(SchemaKey::NestedMcpServers));
}

#[test]
fn zed_context_servers() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        ".zed/settings.json",
        r#"{"context_servers": {"postgres": {"command": "uvx", "args": ["mcp-server-postgres"], "env": {"DB_PASSWORD": "hunter22"}}}}"#,
    );
    let parsed = ConfigParser::new(&path).parse_file().unwrap();
    assert_eq!(parsed.schema_key, Some(SchemaKey::ContextServers));
    assert_eq!(parsed.servers["postgres"].env.as_ref().unwrap()["DB_PASSWORD"], "hunter22");
}

#[test]
fn broken_file_is_readable_but_invalid() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "mcp.json", "{\"mcpServers\": {\"a\": ");
    let parsed = ConfigParser::new(&path).parse_file().expect("read succeeds");
    assert!(!parsed.valid);
    assert!(parsed.servers.is_empty());
}

#[test]
fn directory_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let err = ConfigParser::new(dir.path()).parse_file().unwrap_err();
    let ConfigError::Unreadable { path, .. } = err;
    assert_eq!(path, dir.path());
}

#[test]
fn settings_from_environment_directory() {
    let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    let dir = TempDir::new().unwrap();
    write(&dir, "settings.json", r#"{"processTimeoutMs": 1234}"#);

    let previous = std::env::var("LS_MCP_CONFIG").ok();
    std::env::set_var("LS_MCP_CONFIG", dir.path());
    let resolved = load_settings(&SettingsOptions::default());
    match previous {
        Some(value) => std::env::set_var("LS_MCP_CONFIG", value),
        None => std::env::remove_var("LS_MCP_CONFIG"),
    }

    let resolved = resolved.expect("settings load");
    assert_eq!(resolved.source, SettingsSource::Environment);
    assert_eq!(resolved.settings.process_timeout_ms, 1234);
    assert!(resolved.hash.is_some());
}

proptest! {
    #[test]
    fn parse_is_deterministic(names in proptest::collection::vec("[a-z][a-z0-9-]{0,10}", 0..6)) {
        let mut doc = serde_json::Map::new();
        for (i, name) in names.iter().enumerate() {
            doc.insert(name.clone(), serde_json::json!({"command": "node", "args": [format!("s{i}.js")]}));
        }
        let text = serde_json::json!({"mcpServers": doc}).to_string();
        let first = lsmcp_config::parse_str(&text);
        let second = lsmcp_config::parse_str(&text);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.server_count(), doc.len());
    }
}
