//! Configuration file parser.
//!
//! A file is read once, parsed strictly, and re-parsed with comment
//! tolerance only when strict parsing fails. The server map is taken from the
//! first recognized schema key that holds an object:
//!
//! 1. `servers` (VS Code workspace `mcp.json`)
//! 2. `mcp.servers` (VS Code user `settings.json`)
//! 3. `mcpServers` (Claude, Cursor, Cline, Windsurf, Gemini, ...)
//! 4. `context_servers` (Zed)
//!
//! Keys are never merged. Parsing never fails past the read: an unparsable
//! file is reported as invalid with no servers.

use crate::jsonc;
use crate::record::ServerRecord;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors surfaced by the parser. Only the read itself can fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for lsmcp_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Unreadable { path, source } => lsmcp_common::Error::ConfigUnreadable {
                path,
                message: source.to_string(),
            },
        }
    }
}

/// Which parse attempt accepted the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxMode {
    Strict,
    Tolerant,
}

/// Recognized locations of the server map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchemaKey {
    #[serde(rename = "servers")]
    Servers,
    #[serde(rename = "mcp.servers")]
    NestedMcpServers,
    #[serde(rename = "mcpServers")]
    McpServers,
    #[serde(rename = "context_servers")]
    ContextServers,
}

impl SchemaKey {
    /// Lookup order; the first present key wins.
    pub const PRIORITY: [SchemaKey; 4] = [
        SchemaKey::Servers,
        SchemaKey::NestedMcpServers,
        SchemaKey::McpServers,
        SchemaKey::ContextServers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKey::Servers => "servers",
            SchemaKey::NestedMcpServers => "mcp.servers",
            SchemaKey::McpServers => "mcpServers",
            SchemaKey::ContextServers => "context_servers",
        }
    }

    /// The object stored under this key, if the document has one.
    pub fn locate<'a>(&self, document: &'a Value) -> Option<&'a Map<String, Value>> {
        let value = match self {
            SchemaKey::Servers => document.get("servers"),
            SchemaKey::NestedMcpServers => document.get("mcp").and_then(|m| m.get("servers")),
            SchemaKey::McpServers => document.get("mcpServers"),
            SchemaKey::ContextServers => document.get("context_servers"),
        };
        value.and_then(Value::as_object)
    }
}

/// The four recognized schema keys, in priority order.
pub fn supported_config_keys() -> Vec<&'static str> {
    SchemaKey::PRIORITY.iter().map(SchemaKey::as_str).collect()
}

/// Result of parsing one configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    /// Parsed document; `None` when neither parse succeeded.
    pub raw: Option<Value>,
    /// True when the top level is a JSON object or array.
    pub valid: bool,
    pub syntax: Option<SyntaxMode>,
    /// Key the servers were taken from.
    pub schema_key: Option<SchemaKey>,
    /// Servers in file order.
    pub servers: IndexMap<String, ServerRecord>,
}

impl ParsedConfig {
    fn invalid(raw: Option<Value>, syntax: Option<SyntaxMode>) -> Self {
        ParsedConfig {
            raw,
            valid: false,
            syntax,
            schema_key: None,
            servers: IndexMap::new(),
        }
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }
}

/// Parse configuration text. Never fails.
pub fn parse_str(contents: &str) -> ParsedConfig {
    let (document, syntax) = match serde_json::from_str::<Value>(contents) {
        Ok(value) => (value, SyntaxMode::Strict),
        Err(strict_err) => match jsonc::parse_tolerant(contents) {
            Ok(value) => {
                trace!(error = %strict_err, "strict parse failed, comment-tolerant parse accepted");
                (value, SyntaxMode::Tolerant)
            }
            Err(err) => {
                debug!(error = %err, "configuration text is not JSON or JSONC");
                return ParsedConfig::invalid(None, None);
            }
        },
    };

    if !(document.is_object() || document.is_array()) {
        return ParsedConfig::invalid(Some(document), Some(syntax));
    }

    let located = SchemaKey::PRIORITY
        .iter()
        .find_map(|key| key.locate(&document).map(|map| (*key, map)));

    let (schema_key, servers) = match located {
        Some((key, map)) => {
            let servers = map
                .iter()
                .filter_map(|(name, entry)| {
                    ServerRecord::from_value(name, entry).map(|r| (name.clone(), r))
                })
                .collect();
            (Some(key), servers)
        }
        None => (None, IndexMap::new()),
    };

    ParsedConfig {
        raw: Some(document),
        valid: true,
        syntax: Some(syntax),
        schema_key,
        servers,
    }
}

/// Parser bound to one file path.
#[derive(Debug, Clone)]
pub struct ConfigParser {
    path: PathBuf,
}

impl ConfigParser {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. Fails only when the file cannot be read.
    pub fn parse_file(&self) -> Result<ParsedConfig, ConfigError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Unreadable {
                path: self.path.clone(),
                source,
            })?;
        let parsed = parse_str(&contents);
        debug!(
            path = %self.path.display(),
            valid = parsed.valid,
            servers = parsed.server_count(),
            schema_key = parsed.schema_key.map(|k| k.as_str()).unwrap_or("-"),
            "parsed configuration file"
        );
        Ok(parsed)
    }

    /// Whether the file parses (strictly or tolerantly) into a container.
    pub fn is_valid_syntax(&self) -> bool {
        self.parse_file().map(|p| p.valid).unwrap_or(false)
    }

    /// Number of declared servers; 0 on any failure.
    pub fn count_servers(&self) -> usize {
        self.parse_file().map(|p| p.server_count()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supported_keys_order() {
        assert_eq!(
            supported_config_keys(),
            vec!["servers", "mcp.servers", "mcpServers", "context_servers"]
        );
    }

    #[test]
    fn test_each_schema_key_yields_one_record() {
        let docs = [
            (r#"{"servers": {"one": {"command": "a"}}}"#, SchemaKey::Servers),
            (r#"{"mcp": {"servers": {"one": {"command": "a"}}}}"#, SchemaKey::NestedMcpServers),
            (r#"{"mcpServers": {"one": {"command": "a"}}}"#, SchemaKey::McpServers),
            (r#"{"context_servers": {"one": {"command": "a"}}}"#, SchemaKey::ContextServers),
        ];
        for (text, key) in docs {
            let parsed = parse_str(text);
            assert!(parsed.valid, "{text}");
            assert_eq!(parsed.schema_key, Some(key));
            assert_eq!(parsed.server_count(), 1);
            assert_eq!(parsed.servers["one"].name, "one");
        }
    }

    #[test]
    fn test_first_key_wins_without_merge() {
        let parsed = parse_str(
            r#"{"mcpServers": {"b": {"command": "b"}}, "servers": {"a": {"command": "a"}}}"#,
        );
        assert_eq!(parsed.schema_key, Some(SchemaKey::Servers));
        assert_eq!(parsed.servers.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_non_object_key_is_not_present() {
        let parsed = parse_str(r#"{"servers": [], "mcpServers": {"x": {"command": "x"}}}"#);
        assert_eq!(parsed.schema_key, Some(SchemaKey::McpServers));
        assert_eq!(parsed.server_count(), 1);
    }

    #[test]
    fn test_empty_server_map_is_present() {
        let parsed = parse_str(r#"{"servers": {}, "mcpServers": {"x": {"command": "x"}}}"#);
        assert_eq!(parsed.schema_key, Some(SchemaKey::Servers));
        assert_eq!(parsed.server_count(), 0);
    }

    #[test]
    fn test_jsonc_accepted_in_tolerant_mode() {
        let parsed = parse_str(
            "{\n  // zed settings\n  \"context_servers\": {\n    \"db\": {\"command\": \"uvx\", \"args\": [\"mcp-db\",],},\n  },\n}",
        );
        assert!(parsed.valid);
        assert_eq!(parsed.syntax, Some(SyntaxMode::Tolerant));
        assert_eq!(parsed.servers["db"].args, vec!["mcp-db"]);
    }

    #[test]
    fn test_unparsable_text_is_invalid() {
        let parsed = parse_str("{ this is not json");
        assert!(!parsed.valid);
        assert!(parsed.raw.is_none());
        assert!(parsed.servers.is_empty());
    }

    #[test]
    fn test_scalar_top_level_is_invalid() {
        let parsed = parse_str("42");
        assert!(!parsed.valid);
        assert_eq!(parsed.raw, Some(json!(42)));
        assert!(parsed.servers.is_empty());
    }

    #[test]
    fn test_array_top_level_is_valid_with_no_servers() {
        let parsed = parse_str("[1, 2]");
        assert!(parsed.valid);
        assert_eq!(parsed.schema_key, None);
        assert!(parsed.servers.is_empty());
    }

    #[test]
    fn test_unrecognized_schema_yields_zero_servers() {
        let parsed = parse_str(r#"{"editor.fontSize": 14}"#);
        assert!(parsed.valid);
        assert_eq!(parsed.server_count(), 0);
    }

    #[test]
    fn test_file_order_preserved() {
        let parsed = parse_str(
            r#"{"mcpServers": {"zeta": {"command": "z"}, "alpha": {"command": "a"}, "mid": {"command": "m"}}}"#,
        );
        assert_eq!(
            parsed.servers.keys().collect::<Vec<_>>(),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let parsed = parse_str(r#"{"mcpServers": {"a": "npx a", "b": {"command": "b"}}}"#);
        assert_eq!(parsed.servers.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = r#"{"mcpServers": {"a": {"command": "npx", "args": ["-y", "a@1"], "env": {"K": "v"}}}}"#;
        assert_eq!(parse_str(text), parse_str(text));
    }

    #[test]
    fn test_missing_file_is_distinct_error() {
        let parser = ConfigParser::new("/definitely/not/here/mcp.json");
        let err = parser.parse_file().unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
        assert!(!parser.is_valid_syntax());
        assert_eq!(parser.count_servers(), 0);

        let common: lsmcp_common::Error = err.into();
        assert_eq!(common.code(), 20);
    }
}
