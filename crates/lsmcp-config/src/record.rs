//! Normalized MCP server declarations.

use indexmap::IndexMap;
use lsmcp_common::TransportKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared server type, as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerType {
    Stdio,
    Sse,
    Http,
    StreamableHttp,
}

impl ServerType {
    /// Parse one of the accepted `type` tokens. Anything else is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "stdio" => Some(ServerType::Stdio),
            "sse" => Some(ServerType::Sse),
            "http" => Some(ServerType::Http),
            "streamable-http" => Some(ServerType::StreamableHttp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerType::Stdio => "stdio",
            ServerType::Sse => "sse",
            ServerType::Http => "http",
            ServerType::StreamableHttp => "streamable-http",
        }
    }

    /// Collapse into the three reportable transports.
    pub fn transport(&self) -> TransportKind {
        match self {
            ServerType::Stdio => TransportKind::Stdio,
            ServerType::Sse => TransportKind::Sse,
            ServerType::Http | ServerType::StreamableHttp => TransportKind::Http,
        }
    }
}

/// One server entry from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    /// Key under which the server is declared.
    pub name: String,
    /// Launch command; empty when the entry only has a URL.
    pub command: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Declared or inferred type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub server_type: Option<ServerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
}

impl ServerRecord {
    /// Build a record from a command line, inferring the type.
    pub fn stdio(name: impl Into<String>, command: impl Into<String>, args: &[&str]) -> Self {
        let mut record = ServerRecord {
            name: name.into(),
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            url: None,
            server_type: None,
            env: None,
            headers: None,
        };
        record.server_type = record.infer_type();
        record
    }

    /// Normalize a raw JSON entry. Non-object entries yield `None`.
    pub fn from_value(name: &str, value: &Value) -> Option<Self> {
        let entry = value.as_object()?;

        let command = entry
            .get("command")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let args = entry
            .get("args")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(scalar_to_string).collect())
            .unwrap_or_default();
        let url = entry.get("url").and_then(Value::as_str).map(str::to_string);
        let env = entry.get("env").and_then(Value::as_object).map(string_map);
        let headers = entry.get("headers").and_then(Value::as_object).map(string_map);
        let declared = entry
            .get("type")
            .and_then(Value::as_str)
            .and_then(ServerType::from_token);

        let mut record = ServerRecord {
            name: name.to_string(),
            command,
            args,
            url,
            server_type: declared,
            env,
            headers,
        };
        if record.server_type.is_none() {
            record.server_type = record.infer_type();
        }
        Some(record)
    }

    /// Transport after normalization; `None` when nothing is analyzable.
    pub fn transport(&self) -> Option<TransportKind> {
        self.server_type.map(|t| t.transport())
    }

    /// A non-empty URL, if declared.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }

    fn infer_type(&self) -> Option<ServerType> {
        if self.url().is_some() {
            return Some(ServerType::Http);
        }

        let joined = self.args.join(" ").to_lowercase();
        if joined.contains("stdio") {
            return Some(ServerType::Stdio);
        }
        if joined.contains("http") {
            return Some(ServerType::Http);
        }
        if joined.contains("sse") {
            return Some(ServerType::Sse);
        }

        if self.has_command() {
            Some(ServerType::Stdio)
        } else {
            None
        }
    }
}

/// A record is launchable only with both a name and a command.
pub fn validate_server_config(record: &ServerRecord) -> bool {
    !record.name.is_empty() && !record.command.is_empty()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn string_map(object: &Map<String, Value>) -> IndexMap<String, String> {
    object
        .iter()
        .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
        .collect()
}
