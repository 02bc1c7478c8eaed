//! Transport classification for MCP servers.

use serde::{Deserialize, Serialize};

/// Normalized transport of a declared server.
///
/// The `streamable-http` declaration collapses into [`TransportKind::Http`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Stdio,
    Sse,
    Http,
}

impl TransportKind {
    /// All transports, in report order.
    pub const ALL: [TransportKind; 3] = [TransportKind::Stdio, TransportKind::Sse, TransportKind::Http];

    /// Label used in tables.
    pub fn label(&self) -> &'static str {
        match self {
            TransportKind::Stdio => "STDIO",
            TransportKind::Sse => "SSE",
            TransportKind::Http => "HTTP",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Sse => write!(f, "sse"),
            TransportKind::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(TransportKind::Stdio),
            "sse" => Ok(TransportKind::Sse),
            "http" | "streamable-http" => Ok(TransportKind::Http),
            _ => Err(format!("unknown transport: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streamable_http_collapses_to_http() {
        assert_eq!("streamable-http".parse::<TransportKind>().unwrap(), TransportKind::Http);
        assert_eq!("HTTP".parse::<TransportKind>().unwrap(), TransportKind::Http);
    }

    #[test]
    fn test_unknown_transport_rejected() {
        assert!("websocket".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_transport_serialization() {
        assert_eq!(serde_json::to_string(&TransportKind::Sse).unwrap(), "\"sse\"");
        assert_eq!(TransportKind::Stdio.label(), "STDIO");
    }
}
