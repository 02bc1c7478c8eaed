//! Server enrichment pipeline.
//!
//! Each parsed [`ServerRecord`] goes through a fixed sequence of stages.
//! Every stage consumes a [`ServerInfo`] and returns a new one:
//!
//! ```text
//! record ─▶ from_record ─▶ with_version ─▶ with_credentials ─▶ with_outcome ─▶ redacted
//! ```
//!
//! The credential and version stages are independent of each other. The
//! status stage only runs when a [`CorrelationEngine`] is attached. The
//! last stage masks credential values in arguments and matched command
//! lines, so nothing serialized carries a raw secret.

use crate::correlate::{CorrelationEngine, CorrelationOutcome, ProbeStatus, ProcessMatch};
use crate::version::{PackageVersionInfo, VersionAnalyzer};
use lsmcp_common::TransportKind;
use lsmcp_config::{ServerRecord, ServerType, Settings};
use lsmcp_redact::{CredentialAnalysis, CredentialAnalyzer, PatternSet};
use serde::Serialize;

/// Runtime status of a configured server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Running,
    Stopped,
    /// Not probed, or the probe failed.
    #[default]
    Unknown,
}

impl ServerStatus {
    /// Table glyph.
    pub fn symbol(&self) -> &'static str {
        match self {
            ServerStatus::Running => "●",
            ServerStatus::Stopped => "○",
            ServerStatus::Unknown => "?",
        }
    }
}

impl From<&CorrelationOutcome> for ServerStatus {
    fn from(outcome: &CorrelationOutcome) -> Self {
        match outcome {
            CorrelationOutcome::Matched(_) => ServerStatus::Running,
            CorrelationOutcome::NotMatched => ServerStatus::Stopped,
            CorrelationOutcome::ProbeFailed(_) => ServerStatus::Unknown,
        }
    }
}

/// An enriched server declaration.
///
/// Raw `env` and `headers` values are never serialized. Credential values
/// in `args` and process command lines are masked by [`ServerInfo::redacted`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub name: String,
    pub command: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub server_type: Option<ServerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportKind>,
    /// URL host for remote servers, the command otherwise.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_info: Option<PackageVersionInfo>,
    pub credentials: CredentialAnalysis,
    pub status: ServerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessMatch>,
    #[serde(skip)]
    record: ServerRecord,
}

impl ServerInfo {
    /// First stage: copy the record and derive transport and source.
    pub fn from_record(record: &ServerRecord) -> Self {
        let source = match record.url() {
            Some(url) => extract_hostname(url),
            None => record.command.clone(),
        };
        ServerInfo {
            name: record.name.clone(),
            command: record.command.clone(),
            args: record.args.clone(),
            url: record.url.clone(),
            server_type: record.server_type,
            transport: record.transport(),
            source,
            version_info: None,
            credentials: CredentialAnalysis::default(),
            status: ServerStatus::Unknown,
            process: None,
            record: record.clone(),
        }
    }

    pub fn with_version(self, version_info: Option<PackageVersionInfo>) -> Self {
        ServerInfo {
            version_info,
            ..self
        }
    }

    pub fn with_credentials(self, credentials: CredentialAnalysis) -> Self {
        ServerInfo {
            credentials,
            ..self
        }
    }

    pub fn with_outcome(self, outcome: &CorrelationOutcome) -> Self {
        let process = match outcome {
            CorrelationOutcome::Matched(m) => Some(m.clone()),
            _ => None,
        };
        ServerInfo {
            status: ServerStatus::from(outcome),
            process,
            ..self
        }
    }

    /// Final stage: mask credential values in arguments and command lines.
    pub fn redacted(self, analyzer: &CredentialAnalyzer) -> Self {
        let process = self.process.map(|m| ProcessMatch {
            command_line: analyzer.redact_command_line(&m.command_line),
            parent_command_line: m
                .parent_command_line
                .as_deref()
                .map(|line| analyzer.redact_command_line(line)),
            ..m
        });
        ServerInfo {
            args: analyzer.redact_args(&self.args),
            process,
            ..self
        }
    }

    /// The record this info was built from.
    pub fn record(&self) -> &ServerRecord {
        &self.record
    }

    pub fn is_implicit_latest(&self) -> bool {
        self.version_info.as_ref().is_some_and(|v| v.is_latest)
    }
}

/// Hostname of a URL, tolerating a missing scheme. Unparseable input is
/// returned unchanged.
pub fn extract_hostname(raw: &str) -> String {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    match url::Url::parse(&candidate) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Runs the enrichment stages for every record.
#[derive(Debug, Default)]
pub struct Enricher {
    credentials: CredentialAnalyzer,
    versions: VersionAnalyzer,
    correlation: Option<CorrelationEngine>,
}

impl Enricher {
    pub fn new(credentials: CredentialAnalyzer, versions: VersionAnalyzer) -> Self {
        Self {
            credentials,
            versions,
            correlation: None,
        }
    }

    /// Analyzers configured from tool settings.
    pub fn from_settings(settings: &Settings) -> lsmcp_common::Result<Self> {
        let patterns = PatternSet::with_extra(
            &settings.extra_credential_patterns,
            &settings.extra_low_risk_patterns,
        )
        .map_err(|e| lsmcp_common::Error::InvalidSettings(e.to_string()))?;
        Ok(Self::new(
            CredentialAnalyzer::new(patterns),
            VersionAnalyzer::new(settings.npx_value_options.clone()),
        ))
    }

    /// Attach a correlation engine so servers get a runtime status.
    pub fn with_correlation(mut self, engine: CorrelationEngine) -> Self {
        self.correlation = Some(engine);
        self
    }

    pub fn versions(&self) -> &VersionAnalyzer {
        &self.versions
    }

    pub fn probe_status(&self) -> ProbeStatus {
        self.correlation
            .as_ref()
            .map_or(ProbeStatus::Skipped, CorrelationEngine::probe_status)
    }

    pub fn enrich(&self, record: &ServerRecord) -> ServerInfo {
        let version = self
            .versions
            .analyze_server_version(&record.command, &record.args);
        let credentials = self.credentials.analyze_server(
            record.env.iter().flatten(),
            &record.args,
            record.headers.iter().flatten(),
        );

        let info = ServerInfo::from_record(record)
            .with_version(version)
            .with_credentials(credentials);

        let info = match &self.correlation {
            Some(engine) => {
                let outcome = engine.is_running(record);
                info.with_outcome(&outcome)
            }
            None => info,
        };
        info.redacted(&self.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{ProcessEntry, ProcessSnapshot, SnapshotMetadata};
    use crate::correlate::VendorDatabase;
    use indexmap::IndexMap;
    use lsmcp_redact::OverallRisk;

    #[test]
    fn test_extract_hostname() {
        assert_eq!(extract_hostname("https://api.example.com/mcp"), "api.example.com");
        assert_eq!(extract_hostname("localhost:8080/sse"), "localhost");
        assert_eq!(extract_hostname("http://127.0.0.1:3000"), "127.0.0.1");
        assert_eq!(extract_hostname("not a url"), "not a url");
        assert_eq!(extract_hostname(""), "");
    }

    #[test]
    fn test_enrich_stdio_server() {
        let mut record = ServerRecord::stdio("ctx7", "npx", &["-y", "@upstash/context7-mcp"]);
        let mut env = IndexMap::new();
        env.insert("API_KEY".to_string(), "sk-1234567890abcdef".to_string());
        record.env = Some(env);

        let info = Enricher::default().enrich(&record);
        assert_eq!(info.source, "npx");
        assert_eq!(info.transport, Some(TransportKind::Stdio));
        assert!(info.is_implicit_latest());
        assert_eq!(info.credentials.overall_risk_level, OverallRisk::High);
        assert_eq!(info.credentials.findings[0].masked_value, "s********f");
        assert_eq!(info.status, ServerStatus::Unknown);
    }

    #[test]
    fn test_enrich_remote_server() {
        let value = serde_json::json!({
            "type": "streamable-http",
            "url": "https://mcp.example.com/v1",
            "headers": {"Authorization": "${input:token}"}
        });
        let record = ServerRecord::from_value("remote", &value).unwrap();
        let info = Enricher::default().enrich(&record);
        assert_eq!(info.source, "mcp.example.com");
        assert_eq!(info.transport, Some(TransportKind::Http));
        assert!(!info.credentials.has_credentials);
        assert!(info.version_info.is_none());
    }

    #[test]
    fn test_status_stage() {
        let snapshot = ProcessSnapshot::new(
            vec![ProcessEntry::new(77, 1, "uv tool uvx mcp-server-time")],
            SnapshotMetadata::default(),
        );
        let engine = CorrelationEngine::from_snapshot(
            snapshot,
            VersionAnalyzer::default(),
            VendorDatabase::with_defaults(),
        );
        let enricher = Enricher::default().with_correlation(engine);

        let running = enricher.enrich(&ServerRecord::stdio("time", "uvx", &["mcp-server-time"]));
        assert_eq!(running.status, ServerStatus::Running);
        assert_eq!(running.process.as_ref().map(|p| p.pid), Some(77));

        let stopped = enricher.enrich(&ServerRecord::stdio("git", "uvx", &["mcp-server-git"]));
        assert_eq!(stopped.status, ServerStatus::Stopped);
        assert!(stopped.process.is_none());
    }

    #[test]
    fn test_serialization_hides_raw_secrets() {
        let mut record = ServerRecord::stdio("db", "node", &["server.js"]);
        let mut env = IndexMap::new();
        env.insert("DB_PASSWORD".to_string(), "hunter2hunter2".to_string());
        record.env = Some(env);

        let json = serde_json::to_string(&Enricher::default().enrich(&record)).unwrap();
        assert!(!json.contains("hunter2hunter2"));
        assert!(json.contains("\"maskedValue\""));
        assert!(json.contains("\"status\":\"unknown\""));
    }

    #[test]
    fn test_serialization_masks_secret_args() {
        let record = ServerRecord::stdio(
            "ctx7",
            "npx",
            &["-y", "@upstash/context7-mcp", "--api-key", "sk-live-SUPERSECRET"],
        );
        let info = Enricher::default().enrich(&record);
        assert_eq!(info.args[3], "s********T");
        assert_eq!(info.record().args[3], "sk-live-SUPERSECRET");

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("SUPERSECRET"));
        assert!(json.contains("@upstash/context7-mcp"));
    }

    #[test]
    fn test_matched_command_lines_masked() {
        let snapshot = ProcessSnapshot::new(
            vec![
                ProcessEntry::new(10, 1, "claude --auth-token parent-SECRET-value"),
                ProcessEntry::new(11, 10, "uv tool uvx mcp-server-time --token=child-SECRET-value"),
            ],
            SnapshotMetadata::default(),
        );
        let engine = CorrelationEngine::from_snapshot(
            snapshot,
            VersionAnalyzer::default(),
            VendorDatabase::with_defaults(),
        );
        let enricher = Enricher::default().with_correlation(engine);

        let info = enricher.enrich(&ServerRecord::stdio("time", "uvx", &["mcp-server-time"]));
        assert_eq!(info.status, ServerStatus::Running);
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("SECRET"), "{}", json);
        assert!(json.contains("--token=c********e"));
    }

    #[test]
    fn test_from_settings_uses_extra_patterns() {
        let settings = Settings {
            extra_credential_patterns: vec!["dsn$".into()],
            ..Settings::default()
        };
        let enricher = Enricher::from_settings(&settings).unwrap();
        let mut record = ServerRecord::stdio("sentry", "node", &["x.js"]);
        let mut env = IndexMap::new();
        env.insert("SENTRY_DSN".to_string(), "https://abc@o1.ingest.sentry.io/1".to_string());
        record.env = Some(env);
        assert!(enricher.enrich(&record).credentials.is_high_risk());
    }
}
