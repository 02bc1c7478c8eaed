//! Process correlation engine.

use super::strategy::MatchStrategy;
use super::vendor::VendorDatabase;
use crate::collect::{ProcessSnapshot, SnapshotProvider};
use crate::version::VersionAnalyzer;
use lsmcp_config::ServerRecord;
use serde::Serialize;
use tracing::{debug, warn};

/// A live process attributed to a configured server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMatch {
    pub pid: u32,
    pub parent_pid: u32,
    pub command_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_command_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_product: Option<String>,
}

/// Outcome of correlating one record against one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrelationOutcome {
    Matched(ProcessMatch),
    /// The snapshot was taken and nothing matched.
    NotMatched,
    /// The process table could not be read.
    ProbeFailed(String),
}

impl CorrelationOutcome {
    pub fn is_running(&self) -> bool {
        matches!(self, CorrelationOutcome::Matched(_))
    }

    pub fn to_match_result(&self) -> MatchResult {
        match self {
            CorrelationOutcome::Matched(m) => MatchResult {
                matched: true,
                pid: Some(m.pid),
                parent_command_line: m.parent_command_line.clone(),
                estimated_vendor: m.estimated_vendor.clone(),
                estimated_product: m.estimated_product.clone(),
            },
            CorrelationOutcome::NotMatched | CorrelationOutcome::ProbeFailed(_) => {
                MatchResult::default()
            }
        }
    }
}

/// Flat match result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_command_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_product: Option<String>,
}

/// How the process probe went, for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Status checks were not requested.
    Skipped,
    Ok {
        source: String,
        #[serde(rename = "processCount")]
        process_count: usize,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
        warnings: Vec<String>,
    },
    Failed { reason: String },
}

/// Correlates server records with one process snapshot.
///
/// The snapshot is taken once, when the engine is built, and reused for
/// every record of the pass.
#[derive(Debug)]
pub struct CorrelationEngine {
    snapshot: Result<ProcessSnapshot, String>,
    versions: VersionAnalyzer,
    vendors: VendorDatabase,
}

impl CorrelationEngine {
    /// Take a snapshot from `provider` and build an engine over it.
    pub fn probe<P: SnapshotProvider + ?Sized>(
        provider: &P,
        versions: VersionAnalyzer,
        vendors: VendorDatabase,
    ) -> Self {
        let snapshot = provider.snapshot().map_err(|e| {
            warn!(error = %e, "Process probe failed; status will be unknown");
            e.to_string()
        });
        Self {
            snapshot,
            versions,
            vendors,
        }
    }

    /// Build an engine over an existing snapshot.
    pub fn from_snapshot(
        snapshot: ProcessSnapshot,
        versions: VersionAnalyzer,
        vendors: VendorDatabase,
    ) -> Self {
        Self {
            snapshot: Ok(snapshot),
            versions,
            vendors,
        }
    }

    pub fn probe_status(&self) -> ProbeStatus {
        match &self.snapshot {
            Ok(snapshot) => ProbeStatus::Ok {
                source: snapshot.metadata.source.clone(),
                process_count: snapshot.len(),
                duration_ms: snapshot.metadata.duration_ms,
                warnings: snapshot.metadata.warnings.clone(),
            },
            Err(reason) => ProbeStatus::Failed {
                reason: reason.clone(),
            },
        }
    }

    /// Decide whether any live process is this server.
    pub fn is_running(&self, record: &ServerRecord) -> CorrelationOutcome {
        let snapshot = match &self.snapshot {
            Ok(snapshot) => snapshot,
            Err(reason) => return CorrelationOutcome::ProbeFailed(reason.clone()),
        };

        let Some(strategy) = MatchStrategy::select(record, &self.versions) else {
            debug!(server = %record.name, "No match strategy for server");
            return CorrelationOutcome::NotMatched;
        };

        let Some(entry) = snapshot.entries().iter().find(|e| strategy.matches(e)) else {
            debug!(server = %record.name, strategy = strategy.name(), "No matching process");
            return CorrelationOutcome::NotMatched;
        };

        let parent = snapshot.parent_of(entry);
        let vendor = parent.and_then(|p| self.vendors.identify(&p.command_line));
        debug!(
            server = %record.name,
            strategy = strategy.name(),
            pid = entry.pid.0,
            vendor = vendor.map(|v| v.vendor.as_str()),
            "Matched server process"
        );

        CorrelationOutcome::Matched(ProcessMatch {
            pid: entry.pid.0,
            parent_pid: entry.parent_pid.0,
            command_line: entry.command_line.clone(),
            parent_command_line: parent.map(|p| p.command_line.clone()),
            estimated_vendor: vendor.map(|v| v.vendor.clone()),
            estimated_product: vendor.map(|v| v.product.clone()),
        })
    }
}
