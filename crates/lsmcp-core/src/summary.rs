//! Aggregate counts over a discovery result.

use crate::discovery::FileGroups;
use crate::pipeline::ServerStatus;
use lsmcp_common::TransportKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransportBreakdown {
    pub stdio: usize,
    pub sse: usize,
    pub http: usize,
}

/// Summary of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_servers: usize,
    pub running_servers: usize,
    pub unknown_status: usize,
    /// Servers with at least one high-risk credential finding.
    pub high_risk_credentials: usize,
    pub implicit_latest_versions: usize,
    pub transport_breakdown: TransportBreakdown,
    pub files_found: usize,
    pub files_parsable: usize,
}

impl SummaryStats {
    pub fn from_groups(groups: &FileGroups) -> Self {
        let mut stats = SummaryStats::default();

        for group in groups.values() {
            for file in &group.paths {
                stats.files_found += 1;
                if file.parsable {
                    stats.files_parsable += 1;
                }
            }

            for server in group.servers() {
                stats.total_servers += 1;
                match server.status {
                    ServerStatus::Running => stats.running_servers += 1,
                    ServerStatus::Unknown => stats.unknown_status += 1,
                    ServerStatus::Stopped => {}
                }
                if server.credentials.is_high_risk() {
                    stats.high_risk_credentials += 1;
                }
                if server.is_implicit_latest() {
                    stats.implicit_latest_versions += 1;
                }
                match server.transport {
                    Some(TransportKind::Stdio) => stats.transport_breakdown.stdio += 1,
                    Some(TransportKind::Sse) => stats.transport_breakdown.sse += 1,
                    Some(TransportKind::Http) => stats.transport_breakdown.http += 1,
                    None => {}
                }
            }
        }

        stats
    }

    pub fn has_high_risk(&self) -> bool {
        self.high_risk_credentials > 0
    }
}
