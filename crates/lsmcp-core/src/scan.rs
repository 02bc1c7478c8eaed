//! One complete scan: settings → snapshot → discovery → summary.

use crate::collect::SnapshotProvider;
use crate::correlate::{CorrelationEngine, ProbeStatus, VendorDatabase};
use crate::discovery::{
    register_settings_apps, retain_with_servers, BaseDirs, DiscoveryOptions, DiscoveryService,
    FileGroups, PathRegistry, TargetOs,
};
use crate::pipeline::Enricher;
use crate::summary::SummaryStats;
use lsmcp_common::SCHEMA_VERSION;
use lsmcp_config::{ResolvedSettings, SettingsSnapshot};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What to scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Explicit files; when non-empty the registry is not consulted.
    pub files: Vec<String>,
    /// Keep groups without servers.
    pub show_all: bool,
    /// Force directory bubbling on (settings may also enable it).
    pub bubbling: bool,
    /// Probe the process table for server status.
    pub probe_status: bool,
}

/// Environment a scan runs in.
#[derive(Debug, Clone)]
pub struct ScanEnv {
    pub os: TargetOs,
    pub base_dirs: BaseDirs,
    pub cwd: PathBuf,
}

impl ScanEnv {
    pub fn detect() -> lsmcp_common::Result<Self> {
        Ok(Self {
            os: TargetOs::current()?,
            base_dirs: BaseDirs::from_env()?,
            cwd: std::env::current_dir()?,
        })
    }
}

/// Machine-readable scan report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub schema_version: &'static str,
    pub run_id: String,
    pub generated_at: String,
    pub settings: SettingsSnapshot,
    pub mcp_files: FileGroups,
    pub summary: SummaryStats,
    pub probe: ProbeStatus,
}

/// Run a scan.
pub fn run_scan(
    request: &ScanRequest,
    settings: &ResolvedSettings,
    env: &ScanEnv,
    provider: &dyn SnapshotProvider,
    run_id: &str,
) -> lsmcp_common::Result<ScanReport> {
    let mut enricher = Enricher::from_settings(&settings.settings)?;
    if request.probe_status {
        let engine = CorrelationEngine::probe(
            provider,
            enricher.versions().clone(),
            VendorDatabase::with_settings(&settings.settings.vendor_rules),
        );
        enricher = enricher.with_correlation(engine);
    }

    let mut registry = PathRegistry::new(env.base_dirs.clone());
    register_settings_apps(&mut registry, env.os, &settings.settings.custom_apps);

    let options = DiscoveryOptions {
        bubbling: request.bubbling || settings.settings.directory_bubbling,
        cwd: env.cwd.clone(),
    };
    let service = DiscoveryService::new(registry, env.os, options, &enricher);

    let mut groups = if request.files.is_empty() {
        service.file_groups()
    } else {
        service.custom_files(&request.files)
    };
    let summary = SummaryStats::from_groups(&groups);
    if !request.show_all {
        retain_with_servers(&mut groups);
    }

    info!(
        run_id,
        files = summary.files_found,
        servers = summary.total_servers,
        running = summary.running_servers,
        "Scan complete"
    );

    Ok(ScanReport {
        schema_version: SCHEMA_VERSION,
        run_id: run_id.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        settings: settings.snapshot(),
        mcp_files: groups,
        summary,
        probe: enricher.probe_status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{ProcessEntry, ProcessSnapshot, SnapshotMetadata, StaticProvider};
    use std::fs;
    use tempfile::TempDir;

    fn env(tmp: &TempDir) -> ScanEnv {
        let cwd = tmp.path().join("work");
        fs::create_dir_all(&cwd).unwrap();
        ScanEnv {
            os: TargetOs::Linux,
            base_dirs: BaseDirs::with_home(tmp.path()),
            cwd,
        }
    }

    fn provider() -> StaticProvider {
        StaticProvider(ProcessSnapshot::new(
            vec![
                ProcessEntry::new(10, 1, "/usr/share/code/code --type=utility"),
                ProcessEntry::new(11, 10, "uv tool uvx mcp-server-fetch"),
            ],
            SnapshotMetadata::default(),
        ))
    }

    #[test]
    fn test_registry_scan_with_status() {
        let tmp = TempDir::new().unwrap();
        let env = env(&tmp);
        let vscode = env.cwd.join(".vscode");
        fs::create_dir_all(&vscode).unwrap();
        fs::write(
            vscode.join("mcp.json"),
            r#"{
                // project servers
                "servers": {
                    "fetch": {"command": "uvx", "args": ["mcp-server-fetch"]},
                    "git": {"command": "uvx", "args": ["mcp-server-git"]},
                },
            }"#,
        )
        .unwrap();

        let request = ScanRequest {
            probe_status: true,
            ..Default::default()
        };
        let report = run_scan(&request, &ResolvedSettings::defaults(), &env, &provider(), "run-test").unwrap();

        assert_eq!(report.mcp_files.len(), 1);
        let group = &report.mcp_files["vscode"];
        let servers: Vec<_> = group.servers().collect();
        assert_eq!(servers.len(), 2);
        let fetch = servers.iter().find(|s| s.name == "fetch").unwrap();
        let process = fetch.process.as_ref().unwrap();
        assert_eq!(process.pid, 11);
        assert_eq!(process.estimated_product.as_deref(), Some("VS Code"));
        assert_eq!(report.summary.running_servers, 1);
        assert!(matches!(report.probe, ProbeStatus::Ok { .. }));
    }

    #[test]
    fn test_show_all_keeps_empty_groups() {
        let tmp = TempDir::new().unwrap();
        let env = env(&tmp);
        let request = ScanRequest {
            show_all: true,
            ..Default::default()
        };
        let report = run_scan(&request, &ResolvedSettings::defaults(), &env, &provider(), "run-test").unwrap();
        assert_eq!(report.mcp_files.len(), 11);
        assert_eq!(report.summary.files_found, 0);
        assert_eq!(report.probe, ProbeStatus::Skipped);
    }

    #[test]
    fn test_custom_apps_from_settings() {
        let tmp = TempDir::new().unwrap();
        let env = env(&tmp);
        fs::write(
            tmp.path().join("agent.json"),
            r#"{"mcpServers": {"a": {"command": "node", "args": ["a.js"]}}}"#,
        )
        .unwrap();

        let mut settings = ResolvedSettings::defaults();
        settings.settings.custom_apps.insert(
            "my-agent".into(),
            vec![lsmcp_config::CustomPathSetting {
                file_path: "~/agent.json".into(),
                scope: lsmcp_config::PathScope::Global,
            }],
        );
        let report = run_scan(&ScanRequest::default(), &settings, &env, &provider(), "run-test").unwrap();
        assert_eq!(report.mcp_files["my-agent"].stats.servers_count, 1);
    }
}
