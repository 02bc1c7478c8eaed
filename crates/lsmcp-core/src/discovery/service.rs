//! Discovery of configuration files and their servers.

use super::bubble::find_in_parent_directories;
use super::paths::{absolutize, expand_home};
use super::registry::{friendly_name, PathCandidate, PathRegistry, TargetOs};
use crate::pipeline::{Enricher, ServerInfo};
use indexmap::IndexMap;
use lsmcp_config::{ConfigParser, PathScope};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Group name used for `--files`.
pub const CUSTOM_GROUP: &str = "custom";

/// One configuration file that exists on disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileReport {
    pub file_path: PathBuf,
    #[serde(rename = "type")]
    pub scope: PathScope,
    pub parsable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_key: Option<&'static str>,
    pub servers: Vec<ServerInfo>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub servers_count: usize,
}

/// Files found for one application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
    pub name: String,
    pub friendly_name: String,
    pub paths: Vec<ConfigFileReport>,
    pub stats: GroupStats,
}

impl FileGroup {
    fn new(name: &str) -> Self {
        FileGroup {
            name: name.to_string(),
            friendly_name: friendly_name(name),
            paths: Vec::new(),
            stats: GroupStats::default(),
        }
    }

    fn push(&mut self, report: ConfigFileReport) {
        self.stats.servers_count += report.servers.len();
        self.paths.push(report);
    }

    pub fn servers(&self) -> impl Iterator<Item = &ServerInfo> {
        self.paths.iter().flat_map(|p| p.servers.iter())
    }
}

/// Groups keyed by application id, in registry order.
pub type FileGroups = IndexMap<String, FileGroup>;

/// Discovery options.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Search parent directories for local files.
    pub bubbling: bool,
    pub cwd: PathBuf,
}

impl DiscoveryOptions {
    pub fn from_env(bubbling: bool) -> std::io::Result<Self> {
        Ok(Self {
            bubbling,
            cwd: std::env::current_dir()?,
        })
    }
}

/// Finds configuration files and enriches their servers.
#[derive(Debug)]
pub struct DiscoveryService<'a> {
    registry: PathRegistry,
    os: TargetOs,
    options: DiscoveryOptions,
    enricher: &'a Enricher,
}

impl<'a> DiscoveryService<'a> {
    pub fn new(
        registry: PathRegistry,
        os: TargetOs,
        options: DiscoveryOptions,
        enricher: &'a Enricher,
    ) -> Self {
        Self {
            registry,
            os,
            options,
            enricher,
        }
    }

    fn home(&self) -> &Path {
        &self.registry.base_dirs().home
    }

    /// Scan every registered application.
    ///
    /// Groups are always present, including empty ones.
    pub fn file_groups(&self) -> FileGroups {
        let mut groups = FileGroups::new();
        for (app, candidates) in self.registry.paths_for_os(self.os) {
            let mut group = FileGroup::new(&app);
            let mut seen = HashSet::new();

            for candidate in &candidates {
                let path = self.resolve_candidate(candidate);
                let absolute = absolutize(&path, &self.options.cwd);
                if !seen.insert(absolute.clone()) {
                    debug!(app = %app, path = %absolute.display(), "Duplicate candidate skipped");
                    continue;
                }
                if !absolute.exists() {
                    continue;
                }
                if let Some(report) = self.inspect_file(&absolute, candidate.scope) {
                    group.push(report);
                }
            }

            debug!(app = %app, files = group.paths.len(), servers = group.stats.servers_count, "Scanned application");
            groups.insert(app, group);
        }
        groups
    }

    /// Scan explicit files as a single `custom` group.
    ///
    /// Files that cannot be read are still listed, as not parsable.
    pub fn custom_files<P: AsRef<str>>(&self, files: &[P]) -> FileGroups {
        let mut group = FileGroup::new(CUSTOM_GROUP);
        let mut seen = HashSet::new();

        for file in files {
            let expanded = expand_home(file.as_ref(), self.home());
            let absolute = absolutize(&expanded, &self.options.cwd);
            if !seen.insert(absolute.clone()) {
                continue;
            }
            let report = self
                .inspect_file(&absolute, PathScope::Local)
                .unwrap_or_else(|| ConfigFileReport {
                    file_path: absolute,
                    scope: PathScope::Local,
                    parsable: false,
                    schema_key: None,
                    servers: Vec::new(),
                });
            group.push(report);
        }

        let mut groups = FileGroups::new();
        groups.insert(CUSTOM_GROUP.to_string(), group);
        groups
    }

    fn resolve_candidate(&self, candidate: &PathCandidate) -> PathBuf {
        let path = expand_home(&candidate.file_path.to_string_lossy(), self.home());
        if candidate.scope != PathScope::Local || !self.options.bubbling {
            return path;
        }
        if absolutize(&path, &self.options.cwd).exists() {
            return path;
        }
        find_in_parent_directories(&path, &self.options.cwd, Some(self.home())).unwrap_or(path)
    }

    fn inspect_file(&self, path: &Path, scope: PathScope) -> Option<ConfigFileReport> {
        let parsed = match ConfigParser::new(path).parse_file() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Configuration file unreadable");
                return None;
            }
        };

        let servers = if parsed.valid {
            parsed
                .servers
                .values()
                .map(|record| self.enricher.enrich(record))
                .collect()
        } else {
            Vec::new()
        };

        Some(ConfigFileReport {
            file_path: path.to_path_buf(),
            scope,
            parsable: parsed.valid,
            schema_key: parsed.schema_key.map(|k| k.as_str()),
            servers,
        })
    }
}

/// Drop groups without servers.
pub fn retain_with_servers(groups: &mut FileGroups) {
    groups.retain(|_, group| group.stats.servers_count > 0);
}
