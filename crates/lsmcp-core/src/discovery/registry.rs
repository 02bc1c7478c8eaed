//! Known configuration file locations per application and OS.

use super::DiscoveryError;
use indexmap::IndexMap;
use lsmcp_config::PathScope;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Operating systems with a path table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Linux,
    Macos,
    Windows,
}

impl TargetOs {
    pub const ALL: [TargetOs; 3] = [TargetOs::Linux, TargetOs::Macos, TargetOs::Windows];

    /// The OS this binary runs on.
    pub fn current() -> Result<Self, DiscoveryError> {
        std::env::consts::OS.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Macos => "macos",
            TargetOs::Windows => "windows",
        }
    }
}

impl std::str::FromStr for TargetOs {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(TargetOs::Linux),
            "macos" | "darwin" => Ok(TargetOs::Macos),
            "windows" | "win32" => Ok(TargetOs::Windows),
            other => Err(DiscoveryError::UnsupportedOs(other.to_string())),
        }
    }
}

impl std::fmt::Display for TargetOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathCandidate {
    pub file_path: PathBuf,
    #[serde(rename = "type")]
    pub scope: PathScope,
}

impl PathCandidate {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: path.into(),
            scope: PathScope::Local,
        }
    }

    pub fn global(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: path.into(),
            scope: PathScope::Global,
        }
    }
}

/// Application id to candidates, in registry order.
pub type AppPaths = IndexMap<String, Vec<PathCandidate>>;

/// Base directories the path tables are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirs {
    pub home: PathBuf,
    /// `%APPDATA%` (Windows roaming data).
    pub app_data: PathBuf,
    /// `%LOCALAPPDATA%`.
    pub local_app_data: PathBuf,
}

impl BaseDirs {
    /// Resolve from the environment.
    pub fn from_env() -> Result<Self, DiscoveryError> {
        let home = dirs::home_dir().ok_or(DiscoveryError::HomeDirUnavailable)?;
        let app_data = std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(dirs::data_dir)
            .unwrap_or_default();
        let local_app_data = std::env::var_os("LOCALAPPDATA")
            .map(PathBuf::from)
            .or_else(dirs::data_local_dir)
            .unwrap_or_default();
        Ok(Self {
            home,
            app_data,
            local_app_data,
        })
    }

    /// Fixed base directories (tests, fixtures).
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            app_data: home.join("AppData").join("Roaming"),
            local_app_data: home.join("AppData").join("Local"),
            home,
        }
    }
}

/// Display name for an application id, falling back to the id.
pub fn friendly_name(app: &str) -> String {
    match app {
        "claude" => "Claude Desktop",
        "claude_code" => "Claude Code",
        "cursor" => "Cursor",
        "vscode" => "VS Code",
        "cline" => "Cline",
        "windsurf" => "Windsurf",
        "roo" => "Roo",
        "intellij-github-copilot" => "IntelliJ GitHub Copilot",
        "junie" => "IntelliJ Junie",
        "zed" => "Zed",
        "gemini" => "Gemini CLI",
        "custom" => "Custom Files",
        other => other,
    }
    .to_string()
}

fn join(base: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(base.to_path_buf(), |acc, p| acc.join(p))
}

fn rel(parts: &[&str]) -> PathBuf {
    parts.iter().collect()
}

const CLINE_EXT: &str = "saoudrizwan.claude-dev";
const ROO_EXT: &str = "rooveterinaryinc.roo-cline";

/// Registry of configuration locations.
#[derive(Debug, Clone)]
pub struct PathRegistry {
    dirs: BaseDirs,
    custom: HashMap<TargetOs, AppPaths>,
}

impl PathRegistry {
    pub fn new(dirs: BaseDirs) -> Self {
        Self {
            dirs,
            custom: HashMap::new(),
        }
    }

    pub fn base_dirs(&self) -> &BaseDirs {
        &self.dirs
    }

    pub fn supported_operating_systems(&self) -> &'static [TargetOs] {
        &TargetOs::ALL
    }

    /// Register or replace a custom application for one OS.
    pub fn register_custom_app(&mut self, os: TargetOs, app: &str, paths: Vec<PathCandidate>) {
        self.custom
            .entry(os)
            .or_default()
            .insert(app.to_string(), paths);
    }

    /// Built-in table merged with custom applications.
    pub fn paths_for_os(&self, os: TargetOs) -> AppPaths {
        let mut paths = self.builtin_paths(os);
        if let Some(custom) = self.custom.get(&os) {
            for (app, candidates) in custom {
                paths.insert(app.clone(), candidates.clone());
            }
        }
        paths
    }

    pub fn paths_for_app(&self, os: TargetOs, app: &str) -> Result<Vec<PathCandidate>, DiscoveryError> {
        self.paths_for_os(os)
            .swap_remove(app)
            .ok_or_else(|| DiscoveryError::UnknownApp {
                app: app.to_string(),
                os: os.to_string(),
            })
    }

    pub fn supported_apps(&self, os: TargetOs) -> Vec<String> {
        self.paths_for_os(os).into_keys().collect()
    }

    /// Built-in table only.
    pub fn builtin_paths(&self, os: TargetOs) -> AppPaths {
        match os {
            TargetOs::Linux => self.linux_paths(),
            TargetOs::Macos => self.macos_paths(),
            TargetOs::Windows => self.windows_paths(),
        }
    }

    fn linux_paths(&self) -> AppPaths {
        let home = &self.dirs.home;
        let config = home.join(".config");
        let mut t = AppPaths::new();

        t.insert("claude".into(), vec![PathCandidate::global(join(&config, &["Claude", "claude_desktop_config.json"]))]);
        t.insert("claude_code".into(), vec![PathCandidate::local(".mcp.json")]);
        t.insert("cursor".into(), cursor(home));
        t.insert(
            "vscode".into(),
            vec![
                PathCandidate::local(rel(&[".vscode", "mcp.json"])),
                PathCandidate::global(join(&config, &["Code", "User", "settings.json"])),
                PathCandidate::global(join(&config, &["Code - Insiders", "User", "settings.json"])),
                PathCandidate::global(join(&config, &["Code", "User", "mcp.json"])),
                PathCandidate::global(join(&config, &["Code - Insiders", "User", "mcp.json"])),
                PathCandidate::global(home.join(".mcp.json")),
            ],
        );
        t.insert("cline".into(), vscode_extension(&config, CLINE_EXT));
        t.insert("windsurf".into(), windsurf());
        t.insert("roo".into(), vscode_extension(&config, ROO_EXT));
        t.insert(
            "intellij-github-copilot".into(),
            vec![PathCandidate::global(join(&config, &["github-copilot", "intellij", "mcp.json"]))],
        );
        t.insert(
            "junie".into(),
            vec![
                PathCandidate::global(join(home, &[".junie", "mcp.json"])),
                PathCandidate::local(rel(&[".junie", "mcp", "mcp.json"])),
            ],
        );
        t.insert("zed".into(), zed(join(&config, &["zed", "settings.json"])));
        t.insert("gemini".into(), gemini(home));
        t
    }

    fn macos_paths(&self) -> AppPaths {
        let home = &self.dirs.home;
        let support = join(home, &["Library", "Application Support"]);
        let mut t = AppPaths::new();

        t.insert("claude".into(), vec![PathCandidate::global(join(&support, &["Claude", "claude_desktop_config.json"]))]);
        t.insert("claude_code".into(), vec![PathCandidate::local(".mcp.json")]);
        t.insert("cursor".into(), cursor(home));
        t.insert(
            "vscode".into(),
            vec![
                PathCandidate::local(rel(&[".vscode", "mcp.json"])),
                PathCandidate::global(join(&support, &["Code", "User", "settings.json"])),
                PathCandidate::global(join(&support, &["Code", "User", "mcp.json"])),
                PathCandidate::global(join(&support, &["Code - Insiders", "User", "settings.json"])),
                PathCandidate::global(join(&support, &["Code - Insiders", "User", "mcp.json"])),
            ],
        );
        t.insert("cline".into(), vscode_extension(&support, CLINE_EXT));
        t.insert("windsurf".into(), windsurf());
        t.insert("roo".into(), vscode_extension(&support, ROO_EXT));
        t.insert(
            "intellij-github-copilot".into(),
            vec![PathCandidate::global(join(home, &[".config", "github-copilot", "intellij", "mcp.json"]))],
        );
        t.insert(
            "junie".into(),
            vec![
                PathCandidate::global(join(home, &[".junie", "mcp", "mcp.json"])),
                PathCandidate::local(rel(&[".junie", "mcp", "mcp.json"])),
            ],
        );
        t.insert("zed".into(), zed(join(home, &[".config", "zed", "settings.json"])));
        t.insert("gemini".into(), gemini(home));
        t
    }

    fn windows_paths(&self) -> AppPaths {
        let home = &self.dirs.home;
        let app_data = &self.dirs.app_data;
        let local = &self.dirs.local_app_data;
        let mut t = AppPaths::new();

        t.insert("claude".into(), vec![PathCandidate::global(join(app_data, &["Claude", "claude_desktop_config.json"]))]);
        t.insert("claude_code".into(), vec![PathCandidate::local(".mcp.json")]);
        t.insert("cursor".into(), cursor(home));
        t.insert(
            "vscode".into(),
            vec![
                PathCandidate::local(rel(&[".vscode", "mcp.json"])),
                PathCandidate::global(join(app_data, &["Code", "User", "settings.json"])),
                PathCandidate::global(join(app_data, &["Code - Insiders", "User", "settings.json"])),
                PathCandidate::global(join(app_data, &["Code", "User", "mcp.json"])),
                PathCandidate::global(join(app_data, &["Code - Insiders", "User", "mcp.json"])),
            ],
        );
        t.insert("cline".into(), vscode_extension(app_data, CLINE_EXT));
        t.insert("windsurf".into(), windsurf());
        t.insert("roo".into(), vscode_extension(app_data, ROO_EXT));
        t.insert(
            "intellij-github-copilot".into(),
            vec![PathCandidate::global(join(local, &["github-copilot", "intellij", "mcp.json"]))],
        );
        t.insert(
            "junie".into(),
            vec![PathCandidate::global(join(home, &[".junie", "mcp", "mcp.json"]))],
        );
        t.insert("zed".into(), zed(join(local, &["zed", "settings.json"])));
        t.insert("gemini".into(), gemini(home));
        t
    }
}

fn cursor(home: &Path) -> Vec<PathCandidate> {
    vec![
        PathCandidate::global(join(home, &[".cursor", "mcp.json"])),
        PathCandidate::local(rel(&[".cursor", "mcp.json"])),
    ]
}

fn windsurf() -> Vec<PathCandidate> {
    vec![PathCandidate::local(rel(&[".codeium", "windsurf", "mcp_config.json"]))]
}

fn zed(global: PathBuf) -> Vec<PathCandidate> {
    vec![
        PathCandidate::global(global),
        PathCandidate::local(rel(&[".zed", "settings.json"])),
    ]
}

fn gemini(home: &Path) -> Vec<PathCandidate> {
    vec![
        PathCandidate::global(join(home, &[".gemini", "settings.json"])),
        PathCandidate::local(rel(&[".gemini", "settings.json"])),
    ]
}

/// Stable and Insiders storage for a VS Code extension's MCP settings.
fn vscode_extension(base: &Path, extension: &str) -> Vec<PathCandidate> {
    ["Code", "Code - Insiders"]
        .iter()
        .map(|&edition| {
            PathCandidate::global(join(
                base,
                &[edition, "User", "globalStorage", extension, "settings", "cline_mcp_settings.json"],
            ))
        })
        .collect()
}
