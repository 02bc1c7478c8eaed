//! ls-mcp tool settings.
//!
//! Settings tune the scanner itself (timeouts, extra credential patterns,
//! vendor attribution rules, custom applications). They are distinct from
//! the MCP configuration files being scanned.
//!
//! Resolution order (highest to lowest priority):
//! 1. Explicit `--settings` path
//! 2. `LS_MCP_CONFIG` environment variable (a directory)
//! 3. XDG config home (`~/.config/ls-mcp/`)
//! 4. Built-in defaults

use crate::jsonc;
use crate::validate::{validate_settings, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the settings directory.
pub const ENV_CONFIG_DIR: &str = "LS_MCP_CONFIG";

/// Directory name under the XDG config home.
const CONFIG_DIR_NAME: &str = "ls-mcp";

/// Settings file name inside the config directory.
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Errors that can occur during settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("invalid JSON in settings file {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: jsonc::JsoncError,
    },

    #[error("semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("I/O error reading {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<SettingsError> for lsmcp_common::Error {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::ValidationError(ValidationError::VersionMismatch { expected, actual }) => {
                lsmcp_common::Error::SchemaVersion { expected, actual }
            }
            SettingsError::ValidationError(inner) => {
                lsmcp_common::Error::InvalidSettings(inner.to_string())
            }
            SettingsError::ParseError { .. } => {
                lsmcp_common::Error::InvalidSettings(err.to_string())
            }
            SettingsError::NotFound { .. } | SettingsError::IoError { .. } => {
                lsmcp_common::Error::Settings(err.to_string())
            }
        }
    }
}

/// Whether a configuration path is tied to the project or to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathScope {
    /// Relative to the working directory (project-local).
    Local,
    /// Absolute or home-relative (user-wide).
    #[default]
    Global,
}

impl PathScope {
    pub fn label(&self) -> &'static str {
        match self {
            PathScope::Local => "LOCAL",
            PathScope::Global => "GLOBAL",
        }
    }
}

/// Extra vendor attribution rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRuleSetting {
    /// Case-insensitive substring searched in the parent command line.
    pub needle: String,
    pub vendor: String,
    pub product: String,
}

/// A configuration file location for a custom application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPathSetting {
    pub file_path: String,
    #[serde(rename = "type", default)]
    pub scope: PathScope,
}

/// Scanner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Settings {
    pub schema_version: String,
    /// Upper bound for the process listing.
    pub process_timeout_ms: u64,
    /// Search parent directories for project-local files.
    pub directory_bubbling: bool,
    /// npx options whose value is not the package specifier.
    pub npx_value_options: Vec<String>,
    /// Additional high-risk credential name patterns (regex).
    pub extra_credential_patterns: Vec<String>,
    /// Additional low-risk credential name patterns (regex).
    pub extra_low_risk_patterns: Vec<String>,
    /// Vendor rules checked before the built-in ones.
    pub vendor_rules: Vec<VendorRuleSetting>,
    /// Application name to configuration paths.
    pub custom_apps: IndexMap<String, Vec<CustomPathSetting>>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            schema_version: crate::SETTINGS_SCHEMA_VERSION.to_string(),
            process_timeout_ms: 5_000,
            directory_bubbling: false,
            npx_value_options: ["--registry", "-r", "--package", "-p"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extra_credential_patterns: Vec::new(),
            extra_low_risk_patterns: Vec::new(),
            vendor_rules: Vec::new(),
            custom_apps: IndexMap::new(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a file.
    pub fn from_file(path: &Path) -> Result<(Settings, String), SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let hash = compute_hash(&content);

        let value = jsonc::parse_tolerant(&content).map_err(|source| SettingsError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_value(value).map_err(|e| SettingsError::ParseError {
                path: path.to_path_buf(),
                source: jsonc::JsoncError::Json(e),
            })?;

        validate_settings(&settings)?;
        Ok((settings, hash))
    }
}

/// Where the settings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    CliArgument,
    Environment,
    XdgConfig,
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsSource::CliArgument => write!(f, "CLI argument"),
            SettingsSource::Environment => write!(f, "environment variable"),
            SettingsSource::XdgConfig => write!(f, "XDG config"),
            SettingsSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Settings resolution options.
#[derive(Debug, Default, Clone)]
pub struct SettingsOptions {
    /// Explicit settings file (highest priority).
    pub settings_path: Option<PathBuf>,
    /// Explicit config directory, overriding the environment.
    pub config_dir: Option<PathBuf>,
}

/// Resolved settings with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub settings: Settings,
    /// File the settings were read from (None for defaults).
    pub path: Option<PathBuf>,
    /// SHA-256 of the file content (None for defaults).
    pub hash: Option<String>,
    pub source: SettingsSource,
}

impl ResolvedSettings {
    /// Built-in defaults with no file behind them.
    pub fn defaults() -> Self {
        ResolvedSettings {
            settings: Settings::default(),
            path: None,
            hash: None,
            source: SettingsSource::BuiltinDefault,
        }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            path: self.path.clone(),
            hash: self.hash.clone(),
            source: self.source,
            schema_version: self.settings.schema_version.clone(),
        }
    }
}

/// Settings provenance embedded in reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub path: Option<PathBuf>,
    pub hash: Option<String>,
    pub source: SettingsSource,
    pub schema_version: String,
}

/// Load settings using the standard resolution order.
pub fn load_settings(options: &SettingsOptions) -> Result<ResolvedSettings, SettingsError> {
    if let Some(path) = &options.settings_path {
        if !path.exists() {
            return Err(SettingsError::NotFound { path: path.clone() });
        }
        let (settings, hash) = Settings::from_file(path)?;
        return Ok(ResolvedSettings {
            settings,
            path: Some(path.clone()),
            hash: Some(hash),
            source: SettingsSource::CliArgument,
        });
    }

    let (dir, source) = resolve_config_dir(options);
    let candidate = dir.join(SETTINGS_FILENAME);
    if candidate.exists() {
        debug!(path = %candidate.display(), %source, "loading settings");
        let (settings, hash) = Settings::from_file(&candidate)?;
        return Ok(ResolvedSettings {
            settings,
            path: Some(candidate),
            hash: Some(hash),
            source,
        });
    }

    debug!("no settings file found, using built-in defaults");
    Ok(ResolvedSettings::defaults())
}

fn resolve_config_dir(options: &SettingsOptions) -> (PathBuf, SettingsSource) {
    if let Some(dir) = &options.config_dir {
        return (dir.clone(), SettingsSource::CliArgument);
    }

    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        if !dir.is_empty() {
            return (PathBuf::from(dir), SettingsSource::Environment);
        }
    }

    let xdg_config = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });

    (xdg_config.join(CONFIG_DIR_NAME), SettingsSource::XdgConfig)
}

/// Compute SHA-256 hash of content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.process_timeout_ms, 5_000);
        assert!(!s.directory_bubbling);
        assert_eq!(s.npx_value_options, vec!["--registry", "-r", "--package", "-p"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"directoryBubbling": true}"#).unwrap();

        let (settings, hash) = Settings::from_file(&path).unwrap();
        assert!(settings.directory_bubbling);
        assert_eq!(settings.process_timeout_ms, 5_000);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_settings_accept_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            "{\n  // slow machine\n  \"processTimeoutMs\": 9000,\n}",
        )
        .unwrap();
        let (settings, _) = Settings::from_file(&path).unwrap();
        assert_eq!(settings.process_timeout_ms, 9000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"procesTimeoutMs": 10}"#).unwrap();
        assert!(matches!(
            Settings::from_file(&path),
            Err(SettingsError::ParseError { .. })
        ));
    }

    #[test]
    fn test_explicit_path_missing_is_error() {
        let options = SettingsOptions {
            settings_path: Some(PathBuf::from("/no/such/settings.json")),
            config_dir: None,
        };
        assert!(matches!(
            load_settings(&options),
            Err(SettingsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_config_dir_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let options = SettingsOptions {
            settings_path: None,
            config_dir: Some(dir.path().to_path_buf()),
        };
        let resolved = load_settings(&options).unwrap();
        assert_eq!(resolved.source, SettingsSource::BuiltinDefault);
        assert!(resolved.path.is_none());
        assert_eq!(resolved.settings, Settings::default());
    }

    #[test]
    fn test_config_dir_with_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{"customApps": {"acme": [{"filePath": ".acme/mcp.json", "type": "local"}]}}"#,
        )
        .unwrap();
        let options = SettingsOptions {
            settings_path: None,
            config_dir: Some(dir.path().to_path_buf()),
        };
        let resolved = load_settings(&options).unwrap();
        assert_eq!(resolved.source, SettingsSource::CliArgument);
        let acme = &resolved.settings.custom_apps["acme"];
        assert_eq!(acme[0].scope, PathScope::Local);

        let snapshot = resolved.snapshot();
        assert_eq!(snapshot.hash, resolved.hash);
        assert_eq!(snapshot.schema_version, "1.0.0");
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(compute_hash("{}"), compute_hash("{}"));
        assert_ne!(compute_hash("{}"), compute_hash("{ }"));
    }

    #[test]
    fn test_error_conversion() {
        let err = SettingsError::ValidationError(ValidationError::VersionMismatch {
            expected: "1.0.0".into(),
            actual: "2.0.0".into(),
        });
        let common: lsmcp_common::Error = err.into();
        assert_eq!(common.code(), 12);
    }
}
