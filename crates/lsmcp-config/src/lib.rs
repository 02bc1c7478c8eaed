//! MCP configuration parsing and ls-mcp settings.
//!
//! This crate provides:
//! - Parsing of vendor MCP configuration files (JSON and JSON with comments)
//! - Normalized [`ServerRecord`]s extracted from the recognized schema keys
//! - Tool settings resolution (CLI → env → XDG → defaults) and validation

pub mod jsonc;
pub mod parser;
pub mod record;
pub mod settings;
pub mod validate;

pub use parser::{
    parse_str, supported_config_keys, ConfigError, ConfigParser, ParsedConfig, SchemaKey,
    SyntaxMode,
};
pub use record::{validate_server_config, ServerRecord, ServerType};
pub use settings::{
    load_settings, CustomPathSetting, PathScope, ResolvedSettings, Settings, SettingsError,
    SettingsOptions, SettingsSnapshot, SettingsSource, VendorRuleSetting,
};
pub use validate::{ValidationError, ValidationResult};

/// Schema version accepted in settings files.
pub const SETTINGS_SCHEMA_VERSION: &str = "1.0.0";
