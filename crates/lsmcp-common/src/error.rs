//! Error types for ls-mcp.
//!
//! Errors carry stable codes grouped by category, a short headline and a
//! remediation hint for human output, and serialize to a structured JSON
//! shape for machine output:
//!
//! ```text
//! ✗ Settings Error
//!   Reason: processTimeoutMs must be greater than zero
//!   Fix: Edit settings.json or remove it to fall back to built-in defaults.
//! ```
//!
//! Parsing and analysis never fail with these errors. Only the outer
//! surfaces (settings, discovery, process listing, I/O) surface them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ls-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Tool settings errors.
    Config,
    /// Configuration file discovery errors.
    Discovery,
    /// Process table collection errors.
    Collection,
    /// File I/O and serialization errors.
    Io,
    /// Platform compatibility errors.
    Platform,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Discovery => write!(f, "discovery"),
            ErrorCategory::Collection => write!(f, "collection"),
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Platform => write!(f, "platform"),
        }
    }
}

/// Unified error type for ls-mcp.
#[derive(Error, Debug)]
pub enum Error {
    // Settings errors (10-19)
    #[error("settings error: {0}")]
    Settings(String),

    #[error("invalid settings file: {0}")]
    InvalidSettings(String),

    #[error("settings schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersion { expected: String, actual: String },

    // Discovery errors (20-29)
    #[error("configuration file {} could not be read: {message}", path.display())]
    ConfigUnreadable { path: PathBuf, message: String },

    #[error("unknown application '{app}' for {os}")]
    UnknownApp { app: String, os: String },

    #[error("home directory could not be determined")]
    HomeDirUnavailable,

    // Collection errors (30-39)
    #[error("process listing failed: {0}")]
    ProcessListing(String),

    #[error("process listing timed out after {millis}ms")]
    ProcessListingTimeout { millis: u64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Platform errors (70-79)
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Settings errors
    /// - 20-29: Discovery errors
    /// - 30-39: Collection errors
    /// - 60-69: I/O errors
    /// - 70-79: Platform errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Settings(_) => 10,
            Error::InvalidSettings(_) => 11,
            Error::SchemaVersion { .. } => 12,
            Error::ConfigUnreadable { .. } => 20,
            Error::UnknownApp { .. } => 21,
            Error::HomeDirUnavailable => 22,
            Error::ProcessListing(_) => 30,
            Error::ProcessListingTimeout { .. } => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::UnsupportedPlatform(_) => 70,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Settings(_) | Error::InvalidSettings(_) | Error::SchemaVersion { .. } => {
                ErrorCategory::Config
            }

            Error::ConfigUnreadable { .. } | Error::UnknownApp { .. } | Error::HomeDirUnavailable => {
                ErrorCategory::Discovery
            }

            Error::ProcessListing(_) | Error::ProcessListingTimeout { .. } => {
                ErrorCategory::Collection
            }

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,

            Error::UnsupportedPlatform(_) => ErrorCategory::Platform,
        }
    }

    /// Returns whether rerunning after user action may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Settings(_) | Error::InvalidSettings(_) | Error::SchemaVersion { .. } => true,
            Error::ConfigUnreadable { .. } => true,
            Error::UnknownApp { .. } => false,
            Error::HomeDirUnavailable => true,
            Error::ProcessListing(_) | Error::ProcessListingTimeout { .. } => true,
            Error::Io(_) | Error::Json(_) => true,
            Error::UnsupportedPlatform(_) => false,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Settings(_) | Error::InvalidSettings(_) => {
                "Edit settings.json or remove it to fall back to built-in defaults."
            }
            Error::SchemaVersion { .. } => {
                "Set \"schemaVersion\" to the version supported by this release, or remove the field."
            }
            Error::ConfigUnreadable { .. } => {
                "Check that the file exists and that the current user can read it."
            }
            Error::UnknownApp { .. } => "Run with --all to list the supported applications.",
            Error::HomeDirUnavailable => "Set the HOME environment variable and retry.",
            Error::ProcessListing(_) => {
                "Check that 'ps' (or 'wmic' on Windows) is installed and on PATH, or pass --no-status."
            }
            Error::ProcessListingTimeout { .. } => {
                "The process table is slow to list. Retry with a larger --timeout-ms."
            }
            Error::Io(_) => "Check file permissions and retry the operation.",
            Error::Json(_) => "Report this as a bug together with the command line used.",
            Error::UnsupportedPlatform(_) => {
                "Use --files to scan explicit configuration files on this platform."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Settings(_) => "Settings Error",
            Error::InvalidSettings(_) => "Invalid Settings File",
            Error::SchemaVersion { .. } => "Settings Schema Mismatch",
            Error::ConfigUnreadable { .. } => "Configuration File Unreadable",
            Error::UnknownApp { .. } => "Unknown Application",
            Error::HomeDirUnavailable => "Home Directory Unavailable",
            Error::ProcessListing(_) => "Process Listing Failed",
            Error::ProcessListingTimeout { .. } => "Process Listing Timeout",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Serialization Error",
            Error::UnsupportedPlatform(_) => "Unsupported Platform",
        }
    }

    /// Format for terminal output: headline, reason, fix.
    pub fn to_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., file path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ConfigUnreadable { path, .. } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::UnknownApp { app, os } => {
                context.insert("app".to_string(), serde_json::json!(app));
                context.insert("os".to_string(), serde_json::json!(os));
            }
            Error::ProcessListingTimeout { millis } => {
                context.insert("timeout_ms".to_string(), serde_json::json!(millis));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
