//! Exit codes for the ls-mcp CLI.
//!
//! Exit code ranges:
//! - 0-2: Scan outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors

/// Exit codes for ls-mcp.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Scan completed and at least one configuration file was found
    Clean = 0,

    /// No configuration file was found
    NoConfigFound = 1,

    /// `--strict` was given and a high-risk credential was found
    HighRiskFound = 2,

    /// Invalid arguments
    ArgsError = 10,

    /// Settings file missing, unparsable or invalid
    SettingsError = 11,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0-1: the scan itself went fine.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::NoConfigFound)
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    pub fn is_internal_error(self) -> bool {
        self.as_i32() >= 20
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NoConfigFound => "OK_NO_CONFIG",
            ExitCode::HighRiskFound => "ERR_HIGH_RISK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::SettingsError => "ERR_SETTINGS",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a failed run.
    pub fn for_error(err: &lsmcp_common::Error) -> Self {
        use lsmcp_common::ErrorCategory;
        match err.category() {
            ErrorCategory::Config => ExitCode::SettingsError,
            ErrorCategory::Io => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
