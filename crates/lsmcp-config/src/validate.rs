//! Settings validation errors and semantic validation.

use crate::settings::Settings;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for the process listing timeout (10 minutes).
const MAX_PROCESS_TIMEOUT_MS: u64 = 600_000;

/// Settings validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid pattern in {field}: {pattern:?} ({message})")]
    InvalidPattern {
        field: String,
        pattern: String,
        message: String,
    },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::InvalidPattern { .. } => 67,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate settings semantically.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    if settings.schema_version != crate::SETTINGS_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::SETTINGS_SCHEMA_VERSION.to_string(),
            actual: settings.schema_version.clone(),
        });
    }

    if settings.process_timeout_ms == 0 {
        return Err(ValidationError::invalid(
            "processTimeoutMs",
            "must be greater than zero",
        ));
    }
    if settings.process_timeout_ms > MAX_PROCESS_TIMEOUT_MS {
        return Err(ValidationError::invalid(
            "processTimeoutMs",
            format!("must be at most {}", MAX_PROCESS_TIMEOUT_MS),
        ));
    }

    for option in &settings.npx_value_options {
        if !option.starts_with('-') {
            return Err(ValidationError::invalid(
                "npxValueOptions",
                format!("{:?} is not an option (must start with '-')", option),
            ));
        }
    }

    validate_patterns("extraCredentialPatterns", &settings.extra_credential_patterns)?;
    validate_patterns("extraLowRiskPatterns", &settings.extra_low_risk_patterns)?;

    for rule in &settings.vendor_rules {
        if rule.needle.trim().is_empty() {
            return Err(ValidationError::invalid("vendorRules", "needle must not be empty"));
        }
        if rule.vendor.trim().is_empty() {
            return Err(ValidationError::invalid(
                "vendorRules",
                format!("rule {:?} has an empty vendor", rule.needle),
            ));
        }
    }

    for (app, paths) in &settings.custom_apps {
        if app.trim().is_empty() {
            return Err(ValidationError::invalid("customApps", "application name must not be empty"));
        }
        if paths.iter().any(|p| p.file_path.trim().is_empty()) {
            return Err(ValidationError::invalid(
                "customApps",
                format!("application {:?} has an empty filePath", app),
            ));
        }
    }

    Ok(())
}

fn validate_patterns(field: &str, patterns: &[String]) -> ValidationResult<()> {
    for pattern in patterns {
        if let Err(e) = regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
        {
            return Err(ValidationError::InvalidPattern {
                field: field.to_string(),
                pattern: pattern.clone(),
                message: e.to_string(),
            });
        }
    }
    Ok(())
}
