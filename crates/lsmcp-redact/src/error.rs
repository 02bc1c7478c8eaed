//! Error types for credential detection.

use thiserror::Error;

/// Result type for detection setup.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while building a pattern set.
///
/// Analysis itself never fails; only compiling caller-supplied patterns can.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// Failed to compile a regex pattern.
    #[error("pattern error in {pattern:?}: {message}")]
    PatternError { pattern: String, message: String },
}
