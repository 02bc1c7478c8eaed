//! Common types shared by the ls-mcp crates.
//!
//! This crate provides:
//! - Process identity wrapper used by the process snapshot
//! - Transport classification for MCP servers
//! - The unified error type with stable codes
//! - Output format selection for the CLI

pub mod error;
pub mod id;
pub mod output;
pub mod transport;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::ProcessId;
pub use output::OutputFormat;
pub use transport::TransportKind;

/// Schema version stamped on machine-readable reports.
pub const SCHEMA_VERSION: &str = "1.0.0";
