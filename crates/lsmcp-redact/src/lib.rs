//! Credential detection for MCP server declarations.
//!
//! MCP servers receive secrets through environment variables, command-line
//! flags and HTTP headers. This crate flags entries whose *names* look
//! secret-bearing, masks their values for display, and rates the risk.
//!
//! # Key Features
//!
//! - **Name-based detection**: case-insensitive regex patterns over variable,
//!   flag and header names, held in a [`PatternSet`] that callers may extend.
//! - **Substitution awareness**: placeholders such as `${input:token}` are
//!   resolved by the host application and are never reported.
//! - **Masking**: only the first and last character of a value survive.
//!
//! # Example
//!
//! ```
//! use lsmcp_redact::{CredentialAnalyzer, OverallRisk};
//!
//! let analyzer = CredentialAnalyzer::default();
//! let env = [("GITHUB_TOKEN", "ghp_abcdef123456")];
//! let result = analyzer.analyze_env(env);
//! assert!(result.has_credentials);
//! assert_eq!(result.overall_risk_level, OverallRisk::High);
//! assert_eq!(result.findings[0].masked_value, "g********6");
//! ```

pub mod detect;
pub mod error;
pub mod mask;
pub mod patterns;

pub use detect::{
    CredentialAnalysis, CredentialAnalyzer, CredentialFinding, FindingSource, OverallRisk,
    RiskLevel,
};
pub use error::{RedactionError, Result};
pub use mask::mask_value;
pub use patterns::PatternSet;
