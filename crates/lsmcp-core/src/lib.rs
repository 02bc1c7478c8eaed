//! ls-mcp core library.
//!
//! Finds MCP server configuration files of known AI applications, analyzes
//! each declared server (transport, package version pinning, credential
//! exposure) and correlates servers with running processes.
//!
//! - [`discovery`]: where configuration files live and which ones exist
//! - [`collect`]: process table snapshots
//! - [`correlate`]: server ↔ process matching and vendor attribution
//! - [`pipeline`]: per-server enrichment
//! - [`scan`]: one complete run, as used by the `ls-mcp` binary

pub mod collect;
pub mod correlate;
pub mod discovery;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod summary;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_log;
