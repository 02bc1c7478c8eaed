//! Correlation of configured servers with live processes.
//!
//! For each server record one [`MatchStrategy`] is selected from its launch
//! command and tested against the entries of a single process snapshot.
//! A match is attributed to a vendor by looking at the matched process's
//! parent command line.

mod engine;
mod strategy;
mod vendor;

pub use engine::{CorrelationEngine, CorrelationOutcome, MatchResult, ProbeStatus, ProcessMatch};
pub use strategy::{uvx_server_name, InterpreterFamily, MatchStrategy};
pub use vendor::{VendorDatabase, VendorRule};
