//! Process collection.
//!
//! This module provides the process evidence used for correlation:
//! - One process table snapshot per pass (ps / wmic)
//! - Command-line tokenization and executable base names
//!
//! Entries are only valid for the lifetime of the snapshot they came from.

mod snapshot;
mod tokenize;
mod types;

pub use snapshot::{
    detect_platform, parse_ps_output, parse_wmic_csv, take_snapshot, ListingCommand, PsProvider,
    SnapshotError, SnapshotOptions, SnapshotProvider, StaticProvider, DEFAULT_TIMEOUT,
};
pub use tokenize::{base_command_name, parse_command_line};
pub use types::{ProcessEntry, ProcessSnapshot, SnapshotMetadata};
