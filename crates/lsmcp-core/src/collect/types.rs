//! Process snapshot types.

use super::tokenize::{base_command_name, parse_command_line};
use lsmcp_common::ProcessId;
use serde::Serialize;
use std::collections::HashMap;

/// One live process, valid for the lifetime of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEntry {
    pub pid: ProcessId,
    pub parent_pid: ProcessId,
    /// Command line as reported by the OS.
    pub command_line: String,
    /// Tokenized command line.
    #[serde(skip)]
    pub tokens: Vec<String>,
}

impl ProcessEntry {
    pub fn new(pid: u32, parent_pid: u32, command_line: impl Into<String>) -> Self {
        let command_line = command_line.into();
        let tokens = parse_command_line(&command_line);
        ProcessEntry {
            pid: ProcessId(pid),
            parent_pid: ProcessId(parent_pid),
            command_line,
            tokens,
        }
    }

    /// Base name of the executable, if the command line is not empty.
    pub fn base_command(&self) -> Option<&str> {
        self.tokens.first().map(|t| base_command_name(t))
    }

    /// Tokens after the executable.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }
}

/// Metadata about how a snapshot was taken.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub platform: String,
    /// Listing facility used (`ps`, `wmic`, `fixture`).
    pub source: String,
    pub started_at: String,
    pub duration_ms: u64,
    pub process_count: usize,
    /// Lines that could not be parsed.
    pub warnings: Vec<String>,
}

/// All processes observed in one listing.
#[derive(Debug, Clone, Default)]
pub struct ProcessSnapshot {
    entries: Vec<ProcessEntry>,
    by_pid: HashMap<ProcessId, usize>,
    pub metadata: SnapshotMetadata,
}

impl ProcessSnapshot {
    pub fn new(entries: Vec<ProcessEntry>, mut metadata: SnapshotMetadata) -> Self {
        let by_pid = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.pid, idx))
            .collect();
        metadata.process_count = entries.len();
        ProcessSnapshot {
            entries,
            by_pid,
            metadata,
        }
    }

    /// Entries in listing order.
    pub fn entries(&self) -> &[ProcessEntry] {
        &self.entries
    }

    pub fn get(&self, pid: ProcessId) -> Option<&ProcessEntry> {
        self.by_pid.get(&pid).map(|&idx| &self.entries[idx])
    }

    /// The parent entry, when it is part of the same snapshot.
    pub fn parent_of(&self, entry: &ProcessEntry) -> Option<&ProcessEntry> {
        if entry.parent_pid == entry.pid {
            return None;
        }
        self.get(entry.parent_pid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
