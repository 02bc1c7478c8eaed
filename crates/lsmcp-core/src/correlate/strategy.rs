//! Per-record match strategies.
//!
//! A declared launch command rarely shows up verbatim in the process table.
//! Package runners re-exec through another binary and interpreters come in
//! interchangeable aliases, so one strategy is chosen per record up front
//! and then tested against every snapshot entry.

use crate::collect::{base_command_name, ProcessEntry};
use crate::version::VersionAnalyzer;
use lsmcp_config::ServerRecord;
use serde::Serialize;

/// Process bases that can host an npx-launched package.
const NPX_HOSTS: &[&str] = &["npm", "npx", "node"];

/// Interpreter families whose aliases are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpreterFamily {
    Python,
    Node,
    Ruby,
}

impl InterpreterFamily {
    /// Classify an executable base name (`python3.11`, `nodejs`, `ruby3.2`).
    pub fn classify(base: &str) -> Option<Self> {
        let base = base.to_ascii_lowercase();
        if base == "py" || versioned_alias(&base, "python") || versioned_alias(&base, "pythonw") {
            Some(InterpreterFamily::Python)
        } else if base == "node" || base == "nodejs" {
            Some(InterpreterFamily::Node)
        } else if versioned_alias(&base, "ruby") {
            Some(InterpreterFamily::Ruby)
        } else {
            None
        }
    }
}

/// `stem` followed by nothing or by a dotted version (`3`, `3.11`).
fn versioned_alias(name: &str, stem: &str) -> bool {
    match name.strip_prefix(stem) {
        Some("") => true,
        Some(rest) => {
            rest.starts_with(|c: char| c.is_ascii_digit())
                && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
        }
        None => false,
    }
}

/// How a configured server is recognized in the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// `uvx` servers run as `uv`; match on the identifying name.
    UvxRunner { name: String },
    /// `npx` servers run as npm/npx/node; match on the package name.
    NpxRunner { package: String },
    /// Same interpreter family, arguments compared by position.
    Interpreter {
        family: InterpreterFamily,
        args: Vec<String>,
    },
    /// Same executable base (lowercased), arguments compared by position.
    Positional { base: String, args: Vec<String> },
}

impl MatchStrategy {
    /// Pick the strategy for a record. `None` when the record has no
    /// command or a runner invocation names nothing to look for.
    pub fn select(record: &ServerRecord, versions: &VersionAnalyzer) -> Option<Self> {
        let command = record.command.trim();
        if command.is_empty() {
            return None;
        }
        let base = base_command_name(command).to_ascii_lowercase();

        match base.as_str() {
            "uvx" => uvx_server_name(&record.args).map(|name| MatchStrategy::UvxRunner { name }),
            "npx" => versions
                .npx_package_name(&record.args)
                .map(|package| MatchStrategy::NpxRunner { package }),
            _ => Some(match InterpreterFamily::classify(&base) {
                Some(family) => MatchStrategy::Interpreter {
                    family,
                    args: record.args.clone(),
                },
                None => MatchStrategy::Positional {
                    base: base.clone(),
                    args: record.args.clone(),
                },
            }),
        }
    }

    /// Whether a live process is the configured server. Executable names
    /// compare without regard to case.
    pub fn matches(&self, entry: &ProcessEntry) -> bool {
        let Some(process_base) = entry.base_command() else {
            return false;
        };
        let process_args = entry.args();

        match self {
            MatchStrategy::UvxRunner { name } => {
                process_base.eq_ignore_ascii_case("uv") && process_args.iter().any(|arg| arg.contains(name.as_str()))
            }
            MatchStrategy::NpxRunner { package } => {
                NPX_HOSTS.iter().any(|host| host.eq_ignore_ascii_case(process_base))
                    && process_args.iter().any(|arg| arg.contains(package.as_str()))
            }
            MatchStrategy::Interpreter { family, args } => {
                InterpreterFamily::classify(process_base) == Some(*family)
                    && positional_match(args, process_args)
            }
            MatchStrategy::Positional { base, args } => {
                process_base.eq_ignore_ascii_case(base) && positional_match(args, process_args)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::UvxRunner { .. } => "uvx",
            MatchStrategy::NpxRunner { .. } => "npx",
            MatchStrategy::Interpreter { .. } => "interpreter",
            MatchStrategy::Positional { .. } => "positional",
        }
    }
}

/// Every configured argument equals, or is contained in, the process
/// argument at the same offset.
fn positional_match(configured: &[String], process: &[String]) -> bool {
    process.len() >= configured.len()
        && configured
            .iter()
            .zip(process)
            .all(|(want, have)| have.contains(want.as_str()))
}

/// Identifying name of a `uvx` server.
///
/// The value after `--from`; else the sole argument; else the last argument
/// when the first is a flag; else the first argument.
pub fn uvx_server_name<S: AsRef<str>>(args: &[S]) -> Option<String> {
    if let Some(idx) = args.iter().position(|a| a.as_ref() == "--from") {
        if let Some(value) = args.get(idx + 1) {
            return Some(value.as_ref().to_string());
        }
    }
    let name = match args {
        [] => return None,
        [only] => only.as_ref(),
        [first, .., last] if first.as_ref().starts_with('-') => last.as_ref(),
        [first, ..] => first.as_ref(),
    };
    Some(name.to_string())
}
