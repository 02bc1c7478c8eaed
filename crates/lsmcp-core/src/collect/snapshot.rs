//! Process table snapshot via the platform listing command.
//!
//! # Platform Support
//! - Linux / macOS: `ps -eww -o pid=,ppid=,args=`
//! - Windows: `wmic process get ProcessId,ParentProcessId,CommandLine /format:csv`
//!
//! The listing runs under a watchdog. When it exceeds the timeout the child
//! is killed and [`SnapshotError::Timeout`] is returned.
//!
//! [`SnapshotOptions::with_command`] replaces the platform command with any
//! program printing `pid ppid args` rows.

use super::types::{ProcessEntry, ProcessSnapshot, SnapshotMetadata};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, span, Level};

/// Default listing timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

static PS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s+(\d+)\s+(.+)$").expect("valid ps line regex"));

/// A listing program run in place of the platform command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// Options for taking a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Kill the listing command after this long.
    pub timeout: Duration,
    /// Override for the platform listing command. Output is read as `ps` rows.
    pub command: Option<ListingCommand>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        SnapshotOptions {
            timeout: DEFAULT_TIMEOUT,
            command: None,
        }
    }
}

impl SnapshotOptions {
    pub fn with_timeout_ms(millis: u64) -> Self {
        SnapshotOptions {
            timeout: Duration::from_millis(millis),
            ..Default::default()
        }
    }

    /// Run `program` instead of the platform listing command.
    pub fn with_command<S: AsRef<str>>(mut self, program: impl Into<String>, args: &[S]) -> Self {
        self.command = Some(ListingCommand {
            program: program.into(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        });
        self
    }
}

/// Errors that can occur while listing processes.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to execute process listing: {0}")]
    CommandFailed(String),

    #[error("process listing timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

impl From<SnapshotError> for lsmcp_common::Error {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Timeout(d) => lsmcp_common::Error::ProcessListingTimeout {
                millis: d.as_millis() as u64,
            },
            SnapshotError::UnsupportedPlatform(p) => lsmcp_common::Error::UnsupportedPlatform(p),
            SnapshotError::IoError(e) => lsmcp_common::Error::Io(e),
            SnapshotError::CommandFailed(m) => lsmcp_common::Error::ProcessListing(m),
        }
    }
}

/// Source of process snapshots.
///
/// The correlation engine takes one snapshot per pass; tests substitute a
/// fixed snapshot.
pub trait SnapshotProvider {
    fn snapshot(&self) -> Result<ProcessSnapshot, SnapshotError>;
}

/// Lists processes with the platform's listing command.
#[derive(Debug, Clone, Default)]
pub struct PsProvider {
    pub options: SnapshotOptions,
}

impl PsProvider {
    pub fn new(options: SnapshotOptions) -> Self {
        PsProvider { options }
    }
}

impl SnapshotProvider for PsProvider {
    fn snapshot(&self) -> Result<ProcessSnapshot, SnapshotError> {
        take_snapshot(&self.options)
    }
}

/// A fixed snapshot, returned on every call.
#[derive(Debug, Clone)]
pub struct StaticProvider(pub ProcessSnapshot);

impl SnapshotProvider for StaticProvider {
    fn snapshot(&self) -> Result<ProcessSnapshot, SnapshotError> {
        Ok(self.0.clone())
    }
}

/// List running processes once.
pub fn take_snapshot(options: &SnapshotOptions) -> Result<ProcessSnapshot, SnapshotError> {
    let _span = span!(Level::DEBUG, "process_snapshot").entered();

    let start = Instant::now();
    let started_at = chrono::Utc::now().to_rfc3339();
    let platform = detect_platform();
    let (mut cmd, source) = match &options.command {
        Some(custom) => {
            let mut cmd = Command::new(&custom.program);
            cmd.args(&custom.args);
            (cmd, custom.program.clone())
        }
        None => build_listing_command(&platform)?,
    };
    debug!(platform = %platform, source = %source, "Listing processes");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| SnapshotError::CommandFailed(e.to_string()))?;

    let pid = child.id();
    let timeout = options.timeout;
    let finished = Arc::new(AtomicBool::new(false));
    let finished_clone = finished.clone();
    let timed_out = Arc::new(AtomicBool::new(false));
    let timed_out_clone = timed_out.clone();

    thread::spawn(move || {
        thread::sleep(timeout);
        if !finished_clone.load(Ordering::Relaxed) {
            timed_out_clone.store(true, Ordering::Relaxed);
            debug!("Process listing timed out, killing {}", pid);
            kill_listing(pid);
        }
    });

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| SnapshotError::CommandFailed("Failed to capture stdout".to_string()))?;

    let mut raw = Vec::new();
    let read_result = stdout.read_to_end(&mut raw);

    // Mark as finished before waiting, so we don't race with PID reuse
    finished.store(true, Ordering::Relaxed);
    let status = child.wait();

    if timed_out.load(Ordering::Relaxed) {
        return Err(SnapshotError::Timeout(timeout));
    }
    read_result?;
    let status = status?;
    if !status.success() && raw.is_empty() {
        return Err(SnapshotError::CommandFailed(format!(
            "{} exited with {}",
            source, status
        )));
    }

    let output = String::from_utf8_lossy(&raw);
    let (entries, warnings) = if source == "wmic" {
        parse_wmic_csv(&output)
    } else {
        parse_ps_output(&output)
    };

    let duration = start.elapsed();
    debug!(
        process_count = entries.len(),
        warnings = warnings.len(),
        duration_ms = duration.as_millis() as u64,
        "Process listing completed"
    );

    Ok(ProcessSnapshot::new(
        entries,
        SnapshotMetadata {
            platform,
            source,
            started_at,
            duration_ms: duration.as_millis() as u64,
            process_count: 0,
            warnings,
        },
    ))
}

#[cfg(unix)]
fn kill_listing(pid: u32) {
    unsafe {
        libc::kill(pid as i32, libc::SIGKILL);
    }
}

#[cfg(windows)]
fn kill_listing(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(not(any(unix, windows)))]
fn kill_listing(_pid: u32) {}

fn build_listing_command(platform: &str) -> Result<(Command, String), SnapshotError> {
    match platform {
        "linux" | "macos" | "freebsd" | "openbsd" | "netbsd" => {
            let mut cmd = Command::new("ps");
            cmd.args(["-eww", "-o", "pid=,ppid=,args="]);
            Ok((cmd, "ps".to_string()))
        }
        "windows" => {
            let mut cmd = Command::new("wmic");
            cmd.args([
                "process",
                "get",
                "ProcessId,ParentProcessId,CommandLine",
                "/format:csv",
            ]);
            Ok((cmd, "wmic".to_string()))
        }
        other => Err(SnapshotError::UnsupportedPlatform(other.to_string())),
    }
}

fn is_header_line(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    matches!(
        (parts.next(), parts.next()),
        (Some("PID"), Some("PPID")) | (Some("pid"), Some("ppid"))
    )
}

/// Parse `pid ppid args` lines. Unparseable lines become warnings.
pub fn parse_ps_output(output: &str) -> (Vec<ProcessEntry>, Vec<String>) {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    let mut header_checked = false;

    for (line_num, line) in output.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if !header_checked {
            header_checked = true;
            if is_header_line(line) {
                continue;
            }
        }

        let parsed = PS_LINE.captures(line).and_then(|caps| {
            let pid = caps[1].parse::<u32>().ok()?;
            let ppid = caps[2].parse::<u32>().ok()?;
            Some(ProcessEntry::new(pid, ppid, caps[3].trim()))
        });
        match parsed {
            Some(entry) => entries.push(entry),
            None => warnings.push(format!("Line {}: unrecognized ps row", line_num + 1)),
        }
    }

    (entries, warnings)
}

/// Parse `wmic ... /format:csv` output.
///
/// Columns are `Node,CommandLine,ParentProcessId,ProcessId`. The command
/// line may itself contain commas, so the pids are taken from the end.
pub fn parse_wmic_csv(output: &str) -> (Vec<ProcessEntry>, Vec<String>) {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for (line_num, line) in output.lines().enumerate() {
        let line = line.trim_end_matches('\r').trim();
        if line.is_empty() || line.starts_with("Node,") {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 4 {
            warnings.push(format!("Line {}: too few CSV fields", line_num + 1));
            continue;
        }
        let n = fields.len();
        let (Ok(ppid), Ok(pid)) = (fields[n - 2].trim().parse::<u32>(), fields[n - 1].trim().parse::<u32>())
        else {
            warnings.push(format!("Line {}: invalid process id", line_num + 1));
            continue;
        };
        let command_line = fields[1..n - 2].join(",");
        entries.push(ProcessEntry::new(pid, ppid, command_line.trim()));
    }

    (entries, warnings)
}

/// Detect the current platform.
pub fn detect_platform() -> String {
    #[cfg(target_os = "linux")]
    {
        "linux".to_string()
    }
    #[cfg(target_os = "macos")]
    {
        "macos".to_string()
    }
    #[cfg(target_os = "windows")]
    {
        "windows".to_string()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        std::env::consts::OS.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsmcp_common::ProcessId;

    #[test]
    fn test_header_detection() {
        assert!(is_header_line("  PID  PPID ARGS"));
        assert!(is_header_line("pid ppid args"));
        assert!(!is_header_line("  1     0 /sbin/init"));
    }

    #[test]
    fn test_parse_ps_output() {
        let output = "  PID  PPID COMMAND\n    1     0 /sbin/init splash\n  812     1 node /srv/server.js --port 3000\n";
        let (entries, warnings) = parse_ps_output(output);
        assert!(warnings.is_empty());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].pid, ProcessId(812));
        assert_eq!(entries[1].parent_pid, ProcessId(1));
        assert_eq!(entries[1].command_line, "node /srv/server.js --port 3000");
        assert_eq!(entries[1].base_command(), Some("node"));
    }

    #[test]
    fn test_parse_ps_output_without_header() {
        let (entries, _) = parse_ps_output("42 1 uvx mcp-server-fetch\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].args(), &["mcp-server-fetch".to_string()]);
    }

    #[test]
    fn test_parse_ps_output_bad_rows() {
        let (entries, warnings) = parse_ps_output("1 0 init\nnot a row\n99999999999 1 x\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_parse_wmic_csv() {
        let output = "\r\nNode,CommandLine,ParentProcessId,ProcessId\r\n\
HOST,,0,4\r\n\
HOST,\"C:\\Program Files\\nodejs\\node.exe\" server.js --tags a,b,100,2040\r\n";
        let (entries, warnings) = parse_wmic_csv(output);
        assert!(warnings.is_empty());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command_line, "");
        assert_eq!(entries[1].pid, ProcessId(2040));
        assert_eq!(entries[1].parent_pid, ProcessId(100));
        assert_eq!(
            entries[1].command_line,
            "\"C:\\Program Files\\nodejs\\node.exe\" server.js --tags a,b"
        );
        assert_eq!(entries[1].base_command(), Some("node"));
    }

    #[test]
    fn test_parse_wmic_csv_bad_rows() {
        let (entries, warnings) = parse_wmic_csv("HOST,x\nHOST,cmd,abc,1\n");
        assert!(entries.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_snapshot_error_mapping() {
        let err: lsmcp_common::Error = SnapshotError::Timeout(Duration::from_millis(250)).into();
        assert_eq!(err.code(), 31);
        let err: lsmcp_common::Error = SnapshotError::CommandFailed("boom".into()).into();
        assert_eq!(err.code(), 30);
    }

    #[test]
    fn test_static_provider() {
        let snapshot = ProcessSnapshot::new(
            vec![ProcessEntry::new(7, 1, "uvx tool")],
            SnapshotMetadata::default(),
        );
        let provider = StaticProvider(snapshot);
        assert_eq!(provider.snapshot().unwrap().len(), 1);
    }

    // =====================================================
    // No-mock tests using real processes
    // =====================================================

    #[cfg(unix)]
    #[test]
    fn test_nomock_snapshot_includes_self() {
        let platform = detect_platform();
        crate::test_log!(INFO, "snapshot no-mock test starting", platform = platform.as_str());

        let snapshot = take_snapshot(&SnapshotOptions::default());
        assert!(snapshot.is_ok(), "snapshot failed: {:?}", snapshot.err());
        let snapshot = snapshot.unwrap();

        let my_pid = ProcessId(std::process::id());
        let has_self = snapshot.get(my_pid).is_some();
        crate::test_log!(
            INFO,
            "snapshot completed",
            process_count = snapshot.len(),
            includes_self = has_self
        );
        assert!(has_self, "snapshot should include our own process");
        assert_eq!(snapshot.metadata.source, "ps");
        assert_eq!(snapshot.metadata.process_count, snapshot.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_nomock_slow_listing_times_out() {
        let options = SnapshotOptions::with_timeout_ms(50).with_command("sleep", &["5"]);
        let start = Instant::now();
        let result = take_snapshot(&options);
        crate::test_log!(INFO, "slow listing returned", elapsed_ms = start.elapsed().as_millis() as u64);

        match result {
            Err(SnapshotError::Timeout(d)) => assert_eq!(d, Duration::from_millis(50)),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(4), "listing was not killed");
    }

    #[cfg(unix)]
    #[test]
    fn test_nomock_custom_listing_command() {
        let options = SnapshotOptions::default()
            .with_command("printf", &["  PID  PPID ARGS\n   42     1 uv tool uvx mcp-server-fetch\n"]);
        let snapshot = take_snapshot(&options).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.metadata.source, "printf");
        assert_eq!(snapshot.get(ProcessId(42)).map(|e| e.parent_pid), Some(ProcessId(1)));
    }

    #[cfg(unix)]
    #[test]
    fn test_nomock_failing_listing_command() {
        let options = SnapshotOptions::default().with_command("false", &[] as &[&str]);
        assert!(matches!(take_snapshot(&options), Err(SnapshotError::CommandFailed(_))));
    }
}
