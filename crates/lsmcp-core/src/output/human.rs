//! Terminal rendering.

use crate::correlate::ProbeStatus;
use crate::discovery::{ConfigFileReport, FileGroup};
use crate::pipeline::{ServerInfo, ServerStatus};
use crate::scan::ScanReport;
use crate::summary::SummaryStats;
use lsmcp_common::TransportKind;
use lsmcp_redact::OverallRisk;
use std::fmt::Write;

const INDENT: &str = "      ";
const BAR_WIDTH: usize = 20;

// ANSI SGR codes
const GREEN: &str = "32";
const BRIGHT_GREEN: &str = "92";
const RED: &str = "31";
const BRIGHT_RED: &str = "91";
const BLUE: &str = "34";
const MAGENTA: &str = "35";
const CYAN: &str = "36";
const YELLOW: &str = "33";
const BOLD: &str = "1";
const DIM: &str = "2";

/// Renders scan reports as text tables.
#[derive(Debug, Clone, Copy)]
pub struct HumanRenderer {
    color: bool,
}

impl HumanRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.color && !text.is_empty() {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    /// Full report: file blocks, server tables, then the summary.
    pub fn render(&self, report: &ScanReport) -> String {
        let mut out = String::new();

        if report.summary.files_found == 0 {
            out.push_str("No MCP configuration files found.\n");
        }

        let mut index = 0;
        for group in report.mcp_files.values() {
            for file in &group.paths {
                index += 1;
                self.render_file(&mut out, index, group, file);
                if !file.servers.is_empty() {
                    self.render_servers(&mut out, &file.servers);
                }
            }
        }

        if let ProbeStatus::Failed { reason } = &report.probe {
            let _ = writeln!(
                out,
                "\n{}",
                self.paint(&format!("Process status unavailable: {}", reason), YELLOW)
            );
        }

        out.push('\n');
        out.push_str(&self.render_summary(&report.summary));
        out.push('\n');
        out
    }

    fn render_file(&self, out: &mut String, index: usize, group: &FileGroup, file: &ConfigFileReport) {
        let parsable = if file.parsable {
            self.paint("✓ VALID", GREEN)
        } else {
            self.paint("✗ INVALID", RED)
        };
        let rows = [
            ("PROVIDER", group.friendly_name.clone()),
            ("FILE", file.file_path.display().to_string()),
            ("TYPE", file.scope.label().to_string()),
            ("PARSABLE", parsable),
        ];
        let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

        out.push('\n');
        for (i, (key, value)) in rows.iter().enumerate() {
            let lead = if i == 0 {
                format!("{:<width$}", format!("[{}]", index), width = INDENT.len())
            } else {
                INDENT.to_string()
            };
            let key = self.paint(&format!("{:<width$}", key, width = key_width), BOLD);
            let _ = writeln!(out, "{}{}  {}", lead, key, value);
        }
    }

    fn render_servers(&self, out: &mut String, servers: &[ServerInfo]) {
        const HEADERS: [&str; 6] = ["STATUS", "NAME", "TRANSPORT", "SOURCE", "VERSION", "CREDENTIALS"];
        const CENTERED: [bool; 6] = [true, false, true, false, false, false];

        let rows: Vec<[String; 6]> = servers
            .iter()
            .map(|s| {
                [
                    s.status.symbol().to_string(),
                    s.name.clone(),
                    s.transport.map(|t| t.label().to_string()).unwrap_or_default(),
                    s.source.clone(),
                    version_cell(s),
                    credential_cell(s),
                ]
            })
            .collect();

        let widths: Vec<usize> = (0..HEADERS.len())
            .map(|col| {
                rows.iter()
                    .map(|r| r[col].chars().count())
                    .chain(std::iter::once(HEADERS[col].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let total = widths.iter().sum::<usize>() + (widths.len() - 1) * 2;
        let separator = "─".repeat(total);

        let _ = writeln!(out, "\n{}{}", INDENT, separator);
        let header: Vec<String> = HEADERS
            .iter()
            .enumerate()
            .map(|(i, h)| self.paint(&align(h, widths[i], CENTERED[i]), BOLD))
            .collect();
        let _ = writeln!(out, "{}{}", INDENT, header.join("  ").trim_end());
        let _ = writeln!(out, "{}{}", INDENT, separator);

        for (server, row) in servers.iter().zip(&rows) {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let padded = align(cell, widths[i], CENTERED[i]);
                    match i {
                        0 => self.paint(&padded, status_color(server.status)),
                        1 => self.paint(&padded, CYAN),
                        2 => self.paint(&padded, transport_color(server.transport)),
                        4 if server.is_implicit_latest() => self.paint(&padded, RED),
                        4 => self.paint(&padded, GREEN),
                        5 => self.paint(&padded, risk_color(server.credentials.overall_risk_level)),
                        _ => padded,
                    }
                })
                .collect();
            let _ = writeln!(out, "{}{}", INDENT, cells.join("  ").trim_end());
        }
    }

    /// The SUMMARY block.
    pub fn render_summary(&self, stats: &SummaryStats) -> String {
        let total = stats.total_servers;
        let running = self.bar(stats.running_servers, total, BRIGHT_GREEN, GREEN);
        let security = self.bar(stats.high_risk_credentials, total, BRIGHT_RED, RED);
        let version = self.bar(stats.implicit_latest_versions, total, BRIGHT_RED, RED);
        let t = &stats.transport_breakdown;

        let mut lines = vec![
            self.paint("SUMMARY", BOLD),
            format!("{INDENT}SERVERS     {running} {} / {total} Running", stats.running_servers),
            format!(
                "{INDENT}SECURITY    {security} {} / {total} High Risk Credentials",
                stats.high_risk_credentials
            ),
            format!(
                "{INDENT}VERSION     {version} {} / {total} Implicit Latest",
                stats.implicit_latest_versions
            ),
            format!(
                "{INDENT}TRANSPORT   stdio: {} | SSE: {} | HTTP: {}",
                t.stdio, t.sse, t.http
            ),
        ];
        if stats.unknown_status > 0 {
            lines.push(self.paint(
                &format!("{INDENT}            {} / {total} status unknown", stats.unknown_status),
                DIM,
            ));
        }
        lines.join("\n")
    }

    fn bar(&self, count: usize, total: usize, filled_code: &str, empty_code: &str) -> String {
        let (filled, empty) = bar_widths(count, total, BAR_WIDTH);
        format!(
            "{}{}",
            self.paint(&"█".repeat(filled), filled_code),
            self.paint(&"░".repeat(empty), empty_code)
        )
    }
}

/// Filled and empty cell counts for a progress bar.
pub fn bar_widths(count: usize, total: usize, width: usize) -> (usize, usize) {
    if total == 0 {
        return (0, width);
    }
    let progress = (count as f64 / total as f64).min(1.0);
    let filled = (progress * width as f64).round() as usize;
    (filled, width - filled)
}

fn align(text: &str, width: usize, center: bool) -> String {
    let len = text.chars().count();
    let pad = width.saturating_sub(len);
    if center {
        let left = pad / 2;
        format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
    } else {
        format!("{}{}", text, " ".repeat(pad))
    }
}

fn version_cell(server: &ServerInfo) -> String {
    match &server.version_info {
        None => String::new(),
        Some(v) if v.is_pinned => format!("● {}", v.version.as_deref().unwrap_or_default()),
        Some(_) => "● LATEST".to_string(),
    }
}

fn credential_cell(server: &ServerInfo) -> String {
    let creds = &server.credentials;
    if !creds.has_credentials {
        return String::new();
    }
    let names: Vec<String> = creds
        .findings
        .iter()
        .map(|f| format!("{}={}", f.name, f.masked_value))
        .collect();
    format!(
        "{} RISK ({} cred vars: {})",
        creds.overall_risk_level.to_string().to_uppercase(),
        creds.findings.len(),
        names.join(", ")
    )
}

fn status_color(status: ServerStatus) -> &'static str {
    match status {
        ServerStatus::Running => GREEN,
        ServerStatus::Stopped => RED,
        ServerStatus::Unknown => YELLOW,
    }
}

fn transport_color(transport: Option<TransportKind>) -> &'static str {
    match transport {
        Some(TransportKind::Stdio) => MAGENTA,
        Some(TransportKind::Sse) => BLUE,
        Some(TransportKind::Http) => CYAN,
        None => DIM,
    }
}

fn risk_color(risk: OverallRisk) -> &'static str {
    match risk {
        OverallRisk::High => RED,
        OverallRisk::Low => BLUE,
        OverallRisk::None => DIM,
    }
}
