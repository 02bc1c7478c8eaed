//! JSON report rendering.

use crate::scan::ScanReport;

/// Pretty-printed JSON for a report.
pub fn render_json(report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
