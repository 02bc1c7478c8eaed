//! Report rendering for the terminal and for programs.

mod human;
mod json;

pub use human::{bar_widths, HumanRenderer};
pub use json::render_json;

use crate::scan::ScanReport;
use lsmcp_common::OutputFormat;

/// Render a report in the requested format.
pub fn render(report: &ScanReport, format: OutputFormat, color: bool) -> lsmcp_common::Result<String> {
    match format {
        OutputFormat::Human => Ok(HumanRenderer::new(color).render(report)),
        OutputFormat::Summary => {
            let mut text = HumanRenderer::new(color).render_summary(&report.summary);
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Json => Ok(render_json(report)?),
    }
}
