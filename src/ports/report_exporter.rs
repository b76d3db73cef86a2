//! Report exporters
//!
//! Plain text in the `file:line:col: message` form of compilers and go vet,
//! or go vet's `-json` layout keyed by file and analyzer name.

use crate::api::dto::ReportDto;
use crate::domain::diagnostic::CheckReport;
use crate::ports::ReportExporter;
use anyhow::Context;

pub struct TextExporter;

impl ReportExporter for TextExporter {
    fn render(&self, report: &CheckReport) -> anyhow::Result<String> {
        Ok(Self::to_text(report))
    }
}

impl TextExporter {
    /// One line per diagnostic, each newline-terminated.
    pub fn to_text(report: &CheckReport) -> String {
        let mut out = String::new();
        for diagnostic in &report.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        out
    }
}

pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn render(&self, report: &CheckReport) -> anyhow::Result<String> {
        let dto = ReportDto::from(report);
        let mut json =
            serde_json::to_string_pretty(&dto).context("Failed to serialize report as JSON")?;
        json.push('\n');
        Ok(json)
    }
}
