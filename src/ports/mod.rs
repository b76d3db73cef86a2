// Port traits for httpreturncheck.

use crate::domain::diagnostic::{CheckReport, Diagnostic};
use crate::domain::error::ParseError;
use crate::domain::source::SourceFile;
use std::path::Path;

pub mod report_exporter;

/// Turns Go source text into a syntax tree.
pub trait SourceParser: Send + Sync {
    fn parse(&self, filename: &str, source: &str) -> Result<SourceFile, ParseError>;
}

/// Receives diagnostics as soon as they are found.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

pub trait ReportExporter {
    fn render(&self, report: &CheckReport) -> anyhow::Result<String>;

    fn export(&self, report: &CheckReport, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;
        let content = self.render(report)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}
