//! Diagnostics and the per-run report.

use crate::domain::source::{Position, SourceFile, Span};
use crate::ports::DiagnosticSink;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MESSAGE: &str =
    "response write operation must be followed by return unless it's the last statement";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(position: Position, message: &str) -> Self {
        Self {
            position,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Turns offending writes of one file into diagnostics for a sink.
pub struct Reporter<'a> {
    file: &'a SourceFile,
    sink: &'a mut dyn DiagnosticSink,
    reported: usize,
}

impl<'a> Reporter<'a> {
    pub fn new(file: &'a SourceFile, sink: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            file,
            sink,
            reported: 0,
        }
    }

    /// One diagnostic per call; nothing is merged or deduplicated.
    pub fn unguarded_write(&mut self, span: Span) {
        let diagnostic = Diagnostic::new(self.file.position(span), MESSAGE);
        log::debug!("{}", diagnostic);
        self.sink.report(diagnostic);
        self.reported += 1;
    }

    pub fn reported(&self) -> usize {
        self.reported
    }
}

/// A file that could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

/// Outcome of checking a set of files. Diagnostics are ordered by input
/// file, then by position of discovery within the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
    pub failures: Vec<FileFailure>,
    pub files_checked: usize,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.failures.is_empty()
    }

    /// Process exit status: 1 if any file failed, 3 if diagnostics were
    /// reported, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if !self.failures.is_empty() {
            1
        } else if !self.diagnostics.is_empty() {
            3
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(line: u32) -> Diagnostic {
        Diagnostic::new(Position::new("h.go", line, 2), MESSAGE)
    }

    #[test]
    fn test_display() {
        assert_eq!(
            diagnostic(7).to_string(),
            "h.go:7:2: response write operation must be followed by return unless it's the last statement"
        );
    }

    #[test]
    fn test_exit_codes() {
        let mut report = CheckReport::default();
        assert!(report.is_clean());
        assert_eq!(report.exit_code(), 0);

        report.diagnostics.push(diagnostic(3));
        assert_eq!(report.exit_code(), 3);

        report.failures.push(FileFailure {
            path: "bad.go".to_string(),
            error: "bad.go:1:1: expected 'package'".to_string(),
        });
        assert_eq!(report.exit_code(), 1);
        assert!(!report.is_clean());
    }
}
