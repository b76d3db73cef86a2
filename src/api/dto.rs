use crate::domain::analyzer::ANALYZER_NAME;
use crate::domain::diagnostic::{CheckReport, Diagnostic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticDto {
    pub posn: String,
    pub message: String,
}

/// `{ "<file>": { "<analyzer>": [diagnostic, ...] } }`, as printed by
/// `go vet -json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportDto {
    pub files: BTreeMap<String, BTreeMap<String, Vec<DiagnosticDto>>>,
}

impl From<&Diagnostic> for DiagnosticDto {
    fn from(diagnostic: &Diagnostic) -> Self {
        DiagnosticDto {
            posn: diagnostic.position.to_string(),
            message: diagnostic.message.clone(),
        }
    }
}

impl From<&CheckReport> for ReportDto {
    fn from(report: &CheckReport) -> Self {
        let mut files: BTreeMap<String, BTreeMap<String, Vec<DiagnosticDto>>> = BTreeMap::new();

        let mut diagnostics: Vec<&Diagnostic> = report.diagnostics.iter().collect();
        diagnostics.sort_by(|a, b| a.position.cmp(&b.position));

        for diagnostic in diagnostics {
            files
                .entry(diagnostic.position.filename.clone())
                .or_default()
                .entry(ANALYZER_NAME.to_string())
                .or_default()
                .push(DiagnosticDto::from(diagnostic));
        }

        ReportDto { files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostic::MESSAGE;
    use crate::domain::source::Position;

    #[test]
    fn test_diagnostics_sorted_within_file() {
        let report = CheckReport {
            diagnostics: vec![
                Diagnostic::new(Position::new("h.go", 20, 2), MESSAGE),
                Diagnostic::new(Position::new("h.go", 3, 2), MESSAGE),
            ],
            ..CheckReport::default()
        };
        let dto = ReportDto::from(&report);
        let posns: Vec<&str> = dto.files["h.go"][ANALYZER_NAME]
            .iter()
            .map(|d| d.posn.as_str())
            .collect();
        assert_eq!(posns, vec!["h.go:3:2", "h.go:20:2"]);
    }

    #[test]
    fn test_round_trips_through_json() {
        let report = CheckReport {
            diagnostics: vec![Diagnostic::new(Position::new("h.go", 1, 1), MESSAGE)],
            ..CheckReport::default()
        };
        let dto = ReportDto::from(&report);
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.starts_with("{\"h.go\":{\"httpreturnchecker\":[{\"posn\":\"h.go:1:1\""));
        let back: ReportDto = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dto);
    }
}
