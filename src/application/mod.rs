use crate::domain::analyzer::Analyzer;
use crate::domain::diagnostic::{CheckReport, Diagnostic, FileFailure};
use crate::domain::source::SourceUnit;
use crate::ports::SourceParser;
use rayon::prelude::*;

/// Parses and checks source units. Files are processed in parallel; the
/// report lists results in input order.
pub struct CheckUsecase<'a> {
    pub parser: &'a dyn SourceParser,
    pub analyzer: &'a Analyzer,
}

impl<'a> CheckUsecase<'a> {
    pub fn run(&self, units: &[SourceUnit]) -> CheckReport {
        let results: Vec<Result<Vec<Diagnostic>, FileFailure>> =
            units.par_iter().map(|unit| self.check_unit(unit)).collect();

        let mut report = CheckReport {
            files_checked: units.len(),
            ..CheckReport::default()
        };
        for result in results {
            match result {
                Ok(diagnostics) => report.diagnostics.extend(diagnostics),
                Err(failure) => report.failures.push(failure),
            }
        }

        log::info!(
            "checked {} files: {} diagnostics, {} failures",
            report.files_checked,
            report.diagnostics.len(),
            report.failures.len()
        );
        report
    }

    fn check_unit(&self, unit: &SourceUnit) -> Result<Vec<Diagnostic>, FileFailure> {
        let file = self.parser.parse(&unit.path, &unit.source).map_err(|e| {
            log::warn!("{}", e);
            FileFailure {
                path: unit.path.clone(),
                error: e.to_string(),
            }
        })?;

        let mut diagnostics = Vec::new();
        self.analyzer.check_file(&file, &mut diagnostics);
        Ok(diagnostics)
    }
}
