//! The `httpreturnchecker` analysis: handler detection, write
//! classification and the guard rule wired together per function.

use crate::domain::ast::{Ast, FuncId, StmtId};
use crate::domain::diagnostic::Reporter;
use crate::domain::guard::ControlFlowGuard;
use crate::domain::handler::HandlerDetector;
use crate::domain::source::SourceFile;
use crate::domain::walk::{walk_stmt, Owner, Visitor};
use crate::domain::write_call::WriteCallClassifier;
use crate::ports::DiagnosticSink;

pub const ANALYZER_NAME: &str = "httpreturnchecker";
pub const ANALYZER_DOC: &str =
    "checks for proper return statements after response writer operations in HTTP handlers";

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    detector: HandlerDetector,
}

impl Analyzer {
    pub fn new(detector: HandlerDetector) -> Self {
        Self { detector }
    }

    pub fn name(&self) -> &'static str {
        ANALYZER_NAME
    }

    pub fn doc(&self) -> &'static str {
        ANALYZER_DOC
    }

    /// Checks every function declaration of `file`, in source order.
    /// Returns the number of diagnostics reported.
    pub fn check_file(&self, file: &SourceFile, sink: &mut dyn DiagnosticSink) -> usize {
        let mut reporter = Reporter::new(file, sink);
        for func in file.file.funcs() {
            self.check_func(&file.ast, func, &mut reporter);
        }
        reporter.reported()
    }

    fn check_func(&self, ast: &Ast, func: FuncId, reporter: &mut Reporter<'_>) {
        let decl = &ast[func];
        let Some(writer) = self.detector.writer_name(ast, decl) else {
            return;
        };
        let Some(body) = decl.body else {
            return;
        };
        log::debug!("checking handler {} (writer {})", decl.name.name, writer);

        let mut checker = WriteChecker {
            classifier: WriteCallClassifier::new(writer),
            guard: ControlFlowGuard::for_body(ast, body),
            reporter,
        };
        checker.visit_block(ast, body);
    }
}

/// Offers every statement of a handler body, closures included, to the
/// classifier and checks each write found.
struct WriteChecker<'c, 'r, 'f> {
    classifier: WriteCallClassifier<'c>,
    guard: ControlFlowGuard,
    reporter: &'r mut Reporter<'f>,
}

impl Visitor for WriteChecker<'_, '_, '_> {
    fn visit_stmt(&mut self, ast: &Ast, stmt: StmtId, owner: Option<Owner>) {
        if self.classifier.is_write(ast, stmt) {
            match owner {
                Some(owner) => {
                    if !self.guard.is_guarded(ast, stmt, owner) {
                        self.reporter.unguarded_write(ast[stmt].span);
                    }
                }
                None => log::debug!("skipping write outside a block at {:?}", ast[stmt].span),
            }
        }
        walk_stmt(self, ast, stmt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostic::{Diagnostic, MESSAGE};
    use crate::infrastructure::parser::parse_source;

    fn check(src: &str) -> Vec<Diagnostic> {
        let file = parse_source("handler.go", src).unwrap();
        let mut diagnostics = Vec::new();
        let count = Analyzer::default().check_file(&file, &mut diagnostics);
        assert_eq!(count, diagnostics.len());
        diagnostics
    }

    fn handler(body: &str) -> String {
        format!(
            "package p\n\nimport \"net/http\"\n\nfunc Handle(w http.ResponseWriter, r *http.Request) {{\n{}\n}}\n",
            body
        )
    }

    fn lines(diagnostics: &[Diagnostic]) -> Vec<u32> {
        diagnostics.iter().map(|d| d.position.line).collect()
    }

    #[test]
    fn test_write_then_return() {
        assert!(check(&handler("\tw.Write([]byte(\"hello\"))\n\treturn")).is_empty());
    }

    #[test]
    fn test_sole_write() {
        assert!(check(&handler("\tw.Write([]byte(\"hello\"))")).is_empty());
    }

    #[test]
    fn test_write_then_other_call() {
        let diagnostics = check(&handler("\tw.Write([]byte(\"hello\"))\n\tlog.Println(\"done\")"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].position.line, 6);
        assert_eq!(diagnostics[0].position.column, 2);
        assert_eq!(diagnostics[0].message, MESSAGE);
    }

    #[test]
    fn test_branch_write_with_return_then_final_write() {
        let body = "\tif r.Method == \"POST\" {\n\t\tw.Write([]byte(\"post\"))\n\t\treturn\n\t}\n\tw.Write([]byte(\"get\"))";
        assert!(check(&handler(body)).is_empty());
    }

    #[test]
    fn test_unguarded_write_in_nested_branch() {
        let body = "\tif r.Method == \"POST\" {\n\t\tw.Write([]byte(\"post\"))\n\t\treturn\n\t}\n\tif r.Method == \"DELETE\" {\n\t\tw.Write([]byte(\"delete\"))\n\t}\n\tw.Write([]byte(\"get\"))";
        let diagnostics = check(&handler(body));
        assert_eq!(lines(&diagnostics), vec![11]);
        assert_eq!(diagnostics[0].position.column, 3);
    }

    #[test]
    fn test_other_namespace_is_not_checked() {
        let src = "package p\n\nfunc Handle(w other.ResponseWriter, r *http.Request) {\n\tw.Write(nil)\n\tlog.Println()\n}\n";
        assert!(check(src).is_empty());
    }

    #[test]
    fn test_trailing_declarations_do_not_hide_last_write() {
        assert!(check(&handler("\tw.WriteHeader(204)\n\tvar unused int\n\t;")).is_empty());
    }

    #[test]
    fn test_terminating_call_is_not_a_guard() {
        let diagnostics = check(&handler("\tw.WriteHeader(500)\n\tpanic(\"boom\")"));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_writes_in_closures_and_cases() {
        let body = "\tswitch r.Method {\n\tcase \"GET\":\n\t\tfmt.Fprintln(w, \"get\")\n\tdefault:\n\t\tw.WriteHeader(405)\n\t\treturn\n\t}\n\tfunc() {\n\t\tjson.NewEncoder(w).Encode(v)\n\t\tcleanup()\n\t}()\n\tlog.Println()";
        let diagnostics = check(&handler(body));
        assert_eq!(lines(&diagnostics), vec![14]);
    }

    #[test]
    fn test_trailing_switch_writes_are_not_reported() {
        let body = "\tswitch r.Method {\n\tcase \"GET\":\n\t\tw.Write(nil)\n\tdefault:\n\t\tw.WriteHeader(405)\n\t}";
        assert!(check(&handler(body)).is_empty());
    }

    #[test]
    fn test_case_writes_are_skipped_but_nested_blocks_are_checked() {
        let body = "\tselect {\n\tcase <-ctx.Done():\n\t\tw.WriteHeader(503)\n\t\tlog.Println()\n\tdefault:\n\t\tif err != nil {\n\t\t\tw.WriteHeader(500)\n\t\t}\n\t}\n\tlog.Println()";
        assert_eq!(lines(&check(&handler(body))), vec![12]);
    }

    #[test]
    fn test_closure_bound_by_var_is_checked() {
        let body = "\tvar f = func() {\n\t\tw.Write(nil)\n\t\tother()\n\t}\n\tf()";
        let diagnostics = check(&handler(body));
        assert_eq!(lines(&diagnostics), vec![7]);
        assert_eq!(diagnostics[0].position.column, 3);
    }

    #[test]
    fn test_writes_in_header_positions_are_skipped() {
        let body = "\tfor w.WriteHeader(200); ok; {\n\t}\nL:\n\tw.Write(nil)\n\tlog.Println()";
        assert!(check(&handler(body)).is_empty());
    }

    #[test]
    fn test_multiple_handlers_are_independent() {
        let src = "package p\n\nfunc A(w http.ResponseWriter, r *http.Request) {\n\tw.Write(nil)\n\tlog.Println()\n}\n\nfunc helper(w http.ResponseWriter) {\n\tw.Write(nil)\n\tlog.Println()\n}\n\nfunc B(w http.ResponseWriter, r *http.Request) {\n\tw.Write(nil)\n\tlog.Println()\n}\n";
        assert_eq!(lines(&check(src)), vec![4, 14]);
    }

    #[test]
    fn test_name_and_doc() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.name(), "httpreturnchecker");
        assert!(analyzer.doc().contains("HTTP handlers"));
    }
}
