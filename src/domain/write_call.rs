//! Classification of statements that write to the response writer.

use crate::domain::ast::{Ast, ExprId, ExprKind, StmtId, StmtKind};

/// An indirect write: `package.member(..., w, ...)` with the writer at
/// argument `writer_arg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteIdiom {
    pub package: &'static str,
    pub member: &'static str,
    pub writer_arg: usize,
}

const fn idiom(package: &'static str, member: &'static str, writer_arg: usize) -> WriteIdiom {
    WriteIdiom {
        package,
        member,
        writer_arg,
    }
}

pub const WRITE_IDIOMS: &[WriteIdiom] = &[
    idiom("json", "NewEncoder", 0),
    idiom("fmt", "Fprintf", 0),
    idiom("fmt", "Fprint", 0),
    idiom("fmt", "Fprintln", 0),
    idiom("io", "Copy", 0),
    // github.com/go-chi/render
    idiom("render", "Render", 0),
];

/// Decides whether a statement writes to the writer bound to `writer`.
///
/// A statement is a write when it is a call expression and either
/// - the callee is a member of the writer itself (`w.Write(..)`,
///   `w.WriteHeader(..)`, any member),
/// - the call matches an entry of the idiom table with the writer
///   identifier passed at the entry's argument index, or
/// - the call is made on the result of such an idiom call
///   (`json.NewEncoder(w).Encode(v)`).
///
/// Only the bare identifier is recognised as the writer; `(w)`, conversions
/// and aliases are not.
#[derive(Debug, Clone)]
pub struct WriteCallClassifier<'a> {
    writer: &'a str,
    idioms: &'static [WriteIdiom],
}

impl<'a> WriteCallClassifier<'a> {
    pub fn new(writer: &'a str) -> Self {
        Self::with_idioms(writer, WRITE_IDIOMS)
    }

    pub fn with_idioms(writer: &'a str, idioms: &'static [WriteIdiom]) -> Self {
        Self { writer, idioms }
    }

    pub fn is_write(&self, ast: &Ast, stmt: StmtId) -> bool {
        match ast[stmt].kind {
            StmtKind::Expr(expr) => self.is_write_call(ast, expr),
            _ => false,
        }
    }

    pub fn is_write_call(&self, ast: &Ast, expr: ExprId) -> bool {
        let ExprKind::Call { fun, .. } = &ast[expr].kind else {
            return false;
        };
        let ExprKind::Selector { x, .. } = &ast[*fun].kind else {
            return false;
        };
        if ast.ident_name(*x) == Some(self.writer) {
            return true;
        }
        self.idiom_for(ast, expr).is_some() || self.is_idiom_chain(ast, *x)
    }

    /// The table entry matched by `expr`, if any.
    pub fn idiom_for(&self, ast: &Ast, expr: ExprId) -> Option<&'static WriteIdiom> {
        let ExprKind::Call { fun, args, .. } = &ast[expr].kind else {
            return None;
        };
        let ExprKind::Selector { x, sel } = &ast[*fun].kind else {
            return None;
        };
        let package = ast.ident_name(*x)?;
        self.idioms.iter().find(|idiom| {
            idiom.package == package
                && idiom.member == sel.name
                && args
                    .get(idiom.writer_arg)
                    .is_some_and(|&arg| ast.ident_name(arg) == Some(self.writer))
        })
    }

    /// `receiver` is an idiom call, or a call chained on one.
    fn is_idiom_chain(&self, ast: &Ast, receiver: ExprId) -> bool {
        if self.idiom_for(ast, receiver).is_some() {
            return true;
        }
        match &ast[receiver].kind {
            ExprKind::Call { fun, .. } => match &ast[*fun].kind {
                ExprKind::Selector { x, .. } => self.is_idiom_chain(ast, *x),
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::source::SourceFile;
    use crate::infrastructure::parser::parse_source;

    /// Classifies every top-level statement of a handler body.
    fn classify(body: &str) -> Vec<bool> {
        let src = format!(
            "package p\n\nfunc h(w http.ResponseWriter, r *http.Request) {{\n{}\n}}\n",
            body
        );
        let file: SourceFile = parse_source("write.go", &src).unwrap();
        let func = file.file.funcs().next().unwrap();
        let block = file.ast[func].body.unwrap();
        let classifier = WriteCallClassifier::new("w");
        file.ast[block]
            .stmts
            .iter()
            .map(|&s| classifier.is_write(&file.ast, s))
            .collect()
    }

    #[test]
    fn test_direct_writer_calls() {
        assert_eq!(
            classify("\tw.Write([]byte(\"x\"))\n\tw.WriteHeader(http.StatusOK)\n\tw.Flush()"),
            vec![true, true, true]
        );
    }

    #[test]
    fn test_idiom_table() {
        assert_eq!(
            classify(
                "\tfmt.Fprintf(w, \"%d\", 1)\n\tfmt.Fprint(w, 1)\n\tfmt.Fprintln(w)\n\tio.Copy(w, body)\n\trender.Render(w, r, v)\n\tjson.NewEncoder(w)"
            ),
            vec![true; 6]
        );
    }

    #[test]
    fn test_chained_idiom_call() {
        assert_eq!(
            classify("\tjson.NewEncoder(w).Encode(v)\n\tjson.NewEncoder(buf).Encode(v)"),
            vec![true, false]
        );
    }

    #[test]
    fn test_chain_on_direct_writer_call_is_not_a_write() {
        assert_eq!(classify("\tw.Header().Set(\"k\", \"v\")"), vec![false]);
    }

    #[test]
    fn test_non_writes() {
        assert_eq!(
            classify(
                "\tfmt.Fprintf(os.Stderr, \"x\")\n\tfmt.Printf(\"%v\", w)\n\tio.Copy(dst, w)\n\tlog.Println(w)\n\tfmt.Fprintf((w), \"x\")\n\thelper(w)\n\tx := w\n\tdefer w.Write(nil)"
            ),
            vec![false; 8]
        );
    }

    #[test]
    fn test_other_writer_name() {
        let src = "package p\nfunc h(rw http.ResponseWriter, r *http.Request) {\n\tw.Write(nil)\n\trw.Write(nil)\n}\n";
        let file = parse_source("write.go", src).unwrap();
        let func = file.file.funcs().next().unwrap();
        let block = file.ast[func].body.unwrap();
        let classifier = WriteCallClassifier::new("rw");
        let writes: Vec<bool> = file.ast[block]
            .stmts
            .iter()
            .map(|&s| classifier.is_write(&file.ast, s))
            .collect();
        assert_eq!(writes, vec![false, true]);
    }
}
