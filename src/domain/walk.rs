//! Preorder traversal over a function body.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to keep descending. Every statement is
//! visited together with the block that directly owns it, if any.

use crate::domain::ast::{Ast, BlockId, ExprId, ExprKind, Spec, StmtId, StmtKind};

/// The block directly containing a statement and the statement's index in
/// that block's statement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub block: BlockId,
    pub index: usize,
}

pub trait Visitor {
    fn visit_block(&mut self, ast: &Ast, block: BlockId) {
        walk_block(self, ast, block);
    }

    /// `owner` is None for statements that sit in a header or clause slot
    /// rather than in a braced block: `if`/`for`/`switch` init and post
    /// statements, the statement after a label, `select` communications
    /// and the statements of a `case` or `default` clause body.
    fn visit_stmt(&mut self, ast: &Ast, stmt: StmtId, owner: Option<Owner>) {
        let _ = owner;
        walk_stmt(self, ast, stmt);
    }

    fn visit_expr(&mut self, ast: &Ast, expr: ExprId) {
        walk_expr(self, ast, expr);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, ast: &Ast, block: BlockId) {
    for (index, &stmt) in ast[block].stmts.iter().enumerate() {
        v.visit_stmt(ast, stmt, Some(Owner { block, index }));
    }
}

/// A clause body is a statement list, not a braced block, so its
/// statements have no owner.
fn walk_clause_body<V: Visitor + ?Sized>(v: &mut V, ast: &Ast, body: BlockId) {
    for &stmt in &ast[body].stmts {
        v.visit_stmt(ast, stmt, None);
    }
}

/// Descends into the children of `stmt`; the statement itself has already
/// been visited.
pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, ast: &Ast, stmt: StmtId) {
    match &ast[stmt].kind {
        StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => v.visit_expr(ast, *e),
        StmtKind::Return(results) => {
            for &e in results {
                v.visit_expr(ast, e);
            }
        }
        StmtKind::Empty | StmtKind::Branch { .. } => {}
        StmtKind::Decl(gen) => {
            for spec in &gen.specs {
                if let Spec::Value { values, .. } = spec {
                    for &e in values {
                        v.visit_expr(ast, e);
                    }
                }
            }
        }
        StmtKind::Assign { lhs, rhs, .. } => {
            for &e in lhs.iter().chain(rhs) {
                v.visit_expr(ast, e);
            }
        }
        StmtKind::IncDec { expr, .. } => v.visit_expr(ast, *expr),
        StmtKind::Send { chan, value } => {
            v.visit_expr(ast, *chan);
            v.visit_expr(ast, *value);
        }
        StmtKind::Labeled { stmt, .. } => v.visit_stmt(ast, *stmt, None),
        StmtKind::Block(block) => v.visit_block(ast, *block),
        StmtKind::If {
            init,
            cond,
            then_block,
            else_stmt,
        } => {
            if let Some(init) = init {
                v.visit_stmt(ast, *init, None);
            }
            v.visit_expr(ast, *cond);
            v.visit_block(ast, *then_block);
            if let Some(else_stmt) = else_stmt {
                v.visit_stmt(ast, *else_stmt, None);
            }
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt(ast, *init, None);
            }
            if let Some(cond) = cond {
                v.visit_expr(ast, *cond);
            }
            if let Some(post) = post {
                v.visit_stmt(ast, *post, None);
            }
            v.visit_block(ast, *body);
        }
        StmtKind::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            for e in key.iter().chain(value) {
                v.visit_expr(ast, *e);
            }
            v.visit_expr(ast, *expr);
            v.visit_block(ast, *body);
        }
        StmtKind::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                v.visit_stmt(ast, *init, None);
            }
            if let Some(tag) = tag {
                v.visit_expr(ast, *tag);
            }
            for clause in clauses {
                for &e in &clause.exprs {
                    v.visit_expr(ast, e);
                }
                walk_clause_body(v, ast, clause.body);
            }
        }
        StmtKind::TypeSwitch {
            init,
            assign,
            clauses,
        } => {
            if let Some(init) = init {
                v.visit_stmt(ast, *init, None);
            }
            v.visit_stmt(ast, *assign, None);
            for clause in clauses {
                walk_clause_body(v, ast, clause.body);
            }
        }
        StmtKind::Select { clauses } => {
            for clause in clauses {
                if let Some(comm) = clause.comm {
                    v.visit_stmt(ast, comm, None);
                }
                walk_clause_body(v, ast, clause.body);
            }
        }
    }
}

/// Descends into sub-expressions. Type expressions are not walked, except
/// that function literal bodies are entered.
pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, ast: &Ast, expr: ExprId) {
    match &ast[expr].kind {
        ExprKind::FuncLit { body, .. } => v.visit_block(ast, *body),
        ExprKind::CompositeLit { elts, .. } => {
            for &e in elts {
                v.visit_expr(ast, e);
            }
        }
        ExprKind::Paren(x) | ExprKind::Star(x) | ExprKind::Unary { x, .. } => v.visit_expr(ast, *x),
        ExprKind::Selector { x, .. } | ExprKind::TypeAssert { x, .. } => v.visit_expr(ast, *x),
        ExprKind::Index { x, indices } => {
            v.visit_expr(ast, *x);
            for &e in indices {
                v.visit_expr(ast, e);
            }
        }
        ExprKind::Slice { x, low, high, max } => {
            v.visit_expr(ast, *x);
            for e in [low, high, max].into_iter().flatten() {
                v.visit_expr(ast, *e);
            }
        }
        ExprKind::Call { fun, args, .. } => {
            v.visit_expr(ast, *fun);
            for &e in args {
                v.visit_expr(ast, e);
            }
        }
        ExprKind::Binary { x, y, .. } => {
            v.visit_expr(ast, *x);
            v.visit_expr(ast, *y);
        }
        ExprKind::KeyValue { key, value } => {
            v.visit_expr(ast, *key);
            v.visit_expr(ast, *value);
        }
        ExprKind::Ident(_)
        | ExprKind::BasicLit { .. }
        | ExprKind::ArrayType { .. }
        | ExprKind::Ellipsis(_)
        | ExprKind::MapType { .. }
        | ExprKind::ChanType { .. }
        | ExprKind::FuncType(_)
        | ExprKind::StructType(_)
        | ExprKind::InterfaceType(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parser::parse_source;

    #[derive(Default)]
    struct StmtCollector {
        seen: Vec<(StmtId, Option<Owner>)>,
    }

    impl Visitor for StmtCollector {
        fn visit_stmt(&mut self, ast: &Ast, stmt: StmtId, owner: Option<Owner>) {
            self.seen.push((stmt, owner));
            walk_stmt(self, ast, stmt);
        }
    }

    fn collect(src: &str) -> (crate::domain::source::SourceFile, StmtCollector) {
        let file = parse_source("walk.go", src).unwrap();
        let func = file.file.funcs().next().unwrap();
        let body = file.ast[func].body.unwrap();
        let mut collector = StmtCollector::default();
        collector.visit_block(&file.ast, body);
        (file, collector)
    }

    #[test]
    fn test_preorder_with_owners() {
        let (file, collector) = collect(
            "package p\nfunc f() {\n\ta()\n\tif x {\n\t\tb()\n\t}\n\tc()\n}\n",
        );
        assert_eq!(collector.seen.len(), 4);
        let func = file.file.funcs().next().unwrap();
        let body = file.ast[func].body.unwrap();
        assert_eq!(collector.seen[0].1, Some(Owner { block: body, index: 0 }));
        assert_eq!(collector.seen[1].1, Some(Owner { block: body, index: 1 }));
        // b() is owned by the then-block at index 0
        let inner = collector.seen[2].1.unwrap();
        assert_ne!(inner.block, body);
        assert_eq!(inner.index, 0);
        assert_eq!(collector.seen[3].1, Some(Owner { block: body, index: 2 }));
    }

    #[test]
    fn test_header_and_labeled_statements_have_no_owner() {
        let (file, collector) = collect(
            "package p\nfunc f() {\n\tif v := g(); v {\n\t}\nL:\n\th()\n}\n",
        );
        let unowned: Vec<String> = collector
            .seen
            .iter()
            .filter(|(_, owner)| owner.is_none())
            .map(|(s, _)| format!("{:?}", file.ast[*s].kind))
            .collect();
        assert_eq!(unowned.len(), 2);
        assert!(unowned[0].starts_with("Assign"));
        assert!(unowned[1].starts_with("Expr"));
    }

    #[test]
    fn test_enters_function_literals_and_clause_bodies() {
        let (_, collector) = collect(
            "package p\nfunc f() {\n\tgo func() {\n\t\ta()\n\t}()\n\tswitch {\n\tcase x:\n\t\tb()\n\t}\n\tselect {\n\tcase <-ch:\n\t\tc()\n\t}\n}\n",
        );
        // go, a(), switch, b(), select, <-ch, c()
        assert_eq!(collector.seen.len(), 7);
        let owned = collector.seen.iter().filter(|(_, o)| o.is_some()).count();
        // go, a(), switch, select
        assert_eq!(owned, 4);
    }

    #[test]
    fn test_clause_statements_have_no_owner_but_nested_blocks_do() {
        let (_, collector) = collect(
            "package p\nfunc f() {\n\tswitch x {\n\tcase 1:\n\t\ta()\n\t\tif y {\n\t\t\tb()\n\t\t}\n\tdefault:\n\t\tc()\n\t}\n}\n",
        );
        // switch, a(), if, b(), c()
        let owners: Vec<bool> = collector.seen.iter().map(|(_, o)| o.is_some()).collect();
        assert_eq!(owners, vec![true, false, false, true, false]);
    }

    #[test]
    fn test_enters_function_literals_in_declarations() {
        let (_, collector) = collect(
            "package p\nfunc f() {\n\tvar g = func() {\n\t\ta()\n\t}\n\tg()\n}\n",
        );
        // var, a(), g()
        assert_eq!(collector.seen.len(), 3);
        assert!(collector.seen[1].1.is_some());
    }
}
