//! Statements and blocks.
//!
//! Every `parse_*_stmt` entry point stops before the terminating `;`;
//! `parse_stmt` consumes it so that `else` and clause bodies can be parsed
//! without one.

use super::{PResult, Parser, SyntaxError};
use crate::domain::ast::{
    AssignOp, BlockId, BranchKind, CaseClause, CommClause, DeclKind, ExprId, ExprKind, StmtId,
    StmtKind,
};
use crate::domain::source::Span;
use crate::infrastructure::lexer::TokenKind;

/// Result of parsing a simple statement. A range clause is only valid in
/// a `for` header, so it stays unallocated until the caller knows where
/// it is.
enum SimpleStmt {
    Plain(StmtKind, Span),
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
    },
}

enum ForHeader {
    Loop {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
    },
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
    },
}

impl Parser {
    pub(crate) fn parse_block(&mut self) -> PResult<BlockId> {
        let start = self.expect(TokenKind::LBrace, "block")?.span.start;
        let stmts = self.parse_stmt_list()?;
        self.expect(TokenKind::RBrace, "block")?;
        let span = self.span_from(start);
        Ok(self.alloc_block(stmts, span))
    }

    fn parse_stmt_list(&mut self) -> PResult<Vec<StmtId>> {
        let mut stmts = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::RBrace | TokenKind::Case | TokenKind::Default | TokenKind::Eof
        ) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> PResult<StmtId> {
        let start = self.start();
        let kind = match self.peek_kind() {
            TokenKind::Var => StmtKind::Decl(self.parse_gen_decl(DeclKind::Var)?),
            TokenKind::Const => StmtKind::Decl(self.parse_gen_decl(DeclKind::Const)?),
            TokenKind::Type => StmtKind::Decl(self.parse_gen_decl(DeclKind::Type)?),
            TokenKind::Ident if self.nth_kind(1) == TokenKind::Colon => {
                return self.parse_labeled_stmt();
            }
            TokenKind::Go => {
                self.bump();
                StmtKind::Go(self.parse_expr()?)
            }
            TokenKind::Defer => {
                self.bump();
                StmtKind::Defer(self.parse_expr()?)
            }
            TokenKind::Return => {
                self.bump();
                if matches!(self.peek_kind(), TokenKind::Semicolon | TokenKind::RBrace) {
                    StmtKind::Return(Vec::new())
                } else {
                    StmtKind::Return(self.parse_expr_list()?)
                }
            }
            TokenKind::Break => self.parse_branch(BranchKind::Break)?,
            TokenKind::Continue => self.parse_branch(BranchKind::Continue)?,
            TokenKind::Goto => self.parse_branch(BranchKind::Goto)?,
            TokenKind::Fallthrough => self.parse_branch(BranchKind::Fallthrough)?,
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::If => {
                let stmt = self.parse_if_stmt()?;
                self.expect_semi("if statement")?;
                return Ok(stmt);
            }
            TokenKind::Switch => self.parse_switch_stmt()?,
            TokenKind::Select => self.parse_select_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Semicolon => {
                let token = self.bump();
                return Ok(self.alloc_stmt(StmtKind::Empty, token.span));
            }
            _ => {
                let simple = self.parse_simple_stmt(false)?;
                let stmt = self.alloc_simple(simple)?;
                self.expect_semi("statement")?;
                return Ok(stmt);
            }
        };
        let span = self.span_from(start);
        self.expect_semi("statement")?;
        Ok(self.alloc_stmt(kind, span))
    }

    fn parse_labeled_stmt(&mut self) -> PResult<StmtId> {
        let label = self.parse_ident()?;
        let start = label.span.start;
        self.expect(TokenKind::Colon, "labeled statement")?;
        let stmt = if self.at(TokenKind::RBrace) {
            // `L: }` labels an empty statement.
            let at = self.peek().span.start as usize;
            self.alloc_stmt(StmtKind::Empty, Span::new(at, at))
        } else {
            self.parse_stmt()?
        };
        let span = self.span_from(start);
        Ok(self.alloc_stmt(StmtKind::Labeled { label, stmt }, span))
    }

    fn parse_branch(&mut self, kind: BranchKind) -> PResult<StmtKind> {
        self.bump();
        let label = if kind != BranchKind::Fallthrough && self.at(TokenKind::Ident) {
            Some(self.parse_ident()?)
        } else {
            None
        };
        Ok(StmtKind::Branch { kind, label })
    }

    fn parse_simple_stmt(&mut self, range_ok: bool) -> PResult<SimpleStmt> {
        let start = self.start();
        if range_ok && self.eat(TokenKind::Range) {
            let expr = self.parse_expr()?;
            return Ok(SimpleStmt::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let lhs = self.parse_expr_list()?;
        let kind = match self.peek_kind() {
            TokenKind::Assign | TokenKind::Define => {
                let define = self.bump().kind == TokenKind::Define;
                if range_ok && self.eat(TokenKind::Range) {
                    if lhs.len() > 2 {
                        return Err(SyntaxError::invalid(
                            "range clause permits at most two iteration variables",
                            self.ast[lhs[2]].span,
                        ));
                    }
                    let expr = self.parse_expr()?;
                    return Ok(SimpleStmt::Range {
                        key: lhs.first().copied(),
                        value: lhs.get(1).copied(),
                        define,
                        expr,
                    });
                }
                let rhs = self.parse_expr_list()?;
                let op = if define {
                    AssignOp::Define
                } else {
                    AssignOp::Assign
                };
                StmtKind::Assign { lhs, op, rhs }
            }
            TokenKind::OpAssign(op) => {
                self.bump();
                let rhs = self.parse_expr_list()?;
                StmtKind::Assign {
                    lhs,
                    op: AssignOp::Compound(op),
                    rhs,
                }
            }
            _ if lhs.len() > 1 => return Err(self.unexpected("':=' or '='")),
            TokenKind::Arrow => {
                self.bump();
                let value = self.parse_expr()?;
                StmtKind::Send {
                    chan: lhs[0],
                    value,
                }
            }
            TokenKind::Inc | TokenKind::Dec => {
                let increment = self.bump().kind == TokenKind::Inc;
                StmtKind::IncDec {
                    expr: lhs[0],
                    increment,
                }
            }
            _ => StmtKind::Expr(lhs[0]),
        };
        Ok(SimpleStmt::Plain(kind, self.span_from(start)))
    }

    fn alloc_simple(&mut self, simple: SimpleStmt) -> PResult<StmtId> {
        match simple {
            SimpleStmt::Plain(kind, span) => Ok(self.alloc_stmt(kind, span)),
            SimpleStmt::Range { expr, .. } => Err(SyntaxError::invalid(
                "range clause outside of for statement",
                self.ast[expr].span,
            )),
        }
    }

    /// Parses `if [init;] cond { ... } [else ...]`, leaving the trailing
    /// `;` to the caller.
    fn parse_if_stmt(&mut self) -> PResult<StmtId> {
        let if_token = self.expect(TokenKind::If, "if statement")?;
        let start = if_token.span.start;

        let (init, cond) = self.with_expr_lev(-1, |p| {
            if p.at(TokenKind::LBrace) {
                return Err(SyntaxError::invalid(
                    "missing condition in if statement",
                    if_token.span,
                ));
            }
            let mut init = None;
            let mut simple = None;
            if !p.at(TokenKind::Semicolon) {
                simple = Some(p.parse_simple_stmt(false)?);
            }
            if p.eat(TokenKind::Semicolon) {
                if let Some(s) = simple.take() {
                    init = Some(p.alloc_simple(s)?);
                }
                if p.at(TokenKind::LBrace) {
                    return Err(SyntaxError::invalid(
                        "missing condition in if statement",
                        if_token.span,
                    ));
                }
                return Ok((init, p.parse_expr()?));
            }
            match simple {
                Some(SimpleStmt::Plain(StmtKind::Expr(cond), _)) => Ok((init, cond)),
                Some(SimpleStmt::Plain(_, span)) => Err(SyntaxError::invalid(
                    "cannot use statement as value in if condition",
                    span,
                )),
                _ => Err(p.unexpected("if condition")),
            }
        })?;

        let then_block = self.parse_block()?;
        let else_stmt = if self.eat(TokenKind::Else) {
            match self.peek_kind() {
                TokenKind::If => Some(self.parse_if_stmt()?),
                TokenKind::LBrace => {
                    let else_start = self.start();
                    let block = self.parse_block()?;
                    let span = self.span_from(else_start);
                    Some(self.alloc_stmt(StmtKind::Block(block), span))
                }
                _ => return Err(self.unexpected("if statement or block after else")),
            }
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(self.alloc_stmt(
            StmtKind::If {
                init,
                cond,
                then_block,
                else_stmt,
            },
            span,
        ))
    }

    fn parse_switch_stmt(&mut self) -> PResult<StmtKind> {
        self.expect(TokenKind::Switch, "switch statement")?;

        let (init, guard) = self.with_expr_lev(-1, |p| {
            let mut init = None;
            let mut guard = None;
            if !p.at(TokenKind::LBrace) {
                if !p.at(TokenKind::Semicolon) {
                    guard = Some(p.parse_simple_stmt(false)?);
                }
                if p.eat(TokenKind::Semicolon) {
                    if let Some(s) = guard.take() {
                        init = Some(p.alloc_simple(s)?);
                    }
                    if !p.at(TokenKind::LBrace) {
                        guard = Some(p.parse_simple_stmt(false)?);
                    }
                }
            }
            Ok((init, guard))
        })?;

        self.expect(TokenKind::LBrace, "switch statement")?;
        let mut clauses = Vec::new();
        while matches!(self.peek_kind(), TokenKind::Case | TokenKind::Default) {
            clauses.push(self.parse_case_clause()?);
        }
        self.expect(TokenKind::RBrace, "switch statement")?;

        match guard {
            Some(SimpleStmt::Plain(kind, span)) if self.is_type_switch_guard(&kind) => {
                let assign = self.alloc_stmt(kind, span);
                Ok(StmtKind::TypeSwitch {
                    init,
                    assign,
                    clauses,
                })
            }
            Some(SimpleStmt::Plain(StmtKind::Expr(tag), _)) => Ok(StmtKind::Switch {
                init,
                tag: Some(tag),
                clauses,
            }),
            None => Ok(StmtKind::Switch {
                init,
                tag: None,
                clauses,
            }),
            Some(SimpleStmt::Plain(_, span)) => Err(SyntaxError::invalid(
                "switch expression must be an expression",
                span,
            )),
            Some(SimpleStmt::Range { expr, .. }) => Err(SyntaxError::invalid(
                "range clause outside of for statement",
                self.ast[expr].span,
            )),
        }
    }

    /// `x.(type)` or `v := x.(type)`.
    fn is_type_switch_guard(&self, kind: &StmtKind) -> bool {
        let is_type_assert =
            |e: ExprId| matches!(self.ast[e].kind, ExprKind::TypeAssert { ty: None, .. });
        match kind {
            StmtKind::Expr(e) => is_type_assert(*e),
            StmtKind::Assign {
                lhs,
                op: AssignOp::Define,
                rhs,
            } => lhs.len() == 1 && rhs.len() == 1 && is_type_assert(rhs[0]),
            _ => false,
        }
    }

    fn parse_case_clause(&mut self) -> PResult<CaseClause> {
        let (exprs, is_default) = if self.eat(TokenKind::Case) {
            (self.parse_expr_list()?, false)
        } else {
            self.expect(TokenKind::Default, "switch clause")?;
            (Vec::new(), true)
        };
        let colon = self.expect(TokenKind::Colon, "switch clause")?;
        let body = self.parse_clause_body(colon.span.end)?;
        Ok(CaseClause {
            exprs,
            is_default,
            body,
        })
    }

    fn parse_select_stmt(&mut self) -> PResult<StmtKind> {
        self.expect(TokenKind::Select, "select statement")?;
        self.expect(TokenKind::LBrace, "select statement")?;
        let mut clauses = Vec::new();
        while matches!(self.peek_kind(), TokenKind::Case | TokenKind::Default) {
            let comm = if self.eat(TokenKind::Case) {
                let simple = self.parse_simple_stmt(false)?;
                Some(self.alloc_simple(simple)?)
            } else {
                self.expect(TokenKind::Default, "select clause")?;
                None
            };
            let colon = self.expect(TokenKind::Colon, "select clause")?;
            let body = self.parse_clause_body(colon.span.end)?;
            clauses.push(CommClause { comm, body });
        }
        self.expect(TokenKind::RBrace, "select statement")?;
        Ok(StmtKind::Select { clauses })
    }

    /// Statements after `case ...:` up to the next clause, as a block.
    fn parse_clause_body(&mut self, start: u32) -> PResult<BlockId> {
        let stmts = self.parse_stmt_list()?;
        let span = self.span_from(start);
        Ok(self.alloc_block(stmts, span))
    }

    fn parse_for_stmt(&mut self) -> PResult<StmtKind> {
        self.expect(TokenKind::For, "for statement")?;

        let header = self.with_expr_lev(-1, |p| {
            if p.at(TokenKind::LBrace) {
                return Ok(ForHeader::Loop {
                    init: None,
                    cond: None,
                    post: None,
                });
            }

            let mut first = None;
            if !p.at(TokenKind::Semicolon) {
                match p.parse_simple_stmt(true)? {
                    SimpleStmt::Range {
                        key,
                        value,
                        define,
                        expr,
                    } => {
                        return Ok(ForHeader::Range {
                            key,
                            value,
                            define,
                            expr,
                        })
                    }
                    plain => first = Some(plain),
                }
            }

            if p.eat(TokenKind::Semicolon) {
                let init = match first {
                    Some(s) => Some(p.alloc_simple(s)?),
                    None => None,
                };
                let cond = if p.at(TokenKind::Semicolon) {
                    None
                } else {
                    Some(p.parse_expr()?)
                };
                p.expect(TokenKind::Semicolon, "for clause")?;
                let post = if p.at(TokenKind::LBrace) {
                    None
                } else {
                    let simple = p.parse_simple_stmt(false)?;
                    Some(p.alloc_simple(simple)?)
                };
                return Ok(ForHeader::Loop { init, cond, post });
            }

            match first {
                Some(SimpleStmt::Plain(StmtKind::Expr(cond), _)) => Ok(ForHeader::Loop {
                    init: None,
                    cond: Some(cond),
                    post: None,
                }),
                Some(SimpleStmt::Plain(_, span)) => Err(SyntaxError::invalid(
                    "expected for loop condition",
                    span,
                )),
                _ => Err(p.unexpected("for loop condition")),
            }
        })?;

        let body = self.parse_block()?;
        Ok(match header {
            ForHeader::Loop { init, cond, post } => StmtKind::For {
                init,
                cond,
                post,
                body,
            },
            ForHeader::Range {
                key,
                value,
                define,
                expr,
            } => StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::ast::StmtKind;
    use crate::domain::source::SourceFile;
    use crate::infrastructure::parser::parse_source;

    fn parse_body(body: &str) -> SourceFile {
        let src = format!("package p\nfunc f() {{\n{}\n}}\n", body);
        parse_source("s.go", &src).unwrap()
    }

    fn top_level(file: &SourceFile) -> Vec<&StmtKind> {
        let func = file.file.funcs().next().unwrap();
        let block = file.ast[func].body.unwrap();
        file.ast[block]
            .stmts
            .iter()
            .map(|&s| &file.ast[s].kind)
            .collect()
    }

    #[test]
    fn test_for_header_forms() {
        let file = parse_body(
            "\tfor {\n\t}\n\tfor ok {\n\t}\n\tfor ;; {\n\t}\n\tfor i := 0; i < n; i++ {\n\t}\n\tfor range ch {\n\t}\n\tfor _, v := range items {\n\t}",
        );
        let stmts = top_level(&file);
        assert!(matches!(stmts[0], StmtKind::For { cond: None, .. }));
        assert!(matches!(stmts[1], StmtKind::For { cond: Some(_), init: None, .. }));
        assert!(matches!(stmts[2], StmtKind::For { init: None, cond: None, post: None, .. }));
        assert!(matches!(stmts[3], StmtKind::For { init: Some(_), cond: Some(_), post: Some(_), .. }));
        assert!(matches!(stmts[4], StmtKind::Range { key: None, .. }));
        assert!(matches!(stmts[5], StmtKind::Range { key: Some(_), value: Some(_), define: true, .. }));
    }

    #[test]
    fn test_if_else_chain() {
        let file = parse_body(
            "\tif err := do(); err != nil {\n\t\treturn\n\t} else if x {\n\t} else {\n\t\tg()\n\t}",
        );
        let stmts = top_level(&file);
        let StmtKind::If { init, else_stmt, .. } = stmts[0] else {
            panic!("expected if");
        };
        assert!(init.is_some());
        let else_if = else_stmt.unwrap();
        let StmtKind::If { else_stmt, .. } = &file.ast[else_if].kind else {
            panic!("expected else if");
        };
        assert!(matches!(file.ast[else_stmt.unwrap()].kind, StmtKind::Block(_)));
    }

    #[test]
    fn test_case_bodies_are_blocks() {
        let file = parse_body("\tswitch {\n\tcase a:\n\t\tx()\n\t\ty()\n\tdefault:\n\t}");
        let stmts = top_level(&file);
        let StmtKind::Switch { tag, clauses, .. } = stmts[0] else {
            panic!("expected switch");
        };
        assert!(tag.is_none());
        assert_eq!(clauses.len(), 2);
        assert_eq!(file.ast[clauses[0].body].stmts.len(), 2);
        assert!(clauses[1].is_default);
        assert!(file.ast[clauses[1].body].stmts.is_empty());
    }

    #[test]
    fn test_label_before_closing_brace() {
        let file = parse_body("\t{\n\tdone:\n\t}");
        let stmts = top_level(&file);
        let StmtKind::Block(block) = stmts[0] else {
            panic!("expected block");
        };
        let inner = file.ast[*block].stmts[0];
        let StmtKind::Labeled { stmt, .. } = &file.ast[inner].kind else {
            panic!("expected labeled statement");
        };
        assert!(matches!(file.ast[*stmt].kind, StmtKind::Empty));
    }

    #[test]
    fn test_range_outside_for_is_rejected() {
        let src = "package p\nfunc f() {\n\tif x := range y; x {\n\t}\n}\n";
        assert!(parse_source("s.go", src).is_err());
    }

    #[test]
    fn test_send_and_inc_dec() {
        let file = parse_body("\tch <- v\n\tn--\n\ta, b = b, a\n\tx += 2");
        let stmts = top_level(&file);
        assert!(matches!(stmts[0], StmtKind::Send { .. }));
        assert!(matches!(stmts[1], StmtKind::IncDec { increment: false, .. }));
        assert!(matches!(stmts[2], StmtKind::Assign { .. }));
        assert!(matches!(stmts[3], StmtKind::Assign { .. }));
    }
}
