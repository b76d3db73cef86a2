//! Expressions: precedence climbing over unary and primary expressions.

use super::{PResult, Parser};
use crate::domain::ast::{BinaryOp, ChanDir, ExprId, ExprKind, LitKind, UnaryOp};
use crate::infrastructure::lexer::TokenKind;

impl Parser {
    pub(crate) fn parse_expr_list(&mut self) -> PResult<Vec<ExprId>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    pub(crate) fn parse_expr(&mut self) -> PResult<ExprId> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<ExprId> {
        let start = self.start();
        let mut x = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Op(op) if op.precedence() >= min_prec => op,
                _ => return Ok(x),
            };
            self.bump();
            let y = self.parse_binary(op.precedence() + 1)?;
            let span = self.span_from(start);
            x = self.alloc_expr(ExprKind::Binary { op, x, y }, span);
        }
    }

    pub(crate) fn parse_unary(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let op = match self.peek_kind() {
            TokenKind::Op(BinaryOp::Add) => UnaryOp::Pos,
            TokenKind::Op(BinaryOp::Sub) => UnaryOp::Neg,
            TokenKind::Op(BinaryOp::Xor) => UnaryOp::Xor,
            TokenKind::Op(BinaryOp::And) => UnaryOp::Addr,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::Tilde,
            TokenKind::Op(BinaryOp::Mul) => {
                self.bump();
                let x = self.parse_unary()?;
                let span = self.span_from(start);
                return Ok(self.alloc_expr(ExprKind::Star(x), span));
            }
            TokenKind::Arrow => {
                self.bump();
                if self.eat(TokenKind::Chan) {
                    // `<-chan T` used as a type in expression position.
                    let value = self.parse_type()?;
                    let span = self.span_from(start);
                    return Ok(self.alloc_expr(
                        ExprKind::ChanType {
                            dir: ChanDir::Recv,
                            value,
                        },
                        span,
                    ));
                }
                let x = self.parse_unary()?;
                let span = self.span_from(start);
                return Ok(self.alloc_expr(
                    ExprKind::Unary {
                        op: UnaryOp::Recv,
                        x,
                    },
                    span,
                ));
            }
            _ => return self.parse_primary_expr(),
        };
        self.bump();
        let x = self.parse_unary()?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::Unary { op, x }, span))
    }

    fn parse_primary_expr(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let mut x = self.parse_operand()?;
        loop {
            x = match self.peek_kind() {
                TokenKind::Period => {
                    self.bump();
                    match self.peek_kind() {
                        TokenKind::Ident => {
                            let sel = self.parse_ident()?;
                            let span = self.span_from(start);
                            self.alloc_expr(ExprKind::Selector { x, sel }, span)
                        }
                        TokenKind::LParen => {
                            self.bump();
                            let ty = if self.eat(TokenKind::Type) {
                                None
                            } else {
                                Some(self.nested(|p| p.parse_type())?)
                            };
                            self.expect(TokenKind::RParen, "type assertion")?;
                            let span = self.span_from(start);
                            self.alloc_expr(ExprKind::TypeAssert { x, ty }, span)
                        }
                        _ => return Err(self.unexpected("selector or type assertion")),
                    }
                }
                TokenKind::LBrack => self.parse_index_or_slice(x, start)?,
                TokenKind::LParen => self.parse_call(x, start)?,
                TokenKind::LBrace if self.composite_literal_allowed(x) => {
                    self.parse_literal_value(Some(x))?
                }
                _ => return Ok(x),
            };
        }
    }

    /// `T{` starts a composite literal only where it cannot be mistaken
    /// for the block of an `if`, `for` or `switch`.
    fn composite_literal_allowed(&self, x: ExprId) -> bool {
        match &self.ast[x].kind {
            ExprKind::Ident(_) | ExprKind::Selector { .. } | ExprKind::Index { .. } => {
                self.expr_lev >= 0
            }
            ExprKind::ArrayType { .. } | ExprKind::StructType(_) | ExprKind::MapType { .. } => true,
            _ => false,
        }
    }

    fn parse_index_or_slice(&mut self, x: ExprId, start: u32) -> PResult<ExprId> {
        self.expect(TokenKind::LBrack, "index expression")?;
        let kind = self.nested(|p| {
            let mut parts: [Option<ExprId>; 3] = [None; 3];
            let mut colons = 0;
            if !p.at(TokenKind::Colon) {
                parts[0] = Some(p.parse_expr()?);
            }
            while colons < 2 && p.eat(TokenKind::Colon) {
                colons += 1;
                if !p.at(TokenKind::Colon) && !p.at(TokenKind::RBrack) {
                    parts[colons] = Some(p.parse_expr()?);
                }
            }

            if colons > 0 {
                return Ok(ExprKind::Slice {
                    x,
                    low: parts[0],
                    high: parts[1],
                    max: parts[2],
                });
            }

            let mut indices: Vec<ExprId> = parts[0].into_iter().collect();
            while p.eat(TokenKind::Comma) {
                if p.at(TokenKind::RBrack) {
                    break;
                }
                indices.push(p.parse_expr()?);
            }
            if indices.is_empty() {
                return Err(p.unexpected("index expression"));
            }
            Ok(ExprKind::Index { x, indices })
        })?;
        self.expect(TokenKind::RBrack, "index expression")?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(kind, span))
    }

    fn parse_call(&mut self, fun: ExprId, start: u32) -> PResult<ExprId> {
        self.expect(TokenKind::LParen, "call")?;
        let (args, ellipsis) = self.nested(|p| {
            let mut args = Vec::new();
            let mut ellipsis = false;
            while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
                args.push(p.parse_expr()?);
                if p.eat(TokenKind::Ellipsis) {
                    ellipsis = true;
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            Ok((args, ellipsis))
        })?;
        self.expect(TokenKind::RParen, "argument list")?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(
            ExprKind::Call {
                fun,
                args,
                ellipsis,
            },
            span,
        ))
    }

    fn parse_operand(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let lit = match self.peek_kind() {
            TokenKind::Ident => {
                let name = self.parse_ident()?;
                return Ok(self.ident_expr(name));
            }
            TokenKind::Int => Some(LitKind::Int),
            TokenKind::Float => Some(LitKind::Float),
            TokenKind::Imag => Some(LitKind::Imag),
            TokenKind::Char => Some(LitKind::Char),
            TokenKind::String => Some(LitKind::String),
            _ => None,
        };
        if let Some(kind) = lit {
            let token = self.bump();
            return Ok(self.alloc_expr(
                ExprKind::BasicLit {
                    kind,
                    value: token.text,
                },
                token.span,
            ));
        }

        match self.peek_kind() {
            TokenKind::LParen => {
                self.bump();
                let inner = self.nested(|p| p.parse_expr())?;
                self.expect(TokenKind::RParen, "parenthesized expression")?;
                let span = self.span_from(start);
                Ok(self.alloc_expr(ExprKind::Paren(inner), span))
            }
            TokenKind::Func => {
                self.bump();
                let ty = self.parse_signature()?;
                if self.at(TokenKind::LBrace) {
                    let body = self.nested(|p| p.parse_block())?;
                    let span = self.span_from(start);
                    Ok(self.alloc_expr(ExprKind::FuncLit { ty, body }, span))
                } else {
                    let span = self.span_from(start);
                    Ok(self.alloc_expr(ExprKind::FuncType(ty), span))
                }
            }
            TokenKind::LBrack
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface => self.parse_type(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `{ elem, key: elem, ... }` after an optional literal type.
    fn parse_literal_value(&mut self, ty: Option<ExprId>) -> PResult<ExprId> {
        let lbrace = self.expect(TokenKind::LBrace, "composite literal")?;
        let start = ty.map_or(lbrace.span.start, |t| self.ast[t].span.start);
        let elts = self.nested(|p| {
            let mut elts = Vec::new();
            while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
                elts.push(p.parse_element()?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            Ok(elts)
        })?;
        self.expect(TokenKind::RBrace, "composite literal")?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::CompositeLit { ty, elts }, span))
    }

    fn parse_element(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let key = self.parse_element_value()?;
        if !self.eat(TokenKind::Colon) {
            return Ok(key);
        }
        let value = self.parse_element_value()?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::KeyValue { key, value }, span))
    }

    fn parse_element_value(&mut self) -> PResult<ExprId> {
        if self.at(TokenKind::LBrace) {
            self.parse_literal_value(None)
        } else {
            self.parse_expr()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::ast::{BinaryOp, Decl, ExprKind, Spec, StmtKind};
    use crate::infrastructure::parser::parse_source;

    fn first_expr_kind(body: &str) -> String {
        let src = format!("package p\nfunc f() {{\n\t{}\n}}\n", body);
        let file = parse_source("e.go", &src).unwrap();
        let func = file.file.funcs().next().unwrap();
        let block = file.ast[func].body.unwrap();
        let stmt = file.ast[block].stmts[0];
        match &file.ast[stmt].kind {
            StmtKind::Expr(e) => format!("{:?}", file.ast[*e].kind),
            StmtKind::Assign { rhs, .. } => format!("{:?}", file.ast[rhs[0]].kind),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_binary_precedence() {
        let file = parse_source("e.go", "package p\nvar x = a + b*c == d || e\n").unwrap();
        let value = match &file.file.decls[0] {
            Decl::Gen(gen) => match &gen.specs[0] {
                Spec::Value { values, .. } => values[0],
                other => panic!("expected value spec, got {:?}", other),
            },
            other => panic!("expected var, got {:?}", other),
        };
        let ExprKind::Binary { op, x, .. } = &file.ast[value].kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::LogOr);
        let ExprKind::Binary { op, x, .. } = &file.ast[*x].kind else {
            panic!("expected comparison");
        };
        assert_eq!(*op, BinaryOp::Eq);
        assert!(matches!(file.ast[*x].kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn test_slice_and_index_forms() {
        assert!(first_expr_kind("_ = s[1:2]").starts_with("Slice"));
        assert!(first_expr_kind("_ = s[:]").starts_with("Slice"));
        assert!(first_expr_kind("_ = s[i:j:k]").starts_with("Slice"));
        assert!(first_expr_kind("_ = m[\"k\"]").starts_with("Index"));
        assert!(first_expr_kind("_ = Map[string, int]").starts_with("Index"));
    }

    #[test]
    fn test_calls_and_conversions() {
        assert!(first_expr_kind("fmt.Println(a, b...)").starts_with("Call"));
        assert!(first_expr_kind("_ = make([]int, 0, 8)").starts_with("Call"));
        assert!(first_expr_kind("_ = make(chan int)").starts_with("Call"));
        assert!(first_expr_kind("_ = []byte(\"x\")").starts_with("Call"));
        assert!(first_expr_kind("_ = v.(*T)").starts_with("TypeAssert"));
    }

    #[test]
    fn test_composite_literals() {
        assert!(first_expr_kind("_ = []int{1, 2, 3}").starts_with("CompositeLit"));
        assert!(first_expr_kind("_ = map[string][]int{\"a\": {1}}").starts_with("CompositeLit"));
        assert!(first_expr_kind("_ = &T{A: 1,\n\t\tB: 2,\n\t}").starts_with("Unary"));
        assert!(first_expr_kind("_ = [...]string{\"x\"}").starts_with("CompositeLit"));
        assert!(first_expr_kind("_ = struct{ A int }{A: 1}").starts_with("CompositeLit"));
    }

    #[test]
    fn test_receive_and_func_literal() {
        assert!(first_expr_kind("_ = <-ch").starts_with("Unary"));
        assert!(first_expr_kind("_ = func(x int) bool { return x > 0 }").starts_with("FuncLit"));
    }
}
