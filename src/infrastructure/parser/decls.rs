//! Top-level declarations: package clause, imports, `const`/`var`/`type`
//! and functions.

use super::{PResult, Parser, SyntaxError};
use crate::domain::ast::{Decl, DeclKind, File, FuncDecl, FuncId, FuncType, GenDecl, Ident, Spec};
use crate::infrastructure::lexer::TokenKind;

impl Parser {
    pub fn parse_file(&mut self) -> PResult<File> {
        self.expect(TokenKind::Package, "package clause")?;
        let package = self.parse_ident()?;
        self.expect_semi("package clause")?;

        let mut decls = Vec::new();
        while self.at(TokenKind::Import) {
            decls.push(Decl::Gen(self.parse_gen_decl(DeclKind::Import)?));
            self.expect_semi("import declaration")?;
        }

        while !self.at(TokenKind::Eof) {
            let decl = match self.peek_kind() {
                TokenKind::Func => Decl::Func(self.parse_func_decl()?),
                TokenKind::Var => Decl::Gen(self.parse_gen_decl(DeclKind::Var)?),
                TokenKind::Const => Decl::Gen(self.parse_gen_decl(DeclKind::Const)?),
                TokenKind::Type => Decl::Gen(self.parse_gen_decl(DeclKind::Type)?),
                TokenKind::Import => {
                    return Err(SyntaxError::invalid(
                        "imports must appear before other declarations",
                        self.peek().span,
                    ))
                }
                _ => return Err(self.unexpected("declaration")),
            };
            self.expect_semi("declaration")?;
            decls.push(decl);
        }

        Ok(File { package, decls })
    }

    /// `kind spec` or `kind ( spec; spec; ... )`. The keyword is the
    /// current token.
    pub(crate) fn parse_gen_decl(&mut self, kind: DeclKind) -> PResult<GenDecl> {
        let start = self.bump().span.start;
        let mut specs = Vec::new();
        if self.eat(TokenKind::LParen) {
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                specs.push(self.parse_spec(kind)?);
                self.expect_semi("declaration")?;
            }
            self.expect(TokenKind::RParen, "declaration")?;
        } else {
            specs.push(self.parse_spec(kind)?);
        }
        Ok(GenDecl {
            kind,
            specs,
            span: self.span_from(start),
        })
    }

    fn parse_spec(&mut self, kind: DeclKind) -> PResult<Spec> {
        match kind {
            DeclKind::Import => {
                let name = match self.peek_kind() {
                    TokenKind::Ident => Some(self.parse_ident()?),
                    TokenKind::Period => {
                        let dot = self.bump();
                        Some(Ident {
                            name: dot.text,
                            span: dot.span,
                        })
                    }
                    _ => None,
                };
                let path = self.expect(TokenKind::String, "import path")?.text;
                Ok(Spec::Import { name, path })
            }
            DeclKind::Const | DeclKind::Var => {
                let names = self.parse_ident_list()?;
                let ty = match self.peek_kind() {
                    TokenKind::Assign | TokenKind::Semicolon | TokenKind::RParen => None,
                    _ => Some(self.parse_type()?),
                };
                let values = if self.eat(TokenKind::Assign) {
                    self.parse_expr_list()?
                } else {
                    Vec::new()
                };
                Ok(Spec::Value { names, ty, values })
            }
            DeclKind::Type => {
                let name = self.parse_ident()?;
                let type_params = if self.at(TokenKind::LBrack) && self.looks_like_type_params() {
                    self.parse_type_params()?
                } else {
                    Vec::new()
                };
                let alias = self.eat(TokenKind::Assign);
                let ty = self.parse_type()?;
                Ok(Spec::Type {
                    name,
                    type_params,
                    alias,
                    ty,
                })
            }
        }
    }

    /// Tells `type A[T any] ...` apart from the array type in `type A [N]int`.
    fn looks_like_type_params(&self) -> bool {
        self.nth_kind(1) == TokenKind::Ident
            && matches!(
                self.nth_kind(2),
                TokenKind::Ident
                    | TokenKind::Comma
                    | TokenKind::Interface
                    | TokenKind::Tilde
                    | TokenKind::LBrack
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Func
                    | TokenKind::Struct
            )
    }

    fn parse_func_decl(&mut self) -> PResult<FuncId> {
        let start = self.expect(TokenKind::Func, "function declaration")?.span.start;

        let recv = if self.at(TokenKind::LParen) {
            let recv_start = self.peek().span;
            let mut params = self.parse_parameters()?;
            if params.len() != 1 {
                return Err(SyntaxError::invalid(
                    "method must have exactly one receiver",
                    recv_start,
                ));
            }
            params.pop()
        } else {
            None
        };

        let name = self.parse_ident()?;
        let type_params = if self.at(TokenKind::LBrack) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let params = self.parse_parameters()?;
        let results = self.parse_results()?;

        let body = if self.at(TokenKind::LBrace) {
            Some(self.with_expr_lev(0, |p| p.parse_block())?)
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(self.ast.funcs.alloc(FuncDecl {
            name,
            recv,
            ty: FuncType {
                type_params,
                params,
                results,
            },
            body,
            span,
        }))
    }
}
