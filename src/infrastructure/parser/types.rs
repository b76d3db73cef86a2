//! Type expressions, parameter lists and struct/interface bodies.

use super::{PResult, Parser, SyntaxError};
use crate::domain::ast::{BinaryOp, ChanDir, ExprId, ExprKind, Field, FuncType, Ident, Param, UnaryOp};
use crate::infrastructure::lexer::TokenKind;

/// One comma-separated entry of a parameter list before grouping.
enum ParamEntry {
    /// `name Type`
    Named(Ident, ExprId),
    /// A lone type, or a name whose type follows later (`a, b int`).
    Bare(ExprId),
}

impl Parser {
    pub(crate) fn parse_type(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let kind = match self.peek_kind() {
            TokenKind::Ident => {
                let name = self.parse_ident()?;
                let x = self.ident_expr(name);
                return self.parse_type_name_rest(x);
            }
            TokenKind::Op(BinaryOp::Mul) => {
                self.bump();
                ExprKind::Star(self.parse_type()?)
            }
            TokenKind::LBrack => {
                self.bump();
                let len = if self.eat(TokenKind::RBrack) {
                    None
                } else if self.at(TokenKind::Ellipsis) && self.nth_kind(1) == TokenKind::RBrack {
                    let dots = self.bump().span;
                    self.bump();
                    Some(self.alloc_expr(ExprKind::Ellipsis(None), dots))
                } else {
                    let len = self.nested(|p| p.parse_expr())?;
                    self.expect(TokenKind::RBrack, "array type")?;
                    Some(len)
                };
                let elt = self.parse_type()?;
                ExprKind::ArrayType { len, elt }
            }
            TokenKind::Map => {
                self.bump();
                self.expect(TokenKind::LBrack, "map type")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBrack, "map type")?;
                let value = self.parse_type()?;
                ExprKind::MapType { key, value }
            }
            TokenKind::Chan => {
                self.bump();
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.parse_type()?;
                ExprKind::ChanType { dir, value }
            }
            TokenKind::Arrow => {
                self.bump();
                self.expect(TokenKind::Chan, "channel type")?;
                let value = self.parse_type()?;
                ExprKind::ChanType {
                    dir: ChanDir::Recv,
                    value,
                }
            }
            TokenKind::Func => {
                self.bump();
                ExprKind::FuncType(self.parse_signature()?)
            }
            TokenKind::Struct => return self.parse_struct_type(),
            TokenKind::Interface => return self.parse_interface_type(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "parenthesized type")?;
                ExprKind::Paren(inner)
            }
            _ => return Err(self.unexpected("type")),
        };
        let span = self.span_from(start);
        Ok(self.alloc_expr(kind, span))
    }

    /// After a type name: optional `.Name` qualifier, then optional type
    /// arguments.
    fn parse_type_name_rest(&mut self, x: ExprId) -> PResult<ExprId> {
        let start = self.ast[x].span.start;
        let mut ty = x;
        if self.eat(TokenKind::Period) {
            let sel = self.parse_ident()?;
            let span = self.span_from(start);
            ty = self.alloc_expr(ExprKind::Selector { x: ty, sel }, span);
        }
        if self.at(TokenKind::LBrack) {
            self.bump();
            let indices = self.nested(|p| {
                let mut args = vec![p.parse_type()?];
                while p.eat(TokenKind::Comma) {
                    if p.at(TokenKind::RBrack) {
                        break;
                    }
                    args.push(p.parse_type()?);
                }
                Ok(args)
            })?;
            self.expect(TokenKind::RBrack, "type arguments")?;
            let span = self.span_from(start);
            ty = self.alloc_expr(ExprKind::Index { x: ty, indices }, span);
        }
        Ok(ty)
    }

    pub(crate) fn starts_type(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident
                | TokenKind::Op(BinaryOp::Mul)
                | TokenKind::LBrack
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::LParen
                | TokenKind::Arrow
        )
    }

    /// `(params) results`, without type parameters.
    pub(crate) fn parse_signature(&mut self) -> PResult<FuncType> {
        let params = self.parse_parameters()?;
        let results = self.parse_results()?;
        Ok(FuncType {
            type_params: Vec::new(),
            params,
            results,
        })
    }

    pub(crate) fn parse_parameters(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen, "parameter list")?;
        self.parse_param_list(TokenKind::RParen, false)
    }

    pub(crate) fn parse_type_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LBrack, "type parameter list")?;
        self.parse_param_list(TokenKind::RBrack, true)
    }

    pub(crate) fn parse_results(&mut self) -> PResult<Vec<Param>> {
        if self.at(TokenKind::LParen) {
            return self.parse_parameters();
        }
        if self.starts_type() {
            let ty = self.parse_type()?;
            return Ok(vec![Param { name: None, ty }]);
        }
        Ok(Vec::new())
    }

    fn parse_param_list(&mut self, close: TokenKind, type_params: bool) -> PResult<Vec<Param>> {
        let entries = self.nested(|p| {
            let mut entries = Vec::new();
            while !p.at(close) && !p.at(TokenKind::Eof) {
                entries.push(p.parse_param_entry(close, type_params)?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            Ok(entries)
        })?;
        self.expect(close, "parameter list")?;
        self.group_params(entries)
    }

    fn parse_param_entry(&mut self, close: TokenKind, type_params: bool) -> PResult<ParamEntry> {
        if self.at(TokenKind::Ellipsis) {
            return Ok(ParamEntry::Bare(self.parse_variadic()?));
        }
        if !self.at(TokenKind::Ident) {
            let ty = self.parse_param_type(type_params)?;
            return Ok(ParamEntry::Bare(ty));
        }

        let name = self.parse_ident()?;
        match self.peek_kind() {
            TokenKind::Period => {
                let x = self.ident_expr(name);
                Ok(ParamEntry::Bare(self.parse_type_name_rest(x)?))
            }
            TokenKind::LBrack => self.parse_array_or_type_args(name),
            TokenKind::Comma => Ok(ParamEntry::Bare(self.ident_expr(name))),
            kind if kind == close => Ok(ParamEntry::Bare(self.ident_expr(name))),
            TokenKind::Ellipsis => Ok(ParamEntry::Named(name, self.parse_variadic()?)),
            _ => {
                let ty = self.parse_param_type(type_params)?;
                Ok(ParamEntry::Named(name, ty))
            }
        }
    }

    fn parse_param_type(&mut self, type_params: bool) -> PResult<ExprId> {
        if type_params {
            self.parse_constraint()
        } else {
            self.parse_type()
        }
    }

    fn parse_variadic(&mut self) -> PResult<ExprId> {
        let start = self.expect(TokenKind::Ellipsis, "variadic parameter")?.span.start;
        let elt = self.parse_type()?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::Ellipsis(Some(elt)), span))
    }

    /// `name [N]T`, `name []T` or the instantiated type `Name[T1, T2]`.
    fn parse_array_or_type_args(&mut self, name: Ident) -> PResult<ParamEntry> {
        let start = name.span.start;
        let lbrack = self.expect(TokenKind::LBrack, "array type")?.span.start;

        if self.eat(TokenKind::RBrack) {
            let elt = self.parse_type()?;
            let span = self.span_from(lbrack);
            let ty = self.alloc_expr(ExprKind::ArrayType { len: None, elt }, span);
            return Ok(ParamEntry::Named(name, ty));
        }

        let args = self.nested(|p| {
            let mut args = vec![p.parse_expr()?];
            while p.eat(TokenKind::Comma) {
                if p.at(TokenKind::RBrack) {
                    break;
                }
                args.push(p.parse_expr()?);
            }
            Ok(args)
        })?;
        self.expect(TokenKind::RBrack, "array length or type arguments")?;

        if args.len() == 1 && self.starts_type() {
            let elt = self.parse_type()?;
            let span = self.span_from(lbrack);
            let ty = self.alloc_expr(
                ExprKind::ArrayType {
                    len: Some(args[0]),
                    elt,
                },
                span,
            );
            return Ok(ParamEntry::Named(name, ty));
        }

        let x = self.ident_expr(name);
        let span = self.span_from(start);
        Ok(ParamEntry::Bare(self.alloc_expr(ExprKind::Index { x, indices: args }, span)))
    }

    /// Resolves `a, b int, c string` style grouping: once any entry is
    /// named, lone identifiers are names waiting for the next type.
    fn group_params(&mut self, entries: Vec<ParamEntry>) -> PResult<Vec<Param>> {
        let named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));
        if !named {
            return Ok(entries
                .into_iter()
                .map(|entry| match entry {
                    ParamEntry::Bare(ty) | ParamEntry::Named(_, ty) => Param { name: None, ty },
                })
                .collect());
        }

        let mut params = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Bare(expr) => {
                    let node = &self.ast[expr];
                    match &node.kind {
                        ExprKind::Ident(name) => pending.push(Ident {
                            name: name.clone(),
                            span: node.span,
                        }),
                        _ => {
                            return Err(SyntaxError::invalid(
                                "mixed named and unnamed parameters",
                                node.span,
                            ))
                        }
                    }
                }
                ParamEntry::Named(name, ty) => {
                    for pending_name in pending.drain(..) {
                        params.push(Param {
                            name: Some(pending_name),
                            ty,
                        });
                    }
                    params.push(Param {
                        name: Some(name),
                        ty,
                    });
                }
            }
        }
        if let Some(last) = pending.last() {
            return Err(SyntaxError::invalid(
                "mixed named and unnamed parameters",
                last.span,
            ));
        }
        Ok(params)
    }

    /// Type constraint: `~T | U | ...`.
    pub(crate) fn parse_constraint(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let mut x = self.parse_constraint_term()?;
        while self.eat(TokenKind::Op(BinaryOp::Or)) {
            let y = self.parse_constraint_term()?;
            let span = self.span_from(start);
            x = self.alloc_expr(
                ExprKind::Binary {
                    op: BinaryOp::Or,
                    x,
                    y,
                },
                span,
            );
        }
        Ok(x)
    }

    fn parse_constraint_term(&mut self) -> PResult<ExprId> {
        let start = self.start();
        if self.eat(TokenKind::Tilde) {
            let x = self.parse_type()?;
            let span = self.span_from(start);
            return Ok(self.alloc_expr(
                ExprKind::Unary {
                    op: UnaryOp::Tilde,
                    x,
                },
                span,
            ));
        }
        self.parse_type()
    }

    fn parse_struct_type(&mut self) -> PResult<ExprId> {
        let start = self.expect(TokenKind::Struct, "struct type")?.span.start;
        self.expect(TokenKind::LBrace, "struct type")?;
        let fields = self.nested(|p| {
            let mut fields = Vec::new();
            while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
                fields.push(p.parse_struct_field()?);
                p.expect_semi("struct field")?;
            }
            Ok(fields)
        })?;
        self.expect(TokenKind::RBrace, "struct type")?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::StructType(fields), span))
    }

    fn parse_struct_field(&mut self) -> PResult<Field> {
        let (names, ty) = match (self.peek_kind(), self.nth_kind(1)) {
            (TokenKind::Op(BinaryOp::Mul), _) => (Vec::new(), self.parse_type()?),
            (TokenKind::Ident, TokenKind::Period)
            | (TokenKind::Ident, TokenKind::String)
            | (TokenKind::Ident, TokenKind::Semicolon)
            | (TokenKind::Ident, TokenKind::RBrace) => (Vec::new(), self.parse_type()?),
            (TokenKind::Ident, TokenKind::Comma) => {
                let names = self.parse_ident_list()?;
                (names, self.parse_type()?)
            }
            (TokenKind::Ident, TokenKind::LBrack) => {
                let name = self.parse_ident()?;
                match self.parse_array_or_type_args(name)? {
                    ParamEntry::Named(name, ty) => (vec![name], ty),
                    ParamEntry::Bare(ty) => (Vec::new(), ty),
                }
            }
            (TokenKind::Ident, _) => {
                let name = self.parse_ident()?;
                (vec![name], self.parse_type()?)
            }
            _ => return Err(self.unexpected("field name or embedded type")),
        };
        let tag = if self.at(TokenKind::String) {
            Some(self.bump().text)
        } else {
            None
        };
        Ok(Field { names, ty, tag })
    }

    fn parse_interface_type(&mut self) -> PResult<ExprId> {
        let start = self.expect(TokenKind::Interface, "interface type")?.span.start;
        self.expect(TokenKind::LBrace, "interface type")?;
        let elems = self.nested(|p| {
            let mut elems = Vec::new();
            while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
                if p.at(TokenKind::Ident) && p.nth_kind(1) == TokenKind::LParen {
                    let name = p.parse_ident()?;
                    let method_start = name.span.start;
                    let sig = p.parse_signature()?;
                    let span = p.span_from(method_start);
                    let ty = p.alloc_expr(ExprKind::FuncType(sig), span);
                    elems.push(Field {
                        names: vec![name],
                        ty,
                        tag: None,
                    });
                } else {
                    let ty = p.parse_constraint()?;
                    elems.push(Field {
                        names: Vec::new(),
                        ty,
                        tag: None,
                    });
                }
                p.expect_semi("interface element")?;
            }
            Ok(elems)
        })?;
        self.expect(TokenKind::RBrace, "interface type")?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::InterfaceType(elems), span))
    }
}
