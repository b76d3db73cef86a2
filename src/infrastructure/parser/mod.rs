//! Go recursive descent parser
//!
//! Builds the arena syntax tree in `domain::ast` from lexer tokens. The
//! grammar covered is what handler code uses in practice: every statement
//! form, closures, composite literals, generics in declarations and
//! instantiations. Type checking is out of scope.

pub mod errors;
mod decls;
mod exprs;
mod stmts;
mod types;

use crate::domain::ast::{Ast, Block, BlockId, Expr, ExprId, ExprKind, Ident, Stmt, StmtId, StmtKind};
use crate::domain::error::ParseError;
use crate::domain::source::{LineIndex, Position, SourceFile, Span};
use crate::infrastructure::lexer::{Lexer, Token, TokenKind};

pub use errors::{PResult, SyntaxError};

/// Parse one Go source file.
pub fn parse_source(filename: &str, source: &str) -> Result<SourceFile, ParseError> {
    check_source_len(filename, source.len())?;
    let lines = LineIndex::new(source);
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| errors::lex_error(e, filename, &lines))?;

    let mut parser = Parser::new(tokens);
    let file = parser
        .parse_file()
        .map_err(|e| e.into_parse_error(filename, &lines))?;

    log::debug!(
        "parsed {}: package {}, {} declarations, {} statements",
        filename,
        file.package.name,
        file.decls.len(),
        parser.ast.stmts.len()
    );
    Ok(SourceFile::new(filename, parser.ast, file, lines))
}

/// Byte offsets are stored as `u32` and no token yields more than a few
/// nodes, so larger inputs could overflow spans or node ids.
pub const MAX_SOURCE_LEN: usize = (u32::MAX / 8) as usize;

fn check_source_len(filename: &str, len: usize) -> Result<(), ParseError> {
    if len > MAX_SOURCE_LEN {
        return Err(ParseError::Syntax {
            position: Position::new(filename, 1, 1),
            message: format!("source too large ({} bytes, limit {})", len, MAX_SOURCE_LEN),
        });
    }
    Ok(())
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) ast: Ast,
    /// < 0 inside control clause headers, where `T{` opens a block, not a
    /// composite literal.
    expr_lev: i32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end as usize).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, "", Span::new(end, end)));
        }
        Self {
            tokens,
            pos: 0,
            ast: Ast::default(),
            expr_lev: 0,
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("'{}' in {}", kind, context)))
        }
    }

    /// A statement or declaration ends with `;`, which may be omitted
    /// before a closing `)` or `}`.
    pub(crate) fn expect_semi(&mut self, context: &str) -> PResult<()> {
        match self.peek_kind() {
            TokenKind::RParen | TokenKind::RBrace => Ok(()),
            TokenKind::Semicolon => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected(&format!("';' after {}", context))),
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.peek().clone(),
        }
    }

    /// Start offset of the next token.
    pub(crate) fn start(&self) -> u32 {
        self.peek().span.start
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        let end = self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| !(t.kind == TokenKind::Semicolon && t.text == "\n"))
            .map_or(start, |t| t.span.end);
        Span {
            start,
            end: end.max(start),
        }
    }

    pub(crate) fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.ast.exprs.alloc(Expr { kind, span })
    }

    pub(crate) fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.ast.stmts.alloc(Stmt { kind, span })
    }

    pub(crate) fn alloc_block(&mut self, stmts: Vec<StmtId>, span: Span) -> BlockId {
        self.ast.blocks.alloc(Block { stmts, span })
    }

    pub(crate) fn parse_ident(&mut self) -> PResult<Ident> {
        let token = self.expect(TokenKind::Ident, "identifier")?;
        Ok(Ident {
            name: token.text,
            span: token.span,
        })
    }

    pub(crate) fn parse_ident_list(&mut self) -> PResult<Vec<Ident>> {
        let mut names = vec![self.parse_ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.parse_ident()?);
        }
        Ok(names)
    }

    pub(crate) fn ident_expr(&mut self, ident: Ident) -> ExprId {
        self.alloc_expr(ExprKind::Ident(ident.name), ident.span)
    }

    /// Runs `f` with `expr_lev` set to `level`, restoring it afterwards
    /// even when `f` fails.
    pub(crate) fn with_expr_lev<T>(
        &mut self,
        level: i32,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let prev = self.expr_lev;
        self.expr_lev = level;
        let result = f(self);
        self.expr_lev = prev;
        result
    }

    /// Like `with_expr_lev`, one level deeper than the current one.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let level = self.expr_lev + 1;
        self.with_expr_lev(level, f)
    }
}
