//! Go lexer
//!
//! Tokenizes Go source text, dropping comments and inserting the implicit
//! semicolons the Go grammar relies on at line ends.

pub mod token;

pub use token::{Token, TokenKind};

use crate::domain::ast::BinaryOp;
use crate::domain::source::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Operators and punctuation, longest first so the scan is greedy.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("&^=", TokenKind::OpAssign(BinaryOp::AndNot)),
    ("<<=", TokenKind::OpAssign(BinaryOp::Shl)),
    (">>=", TokenKind::OpAssign(BinaryOp::Shr)),
    ("...", TokenKind::Ellipsis),
    ("&&", TokenKind::Op(BinaryOp::LogAnd)),
    ("||", TokenKind::Op(BinaryOp::LogOr)),
    ("<-", TokenKind::Arrow),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("==", TokenKind::Op(BinaryOp::Eq)),
    ("!=", TokenKind::Op(BinaryOp::Ne)),
    ("<=", TokenKind::Op(BinaryOp::Le)),
    (">=", TokenKind::Op(BinaryOp::Ge)),
    (":=", TokenKind::Define),
    ("&^", TokenKind::Op(BinaryOp::AndNot)),
    ("<<", TokenKind::Op(BinaryOp::Shl)),
    (">>", TokenKind::Op(BinaryOp::Shr)),
    ("+=", TokenKind::OpAssign(BinaryOp::Add)),
    ("-=", TokenKind::OpAssign(BinaryOp::Sub)),
    ("*=", TokenKind::OpAssign(BinaryOp::Mul)),
    ("/=", TokenKind::OpAssign(BinaryOp::Div)),
    ("%=", TokenKind::OpAssign(BinaryOp::Rem)),
    ("&=", TokenKind::OpAssign(BinaryOp::And)),
    ("|=", TokenKind::OpAssign(BinaryOp::Or)),
    ("^=", TokenKind::OpAssign(BinaryOp::Xor)),
    ("+", TokenKind::Op(BinaryOp::Add)),
    ("-", TokenKind::Op(BinaryOp::Sub)),
    ("*", TokenKind::Op(BinaryOp::Mul)),
    ("/", TokenKind::Op(BinaryOp::Div)),
    ("%", TokenKind::Op(BinaryOp::Rem)),
    ("&", TokenKind::Op(BinaryOp::And)),
    ("|", TokenKind::Op(BinaryOp::Or)),
    ("^", TokenKind::Op(BinaryOp::Xor)),
    ("<", TokenKind::Op(BinaryOp::Lt)),
    (">", TokenKind::Op(BinaryOp::Gt)),
    ("=", TokenKind::Assign),
    ("!", TokenKind::Not),
    ("~", TokenKind::Tilde),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBrack),
    ("]", TokenKind::RBrack),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (",", TokenKind::Comma),
    (".", TokenKind::Period),
    (";", TokenKind::Semicolon),
    (":", TokenKind::Colon),
];

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    insert_semi: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            insert_semi: false,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input. The result always ends with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            if let Some(semi) = self.skip_trivia()? {
                self.tokens.push(semi);
                continue;
            }

            let start = self.pos;
            let Some(c) = self.peek() else {
                if self.insert_semi {
                    self.tokens
                        .push(Token::new(TokenKind::Semicolon, "\n", Span::new(start, start)));
                }
                self.tokens
                    .push(Token::new(TokenKind::Eof, "", Span::new(start, start)));
                break;
            };

            let kind = if is_letter(c) {
                self.scan_identifier()
            } else if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
                self.scan_number()
            } else {
                match c {
                    '"' => self.scan_string()?,
                    '`' => self.scan_raw_string()?,
                    '\'' => self.scan_rune()?,
                    _ => self.scan_operator()?,
                }
            };

            self.insert_semi = kind.ends_statement();
            self.tokens.push(Token::new(
                kind,
                &self.src[start..self.pos],
                Span::new(start, self.pos),
            ));
        }
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, start: usize, message: &str) -> LexError {
        LexError {
            span: Span::new(start, self.pos),
            message: message.to_string(),
        }
    }

    /// Skips whitespace and comments. Returns an implicit semicolon when a
    /// line break ends a statement.
    fn skip_trivia(&mut self) -> Result<Option<Token>, LexError> {
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    let at = self.pos;
                    self.pos += 1;
                    if self.insert_semi {
                        self.insert_semi = false;
                        return Ok(Some(Token::new(TokenKind::Semicolon, "\n", Span::new(at, at))));
                    }
                }
                ' ' | '\t' | '\r' | '\u{feff}' => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '/' if self.peek_at(1) == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    let mut spans_lines = false;
                    loop {
                        match self.peek() {
                            None => return Err(self.error(start, "comment not terminated")),
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(c) => {
                                spans_lines |= c == '\n';
                                self.bump();
                            }
                        }
                    }
                    if spans_lines && self.insert_semi {
                        self.insert_semi = false;
                        return Ok(Some(Token::new(
                            TokenKind::Semicolon,
                            "\n",
                            Span::new(start, start),
                        )));
                    }
                }
                _ => break,
            }
        }
        Ok(None)
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_letter(c) || c.is_numeric() {
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::keyword(&self.src[start..self.pos]).unwrap_or(TokenKind::Ident)
    }

    fn scan_number(&mut self) -> TokenKind {
        let mut kind = TokenKind::Int;
        let prefix = self.peek_at(1).map(|c| c.to_ascii_lowercase());

        if self.peek() == Some('0') && prefix == Some('x') {
            self.pos += 2;
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() || c == '_' {
                    self.bump();
                } else if c == '.' {
                    kind = TokenKind::Float;
                    self.bump();
                } else {
                    break;
                }
            }
            if matches!(self.peek(), Some('p' | 'P')) {
                kind = TokenKind::Float;
                self.scan_exponent();
            }
        } else if self.peek() == Some('0') && matches!(prefix, Some('b' | 'o')) {
            self.pos += 2;
            while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.bump();
            }
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.bump();
            }
            if self.peek() == Some('.') {
                kind = TokenKind::Float;
                self.bump();
                while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                    self.bump();
                }
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                kind = TokenKind::Float;
                self.scan_exponent();
            }
        }

        if self.peek() == Some('i') {
            self.bump();
            kind = TokenKind::Imag;
        }
        kind
    }

    fn scan_exponent(&mut self) {
        self.bump();
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    fn scan_string(&mut self) -> Result<TokenKind, LexError> {
        self.scan_quoted('"', "string literal not terminated")?;
        Ok(TokenKind::String)
    }

    fn scan_rune(&mut self) -> Result<TokenKind, LexError> {
        self.scan_quoted('\'', "rune literal not terminated")?;
        Ok(TokenKind::Char)
    }

    fn scan_quoted(&mut self, quote: char, unterminated: &str) -> Result<(), LexError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(start, unterminated)),
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(self.error(start, unterminated));
                    }
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn scan_raw_string(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.error(start, "raw string literal not terminated")),
                Some('`') => return Ok(TokenKind::String),
                Some(_) => {}
            }
        }
    }

    fn scan_operator(&mut self) -> Result<TokenKind, LexError> {
        let rest = &self.src[self.pos..];
        match OPERATORS.iter().find(|(text, _)| rest.starts_with(text)) {
            Some(&(text, kind)) => {
                self.pos += text.len();
                Ok(kind)
            }
            None => {
                let start = self.pos;
                let c = self.bump().unwrap_or('\0');
                Err(self.error(start, &format!("invalid character {:?}", c)))
            }
        }
    }
}

fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_semicolon_inserted_after_call() {
        assert_eq!(
            kinds("w.Write(b)\nreturn\n"),
            vec![
                TokenKind::Ident,
                TokenKind::Period,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Return,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_open_brace() {
        assert_eq!(
            kinds("if x {\n}"),
            vec![
                TokenKind::If,
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_dropped() {
        let tokens = Lexer::new("a // trailing\n/* block */ b").tokenize().unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "\n", "b", "\n", ""]);
    }

    #[test]
    fn test_multiline_block_comment_ends_statement() {
        assert_eq!(
            kinds("a /*\n*/ b"),
            vec![
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("42 0x1F 3.14 1e9 .5 2i 'x' \"s\\\"q\" `raw\nstring`"),
            vec![
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Imag,
                TokenKind::Char,
                TokenKind::String,
                TokenKind::String,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            kinds("x &^= y <- z"),
            vec![
                TokenKind::Ident,
                TokenKind::OpAssign(BinaryOp::AndNot),
                TokenKind::Ident,
                TokenKind::Arrow,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("x := \"abc\n").tokenize().unwrap_err();
        assert_eq!(err.message, "string literal not terminated");
        assert_eq!(err.span.start, 5);
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = Lexer::new("ab  cd").tokenize().unwrap();
        assert_eq!(tokens[1].span, Span::new(4, 6));
    }
}
