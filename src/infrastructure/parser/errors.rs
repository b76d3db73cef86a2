//! Parse error types for the Go parser.

use crate::domain::error::ParseError;
use crate::domain::source::{LineIndex, Position, Span};
use crate::infrastructure::lexer::{LexError, Token};

/// Error raised inside the parser, before positions are resolved.
#[derive(Debug, Clone)]
pub enum SyntaxError {
    UnexpectedToken { expected: String, found: Token },
    Invalid { message: String, span: Span },
}

pub type PResult<T> = Result<T, SyntaxError>;

impl SyntaxError {
    pub fn invalid(message: &str, span: Span) -> Self {
        SyntaxError::Invalid {
            message: message.to_string(),
            span,
        }
    }

    pub fn into_parse_error(self, filename: &str, lines: &LineIndex) -> ParseError {
        match self {
            SyntaxError::UnexpectedToken { expected, found } => ParseError::UnexpectedToken {
                position: position(filename, lines, found.span),
                expected,
                found: found.describe(),
            },
            SyntaxError::Invalid { message, span } => ParseError::Syntax {
                position: position(filename, lines, span),
                message,
            },
        }
    }
}

pub fn lex_error(err: LexError, filename: &str, lines: &LineIndex) -> ParseError {
    ParseError::Lex {
        position: position(filename, lines, err.span),
        message: err.message,
    }
}

fn position(filename: &str, lines: &LineIndex, span: Span) -> Position {
    let (line, column) = lines.line_col(span.start);
    Position::new(filename, line, column)
}
