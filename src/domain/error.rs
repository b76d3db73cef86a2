//! Errors raised while turning source text into a syntax tree.

use crate::domain::source::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{position}: {message}")]
    Lex { position: Position, message: String },

    #[error("{position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: Position,
        expected: String,
        found: String,
    },

    #[error("{position}: {message}")]
    Syntax { position: Position, message: String },
}

impl ParseError {
    pub fn position(&self) -> &Position {
        match self {
            ParseError::Lex { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::Syntax { position, .. } => position,
        }
    }
}
