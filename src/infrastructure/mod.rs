// Infrastructure implementations for httpreturncheck.

pub mod concurrency;
pub mod lexer;
pub mod parser;
pub mod project_loader;

use crate::domain::error::ParseError;
use crate::domain::source::SourceFile;
use crate::ports::SourceParser;

/// [`SourceParser`] backed by the hand-written Go parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoSourceParser;

impl SourceParser for GoSourceParser {
    fn parse(&self, filename: &str, source: &str) -> Result<SourceFile, ParseError> {
        parser::parse_source(filename, source)
    }
}
