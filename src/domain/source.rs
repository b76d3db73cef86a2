//! Source positions for httpreturncheck.
//!
//! Nodes carry byte [`Span`]s; a [`LineIndex`] turns them into the
//! `file:line:column` [`Position`]s that diagnostics are reported at.

use crate::domain::ast::{Ast, File};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range `[start, end)` into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A resolved location (line and column are 1-based, column counts bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// Offsets of every line start, for offset to line/column lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        Self {
            line_starts,
            len: source.len() as u32,
        }
    }

    /// 1-based (line, column) of a byte offset. Offsets past the end clamp
    /// to the end of the text.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line] + 1;
        (line as u32 + 1, column)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A parsed Go source file: syntax tree plus what is needed to report
/// positions inside it.
#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub ast: Ast,
    pub file: File,
    lines: LineIndex,
}

impl SourceFile {
    pub fn new(name: &str, ast: Ast, file: File, lines: LineIndex) -> Self {
        Self {
            name: name.to_string(),
            ast,
            file,
            lines,
        }
    }

    /// Position of the start of `span`.
    pub fn position(&self, span: Span) -> Position {
        let (line, column) = self.lines.line_col(span.start);
        Position::new(&self.name, line, column)
    }
}

/// Raw text of one input file, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_first_line() {
        let index = LineIndex::new("package x\n");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(8), (1, 9));
    }

    #[test]
    fn test_line_col_after_newlines() {
        let src = "package x\n\nfunc f() {\n\tg()\n}\n";
        let index = LineIndex::new(src);
        let g = src.find("g()").unwrap() as u32;
        assert_eq!(index.line_col(g), (4, 2));
        assert_eq!(index.line_count(), 6);
    }

    #[test]
    fn test_line_col_clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.line_col(100), (1, 3));
    }

    #[test]
    fn test_position_display() {
        let pos = Position::new("handler.go", 12, 2);
        assert_eq!(pos.to_string(), "handler.go:12:2");
    }

    #[test]
    fn test_span_to() {
        let joined = Span::new(4, 9).to(Span::new(1, 6));
        assert_eq!(joined, Span::new(1, 9));
    }
}
