// Domain layer for httpreturncheck: the Go syntax tree and the analysis
// that runs over it.

pub mod analyzer;
pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod guard;
pub mod handler;
pub mod source;
pub mod walk;
pub mod write_call;
