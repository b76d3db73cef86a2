//! Block-local rule deciding whether a write is followed by a return.

use crate::domain::ast::{Ast, BlockId, StmtId, StmtKind};
use crate::domain::walk::Owner;

/// Empty and declaration statements are transparent when looking for the
/// next or last statement.
pub fn is_skippable(ast: &Ast, stmt: StmtId) -> bool {
    matches!(ast[stmt].kind, StmtKind::Empty | StmtKind::Decl(_))
}

/// Last statement of `block` that is not skippable.
pub fn last_non_empty(ast: &Ast, block: BlockId) -> Option<StmtId> {
    ast[block]
        .stmts
        .iter()
        .rev()
        .copied()
        .find(|&s| !is_skippable(ast, s))
}

/// First non-skippable statement after `owner.index` in `owner.block`.
pub fn next_non_empty(ast: &Ast, owner: Owner) -> Option<StmtId> {
    ast[owner.block]
        .stmts
        .iter()
        .skip(owner.index + 1)
        .copied()
        .find(|&s| !is_skippable(ast, s))
}

/// Guard check for the writes of one handler.
#[derive(Debug, Clone, Copy)]
pub struct ControlFlowGuard {
    /// Last non-empty statement of the function body. A write that is this
    /// statement ends the function and needs no return.
    last: Option<StmtId>,
}

impl ControlFlowGuard {
    pub fn for_body(ast: &Ast, body: BlockId) -> Self {
        Self {
            last: last_non_empty(ast, body),
        }
    }

    pub fn last(&self) -> Option<StmtId> {
        self.last
    }

    /// A write is guarded when it is the function's last statement, or
    /// when the next non-empty statement in its own block is a `return`.
    /// Nothing beyond that nearest sibling is inspected.
    pub fn is_guarded(&self, ast: &Ast, write: StmtId, owner: Owner) -> bool {
        if self.last == Some(write) {
            return true;
        }
        match next_non_empty(ast, owner) {
            Some(next) => matches!(ast[next].kind, StmtKind::Return(_)),
            None => false,
        }
    }
}
