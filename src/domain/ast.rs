// Go syntax tree for httpreturncheck.
// Nodes are allocated in per-kind arenas owned by `Ast` and refer to each
// other through typed ids, so "the same statement" is an id comparison.

use crate::domain::source::Span;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

/// Upper bound on the number of nodes one arena can address.
pub const MAX_NODES: usize = u32::MAX as usize;

/// Typed index of a node in one of the [`Ast`] arenas.
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    fn from_index(index: usize) -> Self {
        // Unreachable for inputs accepted by the parser, which caps source size.
        debug_assert!(index < MAX_NODES, "arena overflow at node {}", index);
        Self {
            raw: index as u32,
            _marker: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.raw as usize
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

pub type StmtId = Id<Stmt>;
pub type ExprId = Id<Expr>;
pub type BlockId = Id<Block>;
pub type FuncId = Id<FuncDecl>;

/// Append-only node storage.
#[derive(Debug)]
pub struct Arena<T> {
    nodes: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> Arena<T> {
    pub fn alloc(&mut self, node: T) -> Id<T> {
        let id = Id::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: Id<T>) -> &T {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// All nodes of one parsed file.
#[derive(Debug, Default)]
pub struct Ast {
    pub stmts: Arena<Stmt>,
    pub exprs: Arena<Expr>,
    pub blocks: Arena<Block>,
    pub funcs: Arena<FuncDecl>,
}

impl Index<StmtId> for Ast {
    type Output = Stmt;
    fn index(&self, id: StmtId) -> &Stmt {
        self.stmts.get(id)
    }
}

impl Index<ExprId> for Ast {
    type Output = Expr;
    fn index(&self, id: ExprId) -> &Expr {
        self.exprs.get(id)
    }
}

impl Index<BlockId> for Ast {
    type Output = Block;
    fn index(&self, id: BlockId) -> &Block {
        self.blocks.get(id)
    }
}

impl Index<FuncId> for Ast {
    type Output = FuncDecl;
    fn index(&self, id: FuncId) -> &FuncDecl {
        self.funcs.get(id)
    }
}

impl Ast {
    /// Returns the identifier name if `expr` is a bare identifier.
    pub fn ident_name(&self, expr: ExprId) -> Option<&str> {
        match &self[expr].kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

// ============================================================================
// Files and declarations
// ============================================================================

/// Top level of a source file.
#[derive(Debug)]
pub struct File {
    pub package: Ident,
    pub decls: Vec<Decl>,
}

impl File {
    /// Function and method declarations in source order.
    pub fn funcs(&self) -> impl Iterator<Item = FuncId> + '_ {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(id) => Some(*id),
            Decl::Gen(_) => None,
        })
    }

    /// Import paths (including the quotes stripped).
    pub fn imports(&self) -> impl Iterator<Item = &str> + '_ {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Gen(gen) if gen.kind == DeclKind::Import => Some(gen.specs.iter()),
                _ => None,
            })
            .flatten()
            .filter_map(|spec| match spec {
                Spec::Import { path, .. } => Some(path.trim_matches(|c| c == '"' || c == '`')),
                _ => None,
            })
    }
}

#[derive(Debug)]
pub enum Decl {
    Func(FuncId),
    Gen(GenDecl),
}

/// `func [recv] name[T any](params) results { body }`
#[derive(Debug)]
pub struct FuncDecl {
    pub name: Ident,
    pub recv: Option<Param>,
    pub ty: FuncType,
    /// None for declarations without a body (implemented elsewhere).
    pub body: Option<BlockId>,
    pub span: Span,
}

/// Parameters, results and type parameters of a function.
#[derive(Debug, Clone, Default)]
pub struct FuncType {
    pub type_params: Vec<Param>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

/// One parameter. `a, b int` is two parameters sharing a type expression.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: ExprId,
}

/// `import`, `const`, `var` or `type` declaration, grouped or not.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub kind: DeclKind,
    pub specs: Vec<Spec>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Const,
    Var,
    Type,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import {
        name: Option<Ident>,
        path: String,
    },
    Value {
        names: Vec<Ident>,
        ty: Option<ExprId>,
        values: Vec<ExprId>,
    },
    Type {
        name: Ident,
        type_params: Vec<Param>,
        alias: bool,
        ty: ExprId,
    },
}

// ============================================================================
// Statements
// ============================================================================

/// An ordered run of sibling statements with a single parent.
#[derive(Debug)]
pub struct Block {
    pub stmts: Vec<StmtId>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug)]
pub enum StmtKind {
    Expr(ExprId),
    Return(Vec<ExprId>),
    Empty,
    /// `var`, `const` or `type` inside a function body.
    Decl(GenDecl),
    Assign {
        lhs: Vec<ExprId>,
        op: AssignOp,
        rhs: Vec<ExprId>,
    },
    IncDec {
        expr: ExprId,
        increment: bool,
    },
    Send {
        chan: ExprId,
        value: ExprId,
    },
    Go(ExprId),
    Defer(ExprId),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Labeled {
        label: Ident,
        stmt: StmtId,
    },
    Block(BlockId),
    If {
        init: Option<StmtId>,
        cond: ExprId,
        then_block: BlockId,
        /// Either another `If` or a `Block`.
        else_stmt: Option<StmtId>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: BlockId,
    },
    Range {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
        body: BlockId,
    },
    Switch {
        init: Option<StmtId>,
        tag: Option<ExprId>,
        clauses: Vec<CaseClause>,
    },
    TypeSwitch {
        init: Option<StmtId>,
        /// `x := y.(type)` or `y.(type)`.
        assign: StmtId,
        clauses: Vec<CaseClause>,
    },
    Select {
        clauses: Vec<CommClause>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `+=`, `<<=`, ...
    Compound(BinaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

/// `case a, b:` or `default:` in a switch; the body is its own block.
#[derive(Debug)]
pub struct CaseClause {
    /// Empty for `default`.
    pub exprs: Vec<ExprId>,
    pub is_default: bool,
    pub body: BlockId,
}

/// `case <-ch:` / `case ch <- v:` / `default:` in a select.
#[derive(Debug)]
pub struct CommClause {
    /// None for `default`.
    pub comm: Option<StmtId>,
    pub body: BlockId,
}

// ============================================================================
// Expressions (types are expressions too, as in go/ast)
// ============================================================================

#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug)]
pub enum ExprKind {
    Ident(String),
    BasicLit {
        kind: LitKind,
        value: String,
    },
    CompositeLit {
        ty: Option<ExprId>,
        elts: Vec<ExprId>,
    },
    FuncLit {
        ty: FuncType,
        body: BlockId,
    },
    Paren(ExprId),
    Selector {
        x: ExprId,
        sel: Ident,
    },
    /// `a[i]`, or a generic instantiation `F[int, string]`.
    Index {
        x: ExprId,
        indices: Vec<ExprId>,
    },
    Slice {
        x: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
        max: Option<ExprId>,
    },
    /// `x.(T)`; `ty` is None for `x.(type)`.
    TypeAssert {
        x: ExprId,
        ty: Option<ExprId>,
    },
    Call {
        fun: ExprId,
        args: Vec<ExprId>,
        ellipsis: bool,
    },
    /// `*x`, either a dereference or a pointer type.
    Star(ExprId),
    Unary {
        op: UnaryOp,
        x: ExprId,
    },
    Binary {
        op: BinaryOp,
        x: ExprId,
        y: ExprId,
    },
    KeyValue {
        key: ExprId,
        value: ExprId,
    },
    /// `[N]T`, `[...]T` (len is an `Ellipsis`) or `[]T` (no len).
    ArrayType {
        len: Option<ExprId>,
        elt: ExprId,
    },
    /// `...T` in a variadic parameter, or `...` in an array length.
    Ellipsis(Option<ExprId>),
    MapType {
        key: ExprId,
        value: ExprId,
    },
    ChanType {
        dir: ChanDir,
        value: ExprId,
    },
    FuncType(FuncType),
    StructType(Vec<Field>),
    /// Methods are named fields with a `FuncType`; embedded types and
    /// constraint unions are unnamed.
    InterfaceType(Vec<Field>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Struct field or interface element.
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: ExprId,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    Xor,
    Addr,
    Recv,
    Tilde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    /// Go operator precedence, 1 (lowest, `||`) to 5.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LogOr => 1,
            BinaryOp::LogAnd => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }
}
