//! Handler recognition by signature shape.
//!
//! Matching is nominal: the parameter types are compared as written
//! (`http.ResponseWriter`, `*http.Request`) and never resolved, so a
//! different package imported under the name `http` is indistinguishable.

use crate::domain::ast::{Ast, ExprId, ExprKind, FuncDecl};

/// `package.Name` as spelled in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName {
    pub package: &'static str,
    pub name: &'static str,
}

/// Syntactic shape a parameter type must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// `pkg.Name`
    Named(QualifiedName),
    /// `*pkg.Name`
    Pointer(QualifiedName),
}

impl TypeShape {
    pub fn matches(self, ast: &Ast, ty: ExprId) -> bool {
        match self {
            TypeShape::Named(qualified) => is_qualified(ast, ty, qualified),
            TypeShape::Pointer(qualified) => match ast[ty].kind {
                ExprKind::Star(inner) => is_qualified(ast, inner, qualified),
                _ => false,
            },
        }
    }
}

fn is_qualified(ast: &Ast, ty: ExprId, qualified: QualifiedName) -> bool {
    match &ast[ty].kind {
        ExprKind::Selector { x, sel } => {
            sel.name == qualified.name && ast.ident_name(*x) == Some(qualified.package)
        }
        _ => false,
    }
}

/// Parameter shapes of a handler: the response writer first, the request
/// second.
#[derive(Debug, Clone, Copy)]
pub struct HandlerSignature {
    pub writer: TypeShape,
    pub request: TypeShape,
}

/// `func(w http.ResponseWriter, r *http.Request)`
pub const NET_HTTP: HandlerSignature = HandlerSignature {
    writer: TypeShape::Named(QualifiedName {
        package: "http",
        name: "ResponseWriter",
    }),
    request: TypeShape::Pointer(QualifiedName {
        package: "http",
        name: "Request",
    }),
};

pub const HANDLER_SIGNATURES: &[HandlerSignature] = &[NET_HTTP];

#[derive(Debug, Clone)]
pub struct HandlerDetector {
    signatures: &'static [HandlerSignature],
}

impl Default for HandlerDetector {
    fn default() -> Self {
        Self::new(HANDLER_SIGNATURES)
    }
}

impl HandlerDetector {
    pub fn new(signatures: &'static [HandlerSignature]) -> Self {
        Self { signatures }
    }

    /// True iff `func` takes exactly two parameters shaped like one of the
    /// known handler signatures. Grouped parameters count once per name.
    pub fn is_handler(&self, ast: &Ast, func: &FuncDecl) -> bool {
        let params = &func.ty.params;
        if params.len() != 2 {
            return false;
        }
        self.signatures.iter().any(|sig| {
            sig.writer.matches(ast, params[0].ty) && sig.request.matches(ast, params[1].ty)
        })
    }

    /// Name bound to the response writer if `func` is a handler. None for
    /// non-handlers and for handlers whose writer is unnamed or blank,
    /// since nothing in the body can refer to it.
    pub fn writer_name<'f>(&self, ast: &Ast, func: &'f FuncDecl) -> Option<&'f str> {
        if !self.is_handler(ast, func) {
            return None;
        }
        let name = func.ty.params[0].name.as_ref()?;
        if name.name == "_" {
            return None;
        }
        Some(name.name.as_str())
    }
}
