//! Statement nodes.

use std::fmt;

use super::Expr;
use crate::Span;

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Stmt::new(StmtKind::Expr(expr), span)
    }

    /// `t1, t2 = v1, v2`
    pub fn assign(targets: Vec<Expr>, values: Vec<Expr>) -> Self {
        Stmt::new(StmtKind::Assign { targets, values }, Span::DUMMY)
    }

    /// `for var in iterable { body }`
    pub fn for_in(var: Expr, iterable: Expr, body: Vec<Stmt>) -> Self {
        Stmt::new(
            StmtKind::For {
                var,
                iterable,
                body,
            },
            Span::DUMMY,
        )
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Stmt::new(StmtKind::Return(value), Span::DUMMY)
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Statement kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Expression statement
    Expr(Expr),

    /// Compound assignment: every target is an lvalue.
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
    },

    /// Loop over an array, map keys, or string characters. The loop variable
    /// is bound through ordinary assignment in a fresh scope per iteration.
    For {
        var: Expr,
        iterable: Expr,
        body: Vec<Stmt>,
    },

    /// Return from the enclosing function body
    Return(Option<Expr>),
}
