//! Expression nodes.

use std::fmt;

use crate::{Name, Span};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// `nil`
    Nil,

    /// Boolean literal: true, false
    Bool(bool),

    /// Integer literal: 42
    Int(i64),

    /// Float literal: 2.5 (stored as bits for Hash)
    Float(u64),

    /// String literal: "tenant"
    Str(Name),

    /// Array literal: [a, b, c]
    Array(Vec<Expr>),

    /// Variable reference, possibly qualified: `x`, `http.timeout`
    Ident(Name),

    /// Member access: object.field
    Member { object: Box<Expr>, field: Name },

    /// Indexed access: `collection[index]`
    Item {
        collection: Box<Expr>,
        index: Box<Expr>,
    },

    /// Range access: `collection[begin:end]`, either bound optional
    Slice {
        collection: Box<Expr>,
        begin: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },

    /// Pointer dereference: *pointer
    Deref(Box<Expr>),

    /// Assignment: target = value. Evaluates to the stored value, so
    /// `a = b = 5` nests as `Assign(a, Assign(b, 5))`.
    Assign { target: Box<Expr>, value: Box<Expr> },
}

impl ExprKind {
    /// Whether this expression denotes a storage location.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            ExprKind::Ident(_)
                | ExprKind::Member { .. }
                | ExprKind::Item { .. }
                | ExprKind::Slice { .. }
                | ExprKind::Deref(_)
        )
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Nil => "nil literal",
            ExprKind::Bool(_) => "bool literal",
            ExprKind::Int(_) => "int literal",
            ExprKind::Float(_) => "float literal",
            ExprKind::Str(_) => "string literal",
            ExprKind::Array(_) => "array literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Member { .. } => "member access",
            ExprKind::Item { .. } => "index access",
            ExprKind::Slice { .. } => "slice access",
            ExprKind::Deref(_) => "dereference",
            ExprKind::Assign { .. } => "assignment",
        }
    }
}

// Constructors. Nodes built this way carry `Span::DUMMY`; parsers attach real
// spans through `with_span`.

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn nil() -> Self {
        Self::synth(ExprKind::Nil)
    }

    pub fn bool(b: bool) -> Self {
        Self::synth(ExprKind::Bool(b))
    }

    pub fn int(n: i64) -> Self {
        Self::synth(ExprKind::Int(n))
    }

    pub fn float(f: f64) -> Self {
        Self::synth(ExprKind::Float(f.to_bits()))
    }

    pub fn string(s: &str) -> Self {
        Self::synth(ExprKind::Str(Name::new(s)))
    }

    pub fn array(items: Vec<Expr>) -> Self {
        Self::synth(ExprKind::Array(items))
    }

    pub fn ident(name: &str) -> Self {
        Self::synth(ExprKind::Ident(Name::new(name)))
    }

    #[must_use]
    pub fn member(self, field: &str) -> Self {
        Self::synth(ExprKind::Member {
            object: Box::new(self),
            field: Name::new(field),
        })
    }

    #[must_use]
    pub fn item(self, index: Expr) -> Self {
        Self::synth(ExprKind::Item {
            collection: Box::new(self),
            index: Box::new(index),
        })
    }

    #[must_use]
    pub fn slice(self, begin: Option<Expr>, end: Option<Expr>) -> Self {
        Self::synth(ExprKind::Slice {
            collection: Box::new(self),
            begin: begin.map(Box::new),
            end: end.map(Box::new),
        })
    }

    #[must_use]
    pub fn deref(self) -> Self {
        Self::synth(ExprKind::Deref(Box::new(self)))
    }

    #[must_use]
    pub fn assign(self, value: Expr) -> Self {
        Self::synth(ExprKind::Assign {
            target: Box::new(self),
            value: Box::new(value),
        })
    }

    fn synth(kind: ExprKind) -> Self {
        Expr {
            kind,
            span: Span::DUMMY,
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}
