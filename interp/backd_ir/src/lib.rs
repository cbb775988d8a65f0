//! Backd IR - syntax tree types for tenant scripts.
//!
//! The parser that produces these trees lives outside this workspace; the
//! interpreter only consumes them. Every node carries a [`Span`] so runtime
//! errors can point back into the tenant's source.
//!
//! # Lvalues
//!
//! Five expression shapes denote storage locations rather than values:
//! `Ident`, `Member`, `Item`, `Slice` and `Deref`. See [`ExprKind::is_lvalue`].

mod ast;
mod name;
mod span;

pub use ast::{Expr, ExprKind, Stmt, StmtKind};
pub use name::Name;
pub use span::Span;
