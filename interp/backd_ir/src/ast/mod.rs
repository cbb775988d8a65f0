//! Syntax tree nodes.
//!
//! Trees are boxed and owned rather than arena-allocated: tenant functions are
//! small, parsed once at registration, and then shared read-only across every
//! concurrent invocation.

mod expr;
mod stmt;

pub use expr::{Expr, ExprKind};
pub use stmt::{Stmt, StmtKind};
