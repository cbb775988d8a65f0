//! Backd Eval - scoping, assignment and reference evaluation for tenant
//! scripts.
//!
//! The centre of this crate is [`assign`]: it resolves an lvalue expression
//! to a storage location and writes a value into it, rebinding replacement
//! containers up the lvalue chain. Sub-expressions are evaluated through the
//! [`Evaluate`] trait; [`Interpreter`] is the reference implementation and
//! also executes statement blocks.
//!
//! ```text
//! let mut interp = Interpreter::builder().max_depth(256).build();
//! let stored = interp.run(&[Stmt::expr(Expr::ident("a").assign(Expr::int(5)))])?;
//! ```

mod assign;
mod environment;
mod evaluate;
mod interpreter;

pub use assign::assign;
pub use environment::{Environment, Scope, ScopedEnvironment, SharedScope};
pub use evaluate::Evaluate;
pub use interpreter::{EvalConfig, Interpreter, InterpreterBuilder};

pub use backd_value::{EvalError, EvalErrorKind, EvalResult, Value};
