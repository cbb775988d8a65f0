//! The seam between expression evaluation and assignment.

use backd_ir::Expr;
use backd_value::EvalResult;

use crate::Environment;

/// Evaluates sub-expressions on behalf of the assignment engine.
///
/// The engine evaluates the object, collection, index and pointer parts of an
/// lvalue through this trait and never interprets expressions itself, so any
/// evaluator can drive it.
pub trait Evaluate {
    fn evaluate(&mut self, expr: &Expr, env: &mut Environment) -> EvalResult;
}
