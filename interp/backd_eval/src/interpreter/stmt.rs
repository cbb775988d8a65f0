//! Statement execution.

use backd_ir::{Expr, Stmt, StmtKind};
use backd_value::{invalid_operation, unsupported_operation, EvalError, EvalResult, MapKey, Value};

use super::Interpreter;
use crate::{assign, Environment, Evaluate};

/// How a statement finished.
enum Flow {
    Next(Value),
    Return(Value),
}

impl Interpreter {
    /// Execute `body` in `env`.
    ///
    /// Yields the value of the first `return` reached, else the value of the
    /// last expression statement, else `Nil`.
    #[tracing::instrument(level = "trace", skip_all, fields(stmts = body.len()))]
    pub fn exec_block(&mut self, body: &[Stmt], env: &mut Environment) -> EvalResult {
        match self.exec_stmts(body, env)? {
            Flow::Next(value) | Flow::Return(value) => Ok(value),
        }
    }

    fn exec_stmts(&mut self, body: &[Stmt], env: &mut Environment) -> Result<Flow, EvalError> {
        let mut last = Value::Nil;
        for stmt in body {
            match self.exec_stmt(stmt, env)? {
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Next(value) => {
                    if matches!(stmt.kind, StmtKind::Expr(_)) {
                        last = value;
                    }
                }
            }
        }
        Ok(Flow::Next(last))
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &mut Environment) -> Result<Flow, EvalError> {
        let flow = match &stmt.kind {
            StmtKind::Expr(expr) => self.evaluate(expr, env).map(Flow::Next),
            StmtKind::Assign { targets, values } => {
                self.exec_assign(targets, values, env).map(Flow::Next)
            }
            StmtKind::For {
                var,
                iterable,
                body,
            } => self.exec_for(var, iterable, body, env),
            StmtKind::Return(value) => match value {
                Some(expr) => self.evaluate(expr, env).map(Flow::Return),
                None => Ok(Flow::Return(Value::Nil)),
            },
        };
        flow.map_err(|err| err.or_span(stmt.span))
    }

    /// `t1, t2 = v1, v2`: every right-hand side is evaluated before any target
    /// is written. A single array right-hand side spreads over several targets.
    fn exec_assign(
        &mut self,
        targets: &[Expr],
        values: &[Expr],
        env: &mut Environment,
    ) -> EvalResult {
        if targets.len() == values.len() {
            let evaluated = values
                .iter()
                .map(|value| self.evaluate(value, env))
                .collect::<Result<Vec<_>, _>>()?;
            let mut stored = Value::Nil;
            for (target, value) in targets.iter().zip(evaluated) {
                stored = assign(self, target, value, env)?;
            }
            return Ok(stored);
        }

        if values.len() == 1 && targets.len() > 1 {
            let spread = self.evaluate(&values[0], env)?;
            let Value::Array(items) = spread.unwrap_interface() else {
                return Err(invalid_operation(format!(
                    "cannot spread {} over {} targets",
                    spread.kind(),
                    targets.len()
                )));
            };
            let items = items.snapshot();
            let mut stored = Value::Nil;
            for (i, target) in targets.iter().enumerate() {
                let value = items.get(i).cloned().unwrap_or(Value::Nil);
                stored = assign(self, target, value, env)?;
            }
            return Ok(stored);
        }

        Err(invalid_operation(format!(
            "assignment mismatch: {} targets, {} values",
            targets.len(),
            values.len()
        )))
    }

    /// Each iteration runs in its own scope; the loop variable is bound by
    /// ordinary assignment, so any lvalue works as a loop target.
    fn exec_for(
        &mut self,
        var: &Expr,
        iterable: &Expr,
        body: &[Stmt],
        env: &mut Environment,
    ) -> Result<Flow, EvalError> {
        let items: Vec<Value> = match self.evaluate(iterable, env)?.unwrap_interface() {
            Value::Array(a) => a.snapshot(),
            Value::Map(m) => m.keys().iter().map(MapKey::to_value).collect(),
            Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
            Value::Nil => Vec::new(),
            other => return Err(unsupported_operation("iteration", other.kind())),
        };
        tracing::trace!(iterations = items.len(), "for loop");
        for item in items {
            let mut scoped = env.scoped();
            assign(self, var, item, &mut scoped)?;
            if let Flow::Return(value) = self.exec_stmts(body, &mut scoped)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next(Value::Nil))
    }
}
