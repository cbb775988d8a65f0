//! Reference tree-walking evaluator.
//!
//! Evaluates the expression forms the assignment engine needs (literals,
//! variables, member/index/slice reads, dereference, array literals and
//! assignment) and executes statement blocks.

mod builder;
mod stmt;

use backd_ir::{Expr, ExprKind, Name, Stmt};
use backd_stack::ensure_sufficient_stack;
use backd_value::{
    checked_range, convert_key, depth_limit_exceeded, index_out_of_range, no_such_member,
    to_index, type_invalid, undefined_symbol, unsupported_operation, ArrayValue, EvalError,
    EvalResult, MapValue, Type, Value,
};

pub use builder::InterpreterBuilder;

use crate::{assign, Environment, Evaluate};

/// Evaluator limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum expression nesting depth before `DepthLimitExceeded`.
    pub max_depth: usize,
}

impl EvalConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 512;
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Tree-walking interpreter.
///
/// Owns a default environment for [`run`](Self::run) and [`eval`](Self::eval);
/// the [`Evaluate`] impl and [`exec_block`](Self::exec_block) work against any
/// environment the caller passes.
pub struct Interpreter {
    config: EvalConfig,
    depth: usize,
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn into_env(self) -> Environment {
        self.env
    }

    /// Execute `body` against the interpreter's own environment.
    pub fn run(&mut self, body: &[Stmt]) -> EvalResult {
        let mut env = std::mem::take(&mut self.env);
        let result = self.exec_block(body, &mut env);
        self.env = env;
        result
    }

    /// Evaluate `expr` against the interpreter's own environment.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        let mut env = std::mem::take(&mut self.env);
        let result = self.evaluate(expr, &mut env);
        self.env = env;
        result
    }

    fn eval_inner(&mut self, expr: &Expr, env: &mut Environment) -> EvalResult {
        match &expr.kind {
            ExprKind::Nil => Ok(Value::Nil),
            ExprKind::Bool(b) => Ok(Value::bool(*b)),
            ExprKind::Int(n) => Ok(Value::int(*n)),
            ExprKind::Float(bits) => Ok(Value::float(f64::from_bits(*bits))),
            ExprKind::Str(s) => Ok(Value::string(s.as_str())),
            ExprKind::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| self.evaluate(item, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(Type::Any, values))
            }
            ExprKind::Ident(name) => env.lookup(name).ok_or_else(|| undefined_symbol(name)),
            ExprKind::Member { object, field } => {
                let object = self.evaluate(object, env)?;
                read_member(&object, field)
            }
            ExprKind::Item { collection, index } => {
                let collection = self.evaluate(collection, env)?;
                let index = self.evaluate(index, env)?;
                read_item(&collection, &index)
            }
            ExprKind::Slice {
                collection,
                begin,
                end,
            } => {
                let collection = self.evaluate(collection, env)?;
                let begin = match begin {
                    Some(begin) => Some(to_index(&self.evaluate(begin, env)?)?),
                    None => None,
                };
                let end = match end {
                    Some(end) => Some(to_index(&self.evaluate(end, env)?)?),
                    None => None,
                };
                read_slice(&collection, begin, end)
            }
            ExprKind::Deref(pointer) => match self.evaluate(pointer, env)?.unwrap_interface() {
                Value::Pointer(p) => p
                    .load()
                    .ok_or_else(|| type_invalid("nil pointer dereference")),
                other => Err(type_invalid(format!("cannot dereference {}", other.kind()))),
            },
            ExprKind::Assign { target, value } => {
                let value = self.evaluate(value, env)?;
                assign(self, target, value, env)
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluate for Interpreter {
    fn evaluate(&mut self, expr: &Expr, env: &mut Environment) -> EvalResult {
        if self.depth >= self.config.max_depth {
            return Err(depth_limit_exceeded(self.config.max_depth).or_span(expr.span));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.eval_inner(expr, env));
        self.depth -= 1;
        result.map_err(|err| err.or_span(expr.span))
    }
}

// Reads

/// `object.field`, following one interface and one pointer layer.
fn read_member(object: &Value, field: &Name) -> EvalResult {
    let container = match object.unwrap_interface() {
        Value::Pointer(p) => p
            .load()
            .ok_or_else(|| type_invalid("member access through nil pointer"))?,
        other => other.clone(),
    };
    match &container {
        Value::Struct(s) => s
            .get_field(field)
            .ok_or_else(|| no_such_member(field, &format!("struct {}", s.type_name()))),
        Value::Map(m) => map_get(m, &Value::string(field.as_str())),
        Value::Nil => Err(type_invalid("member access on nil")),
        other => Err(unsupported_operation("member access", other.kind())),
    }
}

fn read_item(collection: &Value, index: &Value) -> EvalResult {
    match collection.unwrap_interface() {
        Value::Array(a) => {
            let i = to_index(index)?;
            usize::try_from(i)
                .ok()
                .and_then(|p| a.get(p))
                .ok_or_else(|| index_out_of_range(i, a.len()))
        }
        Value::Map(m) => map_get(m, index),
        Value::Str(s) => {
            let i = to_index(index)?;
            usize::try_from(i)
                .ok()
                .and_then(|p| s.chars().nth(p))
                .map(|c| Value::string(c.to_string()))
                .ok_or_else(|| index_out_of_range(i, s.chars().count()))
        }
        other => Err(unsupported_operation("index access", other.kind())),
    }
}

/// Missing keys and nil maps read as the value type's zero value.
fn map_get(map: &MapValue, key: &Value) -> EvalResult {
    let key = convert_key(key, map.key_type())?;
    Ok(map
        .get(&key)
        .unwrap_or_else(|| Value::zero(map.value_type())))
}

/// Arrays slice into a fresh copy; strings slice by character.
fn read_slice(collection: &Value, begin: Option<i64>, end: Option<i64>) -> EvalResult {
    match collection.unwrap_interface() {
        Value::Array(a) => {
            let items = a.snapshot();
            let (start, stop) = bounds(begin, end, items.len())?;
            let part = items.get(start..stop).map(<[Value]>::to_vec).unwrap_or_default();
            Ok(Value::Array(ArrayValue::new(a.elem_type().clone(), part)))
        }
        Value::Str(s) => {
            let (start, stop) = bounds(begin, end, s.chars().count())?;
            let part: String = s.chars().skip(start).take(stop - start).collect();
            Ok(Value::string(part))
        }
        other => Err(unsupported_operation("slice access", other.kind())),
    }
}

fn bounds(
    begin: Option<i64>,
    end: Option<i64>,
    len: usize,
) -> Result<(usize, usize), EvalError> {
    let begin = begin.unwrap_or(0);
    let end = end.unwrap_or_else(|| i64::try_from(len).unwrap_or(i64::MAX));
    checked_range(begin, end, len)
}

#[cfg(test)]
mod tests;
