//! Assignment engine.
//!
//! Resolves an lvalue expression to a storage location and writes a value
//! into it. Writes that cannot happen in place (growing an array, filling a
//! nil map, editing a string) build a replacement container, which is then
//! assigned to the parent lvalue by recursing on it. The chain stops at the
//! first in-place write or at a variable binding.
//!
//! Ancestors written in place before a later link fails stay written; there
//! is no rollback.

use backd_ir::{Expr, ExprKind, Name};
use backd_stack::ensure_sufficient_stack;
use backd_value::{
    invalid_operation, string_set_index, to_index, type_invalid, undefined_symbol,
    unsupported_operation, EvalError, EvalResult, Mutation, PointerValue, Value,
};

use crate::{Environment, Evaluate};

/// Assign `value` to `target`, returning the value actually stored.
///
/// The stored value may differ from `value`: it is converted to the declared
/// type of the slot, and on rebind paths it is whatever the parent slot
/// received (the grown array, the materialized map, the rebuilt string).
/// Errors carry the span of the innermost lvalue that failed.
#[tracing::instrument(level = "trace", skip_all, fields(target = target.kind.describe()))]
pub fn assign<E: Evaluate + ?Sized>(
    eval: &mut E,
    target: &Expr,
    value: Value,
    env: &mut Environment,
) -> EvalResult {
    ensure_sufficient_stack(|| assign_inner(eval, target, value, env))
        .map_err(|err| err.or_span(target.span))
}

fn assign_inner<E: Evaluate + ?Sized>(
    eval: &mut E,
    target: &Expr,
    value: Value,
    env: &mut Environment,
) -> EvalResult {
    match &target.kind {
        ExprKind::Ident(name) => assign_ident(name, value, env),
        ExprKind::Member { object, field } => assign_member(eval, object, field, value, env),
        ExprKind::Item { collection, index } => assign_item(eval, collection, index, value, env),
        ExprKind::Slice {
            collection,
            begin,
            end,
        } => assign_slice(
            eval,
            collection,
            begin.as_deref(),
            end.as_deref(),
            value,
            env,
        ),
        ExprKind::Deref(pointer) => assign_deref(eval, pointer, value, env),
        other => Err(invalid_operation(format!(
            "cannot assign to {}",
            other.describe()
        ))),
    }
}

/// Overwrite the nearest binding; an unbound plain name declares a new
/// binding in the innermost scope.
fn assign_ident(name: &Name, value: Value, env: &mut Environment) -> EvalResult {
    if env.set(name, value.clone()) {
        return Ok(value);
    }
    if name.is_qualified() {
        return Err(undefined_symbol(name));
    }
    env.define(name.clone(), value.clone());
    Ok(value)
}

fn assign_member<E: Evaluate + ?Sized>(
    eval: &mut E,
    object: &Expr,
    field: &Name,
    value: Value,
    env: &mut Environment,
) -> EvalResult {
    let target = eval.evaluate(object, env)?;
    let (container, via) = member_target(&target)?;
    match &container {
        Value::Struct(s) => Ok(s.set_field(field, &value)?.into_value()),
        Value::Map(m) => {
            let key = Value::string(field.as_str());
            let mutation = m.insert(&key, &value)?;
            rebind(eval, object, via.as_ref(), mutation, env)
        }
        other => Err(unsupported_operation("member assignment", other.kind())),
    }
}

/// Strip one interface layer, then follow one pointer.
///
/// Returns the container together with the pointer it was reached through,
/// so a replacement can be written back into the pointee cell.
fn member_target(target: &Value) -> Result<(Value, Option<PointerValue>), EvalError> {
    match target.unwrap_interface() {
        Value::Nil => Err(type_invalid("member assignment on nil")),
        Value::Pointer(pointer) => match pointer.load() {
            Some(Value::Nil) | None => Err(type_invalid("member assignment through nil pointer")),
            Some(pointee) => Ok((pointee, Some(pointer.clone()))),
        },
        other => Ok((other.clone(), None)),
    }
}

fn assign_item<E: Evaluate + ?Sized>(
    eval: &mut E,
    collection: &Expr,
    index: &Expr,
    value: Value,
    env: &mut Environment,
) -> EvalResult {
    let target = eval.evaluate(collection, env)?;
    let index_value = eval.evaluate(index, env)?;
    let mutation = match target.unwrap_interface() {
        Value::Array(array) => array.set_index(to_index(&index_value)?, &value)?,
        Value::Map(map) => map.insert(&index_value, &value)?,
        Value::Str(s) => string_set_index(s, to_index(&index_value)?, &value)?,
        other => return Err(unsupported_operation("index assignment", other.kind())),
    };
    rebind(eval, collection, None, mutation, env)
}

fn assign_slice<E: Evaluate + ?Sized>(
    eval: &mut E,
    collection: &Expr,
    begin: Option<&Expr>,
    end: Option<&Expr>,
    value: Value,
    env: &mut Environment,
) -> EvalResult {
    let target = eval.evaluate(collection, env)?;
    let array = match target.unwrap_interface() {
        Value::Array(array) => array.clone(),
        other => return Err(unsupported_operation("slice assignment", other.kind())),
    };
    let begin = match begin {
        Some(expr) => to_index(&eval.evaluate(expr, env)?)?,
        None => 0,
    };
    let end = match end {
        Some(expr) => to_index(&eval.evaluate(expr, env)?)?,
        None => i64::try_from(array.len()).unwrap_or(i64::MAX),
    };
    Ok(array.set_range(begin, end, &value)?.into_value())
}

fn assign_deref<E: Evaluate + ?Sized>(
    eval: &mut E,
    pointer: &Expr,
    value: Value,
    env: &mut Environment,
) -> EvalResult {
    match eval.evaluate(pointer, env)?.unwrap_interface() {
        Value::Pointer(p) => Ok(p.store(value)?.into_value()),
        other => Err(type_invalid(format!("cannot dereference {}", other.kind()))),
    }
}

/// Finish a container store: in-place writes are done, replacements go into
/// the slot that held the original.
fn rebind<E: Evaluate + ?Sized>(
    eval: &mut E,
    parent: &Expr,
    via: Option<&PointerValue>,
    mutation: Mutation,
    env: &mut Environment,
) -> EvalResult {
    match mutation {
        Mutation::InPlace(stored) => Ok(stored),
        Mutation::Replaced(container) => {
            tracing::debug!(
                parent = parent.kind.describe(),
                kind = %container.kind(),
                "rebinding replaced container"
            );
            match via {
                Some(pointer) => Ok(pointer.store(container)?.into_value()),
                None => assign(eval, parent, container, env),
            }
        }
    }
}
