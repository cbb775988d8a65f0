//! Explicit coercions.
//!
//! `convert` is the only place a value changes representation on its way into
//! a typed slot. Anything not listed here is rejected: no lossy narrowing and
//! no number/string crossover.

use std::collections::BTreeMap;

use crate::errors::{index_not_numeric, type_conversion, type_invalid, EvalError};
use crate::types::Type;
use crate::value::{ArrayValue, MapKey, MapValue, PointerValue, Value};

/// Convert `value` for storage in a slot declared as `target`.
///
/// Containers whose declared types already match are returned as the same
/// handle, so aliasing survives the store. Containers that need element
/// conversion are rebuilt on a fresh backing, all elements or none.
pub fn convert(value: &Value, target: &Type) -> Result<Value, EvalError> {
    if target.is_any() {
        return Ok(value.clone());
    }
    match (value, target) {
        (Value::Interface(inner), _) => convert(inner, target),

        (Value::Bool(_), Type::Bool)
        | (Value::Int(_), Type::Int)
        | (Value::Float(_), Type::Float)
        | (Value::Str(_), Type::Str) => Ok(value.clone()),

        (Value::Int(n), Type::Float) => Ok(Value::Float(widen(*n))),

        (Value::Nil, Type::Array(elem)) => Ok(Value::array(Type::clone(elem), Vec::new())),
        (Value::Nil, Type::Map(key, val)) => Ok(Value::nil_map(Type::clone(key), Type::clone(val))),
        (Value::Nil, Type::Pointer(elem)) => {
            Ok(Value::Pointer(PointerValue::nil(Type::clone(elem))))
        }
        (Value::Nil, Type::Struct(_)) => Ok(Value::Nil),

        (Value::Array(array), Type::Array(elem)) => {
            if array.elem_type() == &**elem {
                return Ok(value.clone());
            }
            let items = array
                .snapshot()
                .iter()
                .map(|item| convert(item, elem))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(ArrayValue::new(Type::clone(elem), items)))
        }

        (Value::Map(map), Type::Map(key, val)) => {
            if map.key_type() == &**key && map.value_type() == &**val {
                return Ok(value.clone());
            }
            if map.is_nil() {
                return Ok(Value::nil_map(Type::clone(key), Type::clone(val)));
            }
            let mut entries = BTreeMap::new();
            for (k, v) in map.snapshot() {
                entries.insert(convert_key(&k.to_value(), key)?, convert(&v, val)?);
            }
            Ok(Value::Map(MapValue::new(
                Type::clone(key),
                Type::clone(val),
                entries,
            )))
        }

        (Value::Struct(s), Type::Struct(name)) if s.type_name() == name => Ok(value.clone()),

        (Value::Pointer(p), Type::Pointer(elem))
            if elem.is_any() || p.elem_type().is_any() || p.elem_type() == &**elem =>
        {
            Ok(value.clone())
        }

        _ => Err(type_conversion(value.dynamic_type(), target)),
    }
}

/// Convert `value` to a key for a map declared with key type `key_type`.
///
/// Only bool, int and str values key a map; a map declared with any other
/// key type rejects every store and lookup.
pub fn convert_key(value: &Value, key_type: &Type) -> Result<MapKey, EvalError> {
    if !key_type.is_hashable() {
        return Err(type_invalid(format!("invalid map key type {key_type}")));
    }
    let converted = convert(value, key_type)?;
    MapKey::from_value(&converted)
        .ok_or_else(|| type_invalid(format!("{} is not a valid map key", value.kind())))
}

/// Coerce an index or slice bound to an integer.
///
/// Floats truncate toward zero; strings must parse as decimal integers.
pub fn to_index(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Float(f) if f.is_finite() => Ok(truncate(*f)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| index_not_numeric(value.kind())),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Interface(inner) => to_index(inner),
        _ => Err(index_not_numeric(value.kind())),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "int to float widening is the one numeric coercion"
)]
fn widen(n: i64) -> f64 {
    n as f64
}

/// Out-of-range floats saturate; the caller bounds-checks the result.
#[expect(clippy::cast_possible_truncation, reason = "truncation toward zero is intended")]
fn truncate(f: f64) -> i64 {
    f.trunc() as i64
}
