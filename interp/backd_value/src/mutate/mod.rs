//! Container mutation.
//!
//! Every store reports whether the existing storage absorbed the write or a
//! fresh container was built in its place. A `Replaced` container is not
//! reachable from anywhere yet: the caller must store it into the slot that
//! held the original (the parent lvalue, or the pointee cell it came from).
//!
//! All conversion happens before the first write, so a failing store leaves
//! the original storage untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use backd_ir::Name;

use crate::convert::{convert, convert_key};
use crate::errors::{
    index_out_of_range, invalid_slice_index, no_such_member, not_settable, slice_length_mismatch,
    type_conversion, type_invalid, EvalError,
};
use crate::types::Type;
use crate::value::{ArrayValue, MapValue, PointerValue, StructValue, Value};

/// Outcome of a container store.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Existing storage was written; carries the value actually stored.
    InPlace(Value),
    /// A new container replaces the old one and must be rebound.
    Replaced(Value),
}

impl Mutation {
    #[inline]
    pub fn into_value(self) -> Value {
        match self {
            Mutation::InPlace(v) | Mutation::Replaced(v) => v,
        }
    }
}

impl StructValue {
    /// Store into a settable field after converting to its declared type.
    pub fn set_field(&self, field: &str, value: &Value) -> Result<Mutation, EvalError> {
        let Some((index, def)) = self.def.field(field) else {
            return Err(no_such_member(
                &Name::new(field),
                &format!("struct {}", self.def.name()),
            ));
        };
        if !def.settable {
            return Err(not_settable(format!("struct member '{field}'")));
        }
        let converted = convert(value, &def.ty)?;
        self.fields.write()[index] = converted.clone();
        Ok(Mutation::InPlace(converted))
    }
}

impl MapValue {
    /// Store `value` under `key`, materializing the map first if it is nil.
    pub fn insert(&self, key: &Value, value: &Value) -> Result<Mutation, EvalError> {
        let key = convert_key(key, &self.key)?;
        let value = convert(value, &self.value)?;
        match &self.entries {
            Some(entries) => {
                entries.write().insert(key, value.clone());
                Ok(Mutation::InPlace(value))
            }
            None => {
                tracing::debug!(key = %key, "materializing nil map");
                let mut entries = BTreeMap::new();
                entries.insert(key, value);
                Ok(Mutation::Replaced(Value::Map(MapValue::new(
                    self.key.clone(),
                    self.value.clone(),
                    entries,
                ))))
            }
        }
    }
}

impl ArrayValue {
    /// Store at `index`.
    ///
    /// `index == len` appends on a fresh backing (growable arrays only). A
    /// value that does not convert to the element type but is itself an
    /// array is appended element by element.
    pub fn set_index(&self, index: i64, value: &Value) -> Result<Mutation, EvalError> {
        let len = self.len();
        let Ok(position) = usize::try_from(index) else {
            return Err(index_out_of_range(index, len));
        };
        if position == len {
            return self.append(index, value);
        }
        if position > len {
            return Err(index_out_of_range(index, len));
        }
        if self.read_only {
            return Err(not_settable(format!("array index {index}")));
        }
        let converted = convert(value, &self.elem)?;
        let mut items = self.items.write();
        // A concurrent writer cannot shrink a backing, but check under the lock anyway.
        let Some(slot) = items.get_mut(position) else {
            return Err(index_out_of_range(index, items.len()));
        };
        *slot = converted.clone();
        Ok(Mutation::InPlace(converted))
    }

    fn append(&self, index: i64, value: &Value) -> Result<Mutation, EvalError> {
        if self.fixed {
            return Err(index_out_of_range(index, self.len()));
        }
        let extra = match convert(value, &self.elem) {
            Ok(converted) => vec![converted],
            Err(err) => match value.unwrap_interface() {
                Value::Array(source) => source
                    .snapshot()
                    .iter()
                    .map(|item| convert(item, &self.elem))
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(err),
            },
        };
        tracing::debug!(len = self.len(), added = extra.len(), "growing array");
        Ok(Mutation::Replaced(Value::Array(self.grown(extra))))
    }

    /// Overwrite `[begin, end)` element-wise from an array of equal length.
    ///
    /// The result carries a fresh array of the converted elements.
    pub fn set_range(&self, begin: i64, end: i64, value: &Value) -> Result<Mutation, EvalError> {
        let len = self.len();
        let (start, stop) = checked_range(begin, end, len)?;
        if self.read_only {
            return Err(not_settable(format!("array slice [{begin}:{end}]")));
        }
        let source = match value.unwrap_interface() {
            Value::Array(source) => source.snapshot(),
            other => {
                let expected = Type::array(self.elem.clone());
                return Err(type_conversion(other.dynamic_type(), &expected));
            }
        };
        if source.len() != stop - start {
            return Err(slice_length_mismatch(start, stop, len, source.len()));
        }
        let converted = source
            .iter()
            .map(|item| convert(item, &self.elem))
            .collect::<Result<Vec<_>, _>>()?;
        {
            let mut items = self.items.write();
            let Some(range) = items.get_mut(start..stop) else {
                return Err(invalid_slice_index(begin, end, len));
            };
            range.clone_from_slice(&converted);
        }
        Ok(Mutation::InPlace(Value::array(self.elem.clone(), converted)))
    }
}

/// Validate a half-open range against `len`.
pub fn checked_range(begin: i64, end: i64, len: usize) -> Result<(usize, usize), EvalError> {
    match (usize::try_from(begin), usize::try_from(end)) {
        (Ok(start), Ok(stop)) if start <= stop && stop <= len => Ok((start, stop)),
        _ => Err(invalid_slice_index(begin, end, len)),
    }
}

impl PointerValue {
    /// Write the pointee as-is.
    pub fn store(&self, value: Value) -> Result<Mutation, EvalError> {
        let Some(cell) = &self.cell else {
            return Err(type_invalid("nil pointer dereference"));
        };
        *cell.write() = value.clone();
        Ok(Mutation::InPlace(value))
    }
}

/// Build the string that results from writing `value` at character `index`.
///
/// Strings never change in place; the result is always `Replaced`.
pub fn string_set_index(s: &str, index: i64, value: &Value) -> Result<Mutation, EvalError> {
    let piece = match value.unwrap_interface() {
        Value::Str(piece) => Arc::clone(piece),
        other => return Err(type_conversion(other.dynamic_type(), &Type::Str)),
    };
    let len = s.chars().count();
    let position = usize::try_from(index)
        .ok()
        .filter(|&p| p <= len)
        .ok_or_else(|| index_out_of_range(index, len))?;

    let mut rebuilt = String::with_capacity(s.len() + piece.len());
    rebuilt.extend(s.chars().take(position));
    rebuilt.push_str(&piece);
    rebuilt.extend(s.chars().skip(position + 1));
    Ok(Mutation::Replaced(Value::string(rebuilt)))
}

#[cfg(test)]
mod tests;
