//! Container handles: arrays, maps, structs and pointers.
//!
//! Each handle is cheap to clone and aliases its storage. Reads take the
//! storage's read lock for the duration of one access and hand back owned
//! clones, so no guard ever escapes this module.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use backd_ir::Name;

use super::Value;
use crate::convert::convert;
use crate::errors::{invalid_operation, EvalError};
use crate::types::Type;

// ArrayValue

/// Ordered sequence with a declared element type.
///
/// A fixed array never changes length. A growable array grows only by
/// producing a fresh backing (see `set_index`), never by resizing shared
/// storage, so every alias of the old backing keeps its old length.
#[derive(Clone)]
pub struct ArrayValue {
    pub(crate) elem: Type,
    pub(crate) items: Arc<RwLock<Vec<Value>>>,
    pub(crate) fixed: bool,
    pub(crate) read_only: bool,
}

impl ArrayValue {
    /// Growable array.
    pub fn new(elem: Type, items: Vec<Value>) -> Self {
        ArrayValue {
            elem,
            items: Arc::new(RwLock::new(items)),
            fixed: false,
            read_only: false,
        }
    }

    /// Fixed-length array.
    pub fn fixed(elem: Type, items: Vec<Value>) -> Self {
        ArrayValue {
            fixed: true,
            ..ArrayValue::new(elem, items)
        }
    }

    /// A view of the same backing that rejects element writes.
    #[must_use]
    pub fn read_only(&self) -> Self {
        ArrayValue {
            read_only: true,
            ..self.clone()
        }
    }

    pub fn elem_type(&self) -> &Type {
        &self.elem
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn is_settable(&self) -> bool {
        !self.read_only
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    /// Whether both handles alias the same backing.
    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Fresh growable backing holding the current elements followed by `extra`.
    pub(crate) fn grown(&self, extra: Vec<Value>) -> ArrayValue {
        let mut items = self.snapshot();
        items.extend(extra);
        ArrayValue::new(self.elem.clone(), items)
    }
}

// MapValue

/// Hashable map key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
}

impl MapKey {
    /// Key for a value that is already of a hashable kind.
    pub fn from_value(value: &Value) -> Option<MapKey> {
        match value.unwrap_interface() {
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Int(n) => Some(MapKey::Int(*n)),
            Value::Str(s) => Some(MapKey::Str(Arc::clone(s))),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Int(n) => Value::Int(*n),
            MapKey::Str(s) => Value::Str(Arc::clone(s)),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(b) => write!(f, "{b}"),
            MapKey::Int(n) => write!(f, "{n}"),
            MapKey::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Map with declared key and value types.
///
/// A map without storage is nil: reads see no entries, and the first store
/// materializes a fresh map that the caller must rebind.
#[derive(Clone)]
pub struct MapValue {
    pub(crate) key: Type,
    pub(crate) value: Type,
    pub(crate) entries: Option<Arc<RwLock<BTreeMap<MapKey, Value>>>>,
}

impl MapValue {
    pub fn new(key: Type, value: Type, entries: BTreeMap<MapKey, Value>) -> Self {
        MapValue {
            key,
            value,
            entries: Some(Arc::new(RwLock::new(entries))),
        }
    }

    pub fn empty(key: Type, value: Type) -> Self {
        MapValue::new(key, value, BTreeMap::new())
    }

    pub fn nil(key: Type, value: Type) -> Self {
        MapValue {
            key,
            value,
            entries: None,
        }
    }

    pub fn key_type(&self) -> &Type {
        &self.key
    }

    pub fn value_type(&self) -> &Type {
        &self.value
    }

    pub fn is_nil(&self) -> bool {
        self.entries.is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &MapKey) -> Option<Value> {
        self.entries.as_ref()?.read().get(key).cloned()
    }

    /// Keys in order.
    pub fn keys(&self) -> Vec<MapKey> {
        self.entries
            .as_ref()
            .map(|e| e.read().keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Copy of the current entries in key order.
    pub fn snapshot(&self) -> Vec<(MapKey, Value)> {
        self.entries
            .as_ref()
            .map(|e| e.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn ptr_eq(&self, other: &MapValue) -> bool {
        match (&self.entries, &other.entries) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// StructDef / StructValue

/// One declared struct field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Name,
    pub ty: Type,
    /// Unexported fields are readable but reject assignment.
    pub settable: bool,
}

impl FieldDef {
    pub fn new(name: &str, ty: Type, settable: bool) -> Self {
        FieldDef {
            name: Name::new(name),
            ty,
            settable,
        }
    }

    pub fn exported(name: &str, ty: Type) -> Self {
        FieldDef::new(name, ty, true)
    }

    pub fn unexported(name: &str, ty: Type) -> Self {
        FieldDef::new(name, ty, false)
    }
}

/// Struct definition with O(1) field lookup.
#[derive(Debug)]
pub struct StructDef {
    name: Name,
    fields: Vec<FieldDef>,
    field_indices: FxHashMap<Name, usize>,
}

impl StructDef {
    /// Later duplicates of a field name are unreachable by name.
    pub fn new(name: &str, fields: Vec<FieldDef>) -> Arc<Self> {
        let mut field_indices = FxHashMap::default();
        for (i, field) in fields.iter().enumerate() {
            field_indices.entry(field.name.clone()).or_insert(i);
        }
        Arc::new(StructDef {
            name: Name::new(name),
            fields,
            field_indices,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<(usize, &FieldDef)> {
        let index = *self.field_indices.get(name)?;
        self.fields.get(index).map(|def| (index, def))
    }
}

/// Struct instance.
#[derive(Clone)]
pub struct StructValue {
    pub(crate) def: Arc<StructDef>,
    pub(crate) fields: Arc<RwLock<Vec<Value>>>,
}

impl StructValue {
    /// Instance with every field converted to its declared type.
    pub fn new(def: Arc<StructDef>, values: Vec<Value>) -> Result<Self, EvalError> {
        if values.len() != def.fields.len() {
            return Err(invalid_operation(format!(
                "struct {} has {} fields, got {} values",
                def.name,
                def.fields.len(),
                values.len()
            )));
        }
        let fields = def
            .fields
            .iter()
            .zip(&values)
            .map(|(field, value)| convert(value, &field.ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StructValue {
            def,
            fields: Arc::new(RwLock::new(fields)),
        })
    }

    /// Instance with every field at its type's zero value.
    pub fn zeroed(def: Arc<StructDef>) -> Self {
        let fields = def.fields.iter().map(|f| Value::zero(&f.ty)).collect();
        StructValue {
            def,
            fields: Arc::new(RwLock::new(fields)),
        }
    }

    pub fn def(&self) -> &Arc<StructDef> {
        &self.def
    }

    pub fn type_name(&self) -> &Name {
        &self.def.name
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        let (index, _) = self.def.field(name)?;
        self.fields.read().get(index).cloned()
    }

    /// Field names paired with copies of their current values.
    pub fn snapshot(&self) -> Vec<(Name, Value)> {
        let fields = self.fields.read();
        self.def
            .fields
            .iter()
            .zip(fields.iter())
            .map(|(def, value)| (def.name.clone(), value.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &StructValue) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }
}

// PointerValue

/// Single indirection to a shared cell. A pointer without a cell is nil.
#[derive(Clone)]
pub struct PointerValue {
    pub(crate) elem: Type,
    pub(crate) cell: Option<Arc<RwLock<Value>>>,
}

impl PointerValue {
    /// Pointer to a fresh cell holding `value`.
    pub fn to(elem: Type, value: Value) -> Self {
        PointerValue {
            elem,
            cell: Some(Arc::new(RwLock::new(value))),
        }
    }

    pub fn nil(elem: Type) -> Self {
        PointerValue { elem, cell: None }
    }

    pub fn elem_type(&self) -> &Type {
        &self.elem
    }

    pub fn is_nil(&self) -> bool {
        self.cell.is_none()
    }

    /// Current pointee, or `None` for a nil pointer.
    pub fn load(&self) -> Option<Value> {
        self.cell.as_ref().map(|cell| cell.read().clone())
    }

    pub fn ptr_eq(&self, other: &PointerValue) -> bool {
        match (&self.cell, &other.cell) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}
