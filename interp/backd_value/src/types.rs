//! Declared types.

use std::fmt;
use std::sync::Arc;

use backd_ir::Name;

/// The static type recorded on a struct field or container.
///
/// `Any` is the dynamic type: every value converts to it unchanged.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Any,
    Bool,
    Int,
    Float,
    Str,
    /// Array with the given element type.
    Array(Arc<Type>),
    /// Map with the given key and value types.
    Map(Arc<Type>, Arc<Type>),
    /// Struct, by type name.
    Struct(Name),
    /// Pointer to the given type.
    Pointer(Arc<Type>),
}

impl Type {
    pub fn array(elem: Type) -> Self {
        Type::Array(Arc::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Arc::new(key), Arc::new(value))
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer(Arc::new(elem))
    }

    pub fn structure(name: &str) -> Self {
        Type::Struct(Name::new(name))
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    /// Whether values of this type can be map keys.
    pub fn is_hashable(&self) -> bool {
        matches!(self, Type::Any | Type::Bool | Type::Int | Type::Str)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Str => f.write_str("str"),
            Type::Array(elem) => write!(f, "[]{elem}"),
            Type::Map(key, value) => write!(f, "map[{key}]{value}"),
            Type::Struct(name) => write!(f, "{name}"),
            Type::Pointer(elem) => write!(f, "*{elem}"),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}
