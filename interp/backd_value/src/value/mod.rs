//! Runtime values for the backd interpreter.
//!
//! Scalars are inline. Strings are immutable `Arc<str>`. Arrays, maps,
//! structs and pointers are handles over lock-protected storage, so an
//! in-place mutation through one handle is visible through every alias.

mod composite;

use std::fmt;
use std::sync::Arc;

pub use composite::{ArrayValue, FieldDef, MapKey, MapValue, PointerValue, StructDef, StructValue};

use crate::types::Type;

/// Kind tag used for dispatch and error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Array,
    Map,
    Struct,
    Pointer,
    Interface,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Struct => "struct",
            Kind::Pointer => "pointer",
            Kind::Interface => "interface",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value in the backd interpreter.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Immutable string; indexed writes build a new one.
    Str(Arc<str>),
    Array(ArrayValue),
    Map(MapValue),
    Struct(StructValue),
    Pointer(PointerValue),
    /// A value stored behind the dynamic type. Unwrapped before dispatch.
    Interface(Arc<Value>),
}

// Factory Methods

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Growable array of the given element type.
    pub fn array(elem: Type, items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::new(elem, items))
    }

    /// Fixed-length array of the given element type.
    pub fn fixed_array(elem: Type, items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::fixed(elem, items))
    }

    pub fn nil_map(key: Type, value: Type) -> Self {
        Value::Map(MapValue::nil(key, value))
    }

    pub fn pointer_to(elem: Type, value: Value) -> Self {
        Value::Pointer(PointerValue::to(elem, value))
    }

    pub fn interface(inner: Value) -> Self {
        Value::Interface(Arc::new(inner))
    }

    /// Zero value of a declared type.
    ///
    /// Struct types have no definition at hand and zero to `Nil`; arrays zero
    /// to an empty growable array; maps and pointers to typed nils.
    pub fn zero(ty: &Type) -> Self {
        match ty {
            Type::Any | Type::Struct(_) => Value::Nil,
            Type::Bool => Value::Bool(false),
            Type::Int => Value::Int(0),
            Type::Float => Value::Float(0.0),
            Type::Str => Value::Str(Arc::from("")),
            Type::Array(elem) => Value::array(Type::clone(elem), Vec::new()),
            Type::Map(key, value) => Value::nil_map(Type::clone(key), Type::clone(value)),
            Type::Pointer(elem) => Value::Pointer(PointerValue::nil(Type::clone(elem))),
        }
    }
}

// Introspection

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
            Value::Pointer(_) => Kind::Pointer,
            Value::Interface(_) => Kind::Interface,
        }
    }

    /// Strip one `Interface` layer.
    #[inline]
    pub fn unwrap_interface(&self) -> &Value {
        match self {
            Value::Interface(inner) => inner,
            other => other,
        }
    }

    /// Concrete type of this value, as recorded on containers.
    ///
    /// `Nil` and interfaces report `Any`.
    pub fn dynamic_type(&self) -> Type {
        match self {
            Value::Nil | Value::Interface(_) => Type::Any,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::Str,
            Value::Array(a) => Type::array(a.elem.clone()),
            Value::Map(m) => Type::map(m.key.clone(), m.value.clone()),
            Value::Struct(s) => Type::Struct(s.def.name().clone()),
            Value::Pointer(p) => Type::pointer(p.elem.clone()),
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        match self.unwrap_interface() {
            Value::Nil => true,
            Value::Map(m) => m.is_nil(),
            Value::Pointer(p) => p.is_nil(),
            _ => false,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.unwrap_interface() {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.unwrap_interface() {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Structural equality.
    ///
    /// Containers compare by contents, pointers by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self.unwrap_interface(), other.unwrap_interface()) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits() || a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.snapshot(), b.snapshot());
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.snapshot(), b.snapshot());
                a.len() == b.len()
                    && a.iter()
                        .zip(&b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equals(vb))
            }
            (Value::Struct(a), Value::Struct(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                a.def.name() == b.def.name()
                    && a.snapshot()
                        .iter()
                        .zip(&b.snapshot())
                        .all(|((_, x), (_, y))| x.equals(y))
            }
            (Value::Pointer(a), Value::Pointer(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

/// Nesting depth past which rendering prints `...`.
///
/// Containers may hold themselves (`a[0] = a` on an `[]any`), so rendering
/// cannot assume the value graph is a tree.
const MAX_RENDER_DEPTH: usize = 32;

/// Render `value`, quoting strings when `quoted`. Nested values are always
/// quoted.
fn render(f: &mut fmt::Formatter<'_>, value: &Value, depth: usize, quoted: bool) -> fmt::Result {
    if depth > MAX_RENDER_DEPTH {
        return f.write_str("...");
    }
    let nested = depth + 1;
    match value {
        Value::Nil => f.write_str("nil"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(n) => write!(f, "{n}"),
        Value::Float(x) => write!(f, "{x}"),
        Value::Str(s) if quoted => write!(f, "{s:?}"),
        Value::Str(s) => f.write_str(s),
        Value::Array(a) => {
            f.write_str("[")?;
            for (i, item) in a.snapshot().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                render(f, item, nested, true)?;
            }
            f.write_str("]")
        }
        Value::Map(m) if m.is_nil() => f.write_str("map[]"),
        Value::Map(m) => {
            f.write_str("{")?;
            for (i, (key, item)) in m.snapshot().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}: ")?;
                render(f, item, nested, true)?;
            }
            f.write_str("}")
        }
        Value::Struct(s) => {
            write!(f, "{}{{", s.type_name())?;
            for (i, (name, item)) in s.snapshot().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: ")?;
                render(f, item, nested, true)?;
            }
            f.write_str("}")
        }
        Value::Pointer(p) => match p.load() {
            Some(pointee) => {
                f.write_str("&")?;
                render(f, &pointee, nested, true)
            }
            None => f.write_str("nil"),
        },
        Value::Interface(inner) if quoted => {
            f.write_str("Interface(")?;
            render(f, inner, nested, true)?;
            f.write_str(")")
        }
        Value::Interface(inner) => render(f, inner, nested, false),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, self, 0, false)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, self, 0, true)
    }
}
