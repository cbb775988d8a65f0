//! Backd Value - the runtime value model of the tenant-script interpreter.
//!
//! # Contents
//!
//! - [`Value`]: closed tagged union of every runtime value, with [`Kind`] for
//!   introspection.
//! - [`Type`]: declared types recorded on struct fields and containers.
//! - [`convert`] / [`to_index`]: the explicit coercion table. Nothing converts
//!   implicitly anywhere else.
//! - Container mutation (`set_field`, `insert`, `set_index`, `set_range`,
//!   [`string_set_index`], `store`): every mutation reports a [`Mutation`] that
//!   says whether the container was changed in place or replaced, in which
//!   case the caller must rebind the replacement into the parent slot.
//! - [`EvalError`] / [`EvalErrorKind`]: the error taxonomy shared by the
//!   evaluator and the assignment engine.
//!
//! # Sharing
//!
//! Arrays, maps, structs and pointers are handles: cloning a handle aliases the
//! same storage, and each storage sits behind its own `parking_lot::RwLock` so
//! executions running on different threads can share containers reachable
//! from the global scope. Locks are held for a single read or write only.

mod convert;
mod errors;
mod mutate;
mod types;
mod value;

pub use convert::{convert, convert_key, to_index};
pub use errors::{
    depth_limit_exceeded, index_not_numeric, index_out_of_range, invalid_operation,
    invalid_slice_index, no_such_member, not_settable, slice_length_mismatch, type_conversion,
    type_invalid, undefined_symbol, unsupported_operation, EvalError, EvalErrorKind, EvalResult,
};
pub use mutate::{checked_range, string_set_index, Mutation};
pub use types::Type;
pub use value::{
    ArrayValue, FieldDef, Kind, MapKey, MapValue, PointerValue, StructDef, StructValue, Value,
};

// Re-export so downstream crates can name values without depending on backd_ir directly.
pub use backd_ir::{Name, Span};
