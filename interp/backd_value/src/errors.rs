//! Error types for evaluation and assignment.
//!
//! `EvalErrorKind` is the structured category; factory functions are the
//! public way to build errors and populate both `kind` and `message`.
//! Every error is terminal for the assignment that raised it.

use std::fmt;

use backd_ir::{Name, Span};

use crate::types::Type;
use crate::value::{Kind, Value};

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Resolution
    UndefinedSymbol {
        name: Name,
    },
    NoSuchMember {
        field: Name,
        type_name: String,
    },
    NotSettable {
        target: String,
    },

    // Conversion
    TypeConversion {
        from: String,
        to: String,
    },

    // Indexing
    IndexNotNumeric {
        kind: Kind,
    },
    IndexOutOfRange {
        index: i64,
        len: usize,
    },
    InvalidSliceIndex {
        begin: i64,
        end: i64,
        len: usize,
    },

    // Dispatch
    UnsupportedOperation {
        operation: &'static str,
        kind: Kind,
    },
    TypeInvalid {
        detail: String,
    },
    InvalidOperation {
        detail: String,
    },

    // Resources
    DepthLimitExceeded {
        limit: usize,
    },

    /// Free-form error raised by embedders.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedSymbol { name } => write!(f, "undefined symbol '{name}'"),
            Self::NoSuchMember { field, type_name } => {
                write!(f, "no member named '{field}' for {type_name}")
            }
            Self::NotSettable { target } => write!(f, "{target} cannot be assigned"),
            Self::TypeConversion { from, to } => {
                write!(f, "type {from} cannot be assigned to type {to}")
            }
            Self::IndexNotNumeric { kind } => write!(f, "index must be a number, got {kind}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::InvalidSliceIndex { begin, end, len } => {
                write!(f, "invalid slice index [{begin}:{end}] for length {len}")
            }
            Self::UnsupportedOperation { operation, kind } => {
                write!(f, "{operation} is not supported on {kind}")
            }
            Self::TypeInvalid { detail } => write!(f, "type invalid: {detail}"),
            Self::InvalidOperation { detail } => write!(f, "invalid operation: {detail}"),
            Self::DepthLimitExceeded { limit } => {
                write!(f, "maximum nesting depth exceeded (limit: {limit})")
            }
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message. For factory-built errors this equals
    /// `kind.to_string()` unless the factory adds detail.
    pub message: String,
    /// Source location of the expression that failed.
    pub span: Option<Span>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
        }
    }

    fn from_kind_with_message(kind: EvalErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a source span, replacing any previous one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a source span unless a more specific one is already present.
    ///
    /// Errors travel outward through nested lvalues; the innermost span wins.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() && !span.is_dummy() {
            self.span = Some(span);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} at {span}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for EvalError {}

// Resolution Errors

/// Assignment to a dotted name that is not bound anywhere, or lookup of an
/// unbound name.
#[cold]
pub fn undefined_symbol(name: &Name) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedSymbol { name: name.clone() })
}

#[cold]
pub fn no_such_member(field: &Name, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMember {
        field: field.clone(),
        type_name: type_name.to_string(),
    })
}

/// The addressed location rejects writes (unexported field, read-only array).
#[cold]
pub fn not_settable(target: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotSettable {
        target: target.into(),
    })
}

// Conversion Errors

#[cold]
pub fn type_conversion(from: impl fmt::Display, to: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeConversion {
        from: from.to_string(),
        to: to.to_string(),
    })
}

// Index Errors

#[cold]
pub fn index_not_numeric(kind: Kind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexNotNumeric { kind })
}

#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index, len })
}

#[cold]
pub fn invalid_slice_index(begin: i64, end: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidSliceIndex { begin, end, len })
}

/// A range write whose source does not cover the addressed range exactly.
#[cold]
pub fn slice_length_mismatch(begin: usize, end: usize, len: usize, source_len: usize) -> EvalError {
    let begin = i64::try_from(begin).unwrap_or(i64::MAX);
    let end = i64::try_from(end).unwrap_or(i64::MAX);
    EvalError::from_kind_with_message(
        EvalErrorKind::InvalidSliceIndex { begin, end, len },
        format!(
            "invalid slice index [{begin}:{end}]: range holds {} elements, value has {source_len}",
            end.saturating_sub(begin)
        ),
    )
}

// Dispatch Errors

#[cold]
pub fn unsupported_operation(operation: &'static str, kind: Kind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedOperation { operation, kind })
}

/// The target is nil or otherwise not a usable value of its kind.
#[cold]
pub fn type_invalid(detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeInvalid {
        detail: detail.into(),
    })
}

#[cold]
pub fn invalid_operation(detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperation {
        detail: detail.into(),
    })
}

#[cold]
pub fn depth_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DepthLimitExceeded { limit })
}
