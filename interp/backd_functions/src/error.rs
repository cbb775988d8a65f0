//! Function host errors.

use std::fmt;

use backd_value::EvalError;

use crate::function::ValidationError;

/// Errors raised while registering or invoking functions.
#[derive(Debug)]
pub enum FunctionError {
    /// The function record failed validation.
    Invalid(ValidationError),
    /// A function with this id is already registered.
    DuplicateId(String),
    /// A function with this name is already registered.
    DuplicateName(String),
    /// No function with this name is registered.
    UnknownFunction(String),
    /// The function body failed.
    Eval { function: String, source: EvalError },
    /// The worker pool could not be built.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionError::Invalid(err) => write!(f, "invalid function: {err}"),
            FunctionError::DuplicateId(id) => write!(f, "function id '{id}' is already registered"),
            FunctionError::DuplicateName(name) => {
                write!(f, "function name '{name}' is already registered")
            }
            FunctionError::UnknownFunction(name) => write!(f, "unknown function '{name}'"),
            FunctionError::Eval { function, source } => {
                write!(f, "function '{function}' failed: {source}")
            }
            FunctionError::ThreadPool(err) => write!(f, "failed to build worker pool: {err}"),
        }
    }
}

impl std::error::Error for FunctionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FunctionError::Invalid(err) => Some(err),
            FunctionError::Eval { source, .. } => Some(source),
            FunctionError::ThreadPool(err) => Some(err),
            FunctionError::DuplicateId(_)
            | FunctionError::DuplicateName(_)
            | FunctionError::UnknownFunction(_) => None,
        }
    }
}

impl From<ValidationError> for FunctionError {
    fn from(err: ValidationError) -> Self {
        FunctionError::Invalid(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for FunctionError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        FunctionError::ThreadPool(err)
    }
}
