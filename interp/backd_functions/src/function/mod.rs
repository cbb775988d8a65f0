//! Function records.

use std::fmt;
use std::ops::RangeInclusive;

use backd_ir::{Name, Stmt};

/// Length of a function id.
pub const ID_LEN: usize = 20;

/// Allowed length of a function name.
pub const NAME_LEN: RangeInclusive<usize> = 2..=32;

/// Why a function record was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Id is not exactly 20 ASCII letters or digits.
    InvalidId(String),
    /// Name is not 2 to 32 ASCII letters or digits.
    InvalidName(String),
    EmptyBody,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidId(id) => {
                write!(f, "id '{id}' must be {ID_LEN} letters or digits")
            }
            ValidationError::InvalidName(name) => write!(
                f,
                "name '{name}' must be {} to {} letters or digits",
                NAME_LEN.start(),
                NAME_LEN.end()
            ),
            ValidationError::EmptyBody => f.write_str("function body is empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A named tenant script.
///
/// Construction validates the record, so every `Function` value is valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    id: String,
    name: Name,
    api: bool,
    run_as: Option<String>,
    body: Vec<Stmt>,
}

impl Function {
    pub fn new(id: &str, name: &str, body: Vec<Stmt>) -> Result<Self, ValidationError> {
        if !is_alphanumeric(id, ID_LEN..=ID_LEN) {
            return Err(ValidationError::InvalidId(id.to_string()));
        }
        if !is_alphanumeric(name, NAME_LEN) {
            return Err(ValidationError::InvalidName(name.to_string()));
        }
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        Ok(Function {
            id: id.to_string(),
            name: Name::new(name),
            api: false,
            run_as: None,
            body,
        })
    }

    /// Expose the function through the public API.
    #[must_use]
    pub fn with_api(mut self, api: bool) -> Self {
        self.api = api;
        self
    }

    /// Run under the given user instead of the caller.
    #[must_use]
    pub fn with_run_as(mut self, user: &str) -> Self {
        self.run_as = (!user.is_empty()).then(|| user.to_string());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn is_api(&self) -> bool {
        self.api
    }

    pub fn run_as(&self) -> Option<&str> {
        self.run_as.as_deref()
    }

    pub fn body(&self) -> &[Stmt] {
        &self.body
    }
}

fn is_alphanumeric(s: &str, len: RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphanumeric())
}
