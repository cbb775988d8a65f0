//! Backd Functions - tenant function records and their execution host.
//!
//! A [`Function`] is a validated record holding a script body. The
//! [`FunctionHost`] keeps a [`FunctionRegistry`], one global scope shared by
//! every execution, and a rayon pool; each invocation runs on a private
//! environment over those globals.

mod error;
mod function;
mod host;
mod registry;
mod tracing_setup;

pub use error::FunctionError;
pub use function::{Function, ValidationError};
pub use host::{FunctionHost, FunctionHostBuilder, HostConfig, Invocation};
pub use registry::FunctionRegistry;
pub use tracing_setup::init_tracing;
