//! `InterpreterBuilder` for configuring `Interpreter` instances.

use super::{EvalConfig, Interpreter};
use crate::Environment;

/// Builder for `Interpreter`.
#[derive(Debug, Default)]
pub struct InterpreterBuilder {
    config: EvalConfig,
    env: Option<Environment>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum expression nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial environment. Defaults to a fresh one.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            config: self.config,
            depth: 0,
            env: self.env.unwrap_or_default(),
        }
    }
}
