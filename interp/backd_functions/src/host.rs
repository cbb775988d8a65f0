//! Execution host.
//!
//! Every invocation gets its own `Environment`: one local scope seeded with
//! the arguments, rooted at the host's global scope. Locals are never
//! shared; globals and any container reachable from them are, and their
//! locks serialize concurrent writes.

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use smallvec::SmallVec;

use backd_eval::{EvalConfig, Environment, Interpreter, SharedScope, Value};
use backd_ir::Name;

use crate::{Function, FunctionError, FunctionRegistry};

/// Host limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostConfig {
    /// Worker threads for `invoke_all`; 0 lets rayon decide.
    pub threads: usize,
    /// Expression nesting limit applied to every invocation.
    pub max_depth: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            threads: 0,
            max_depth: EvalConfig::DEFAULT_MAX_DEPTH,
        }
    }
}

/// One call for `invoke_all`.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub function: String,
    pub args: SmallVec<[(Name, Value); 4]>,
}

impl Invocation {
    pub fn new(function: &str) -> Self {
        Invocation {
            function: function.to_string(),
            args: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, name: &str, value: Value) -> Self {
        self.args.push((Name::new(name), value));
        self
    }
}

/// Builder for `FunctionHost`.
#[derive(Debug, Default)]
pub struct FunctionHostBuilder {
    config: HostConfig,
    globals: Option<SharedScope>,
}

impl FunctionHostBuilder {
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing global scope. Defaults to a fresh one.
    #[must_use]
    pub fn globals(mut self, globals: SharedScope) -> Self {
        self.globals = Some(globals);
        self
    }

    pub fn build(self) -> Result<FunctionHost, FunctionError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("backd-fn-{i}"))
            .build()?;
        tracing::debug!(
            threads = pool.current_num_threads(),
            max_depth = self.config.max_depth,
            "function host ready"
        );
        Ok(FunctionHost {
            config: self.config,
            globals: self.globals.unwrap_or_default(),
            registry: RwLock::new(FunctionRegistry::new()),
            pool,
        })
    }
}

/// Registry, shared globals and worker pool.
pub struct FunctionHost {
    config: HostConfig,
    globals: SharedScope,
    registry: RwLock<FunctionRegistry>,
    pool: rayon::ThreadPool,
}

impl FunctionHost {
    pub fn builder() -> FunctionHostBuilder {
        FunctionHostBuilder::default()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn globals(&self) -> &SharedScope {
        &self.globals
    }

    pub fn register(&self, function: Function) -> Result<Arc<Function>, FunctionError> {
        let function = self.registry.write().register(function)?;
        tracing::debug!(function = %function.name(), id = function.id(), "registered function");
        Ok(function)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Function>> {
        self.registry.write().remove(name)
    }

    pub fn function(&self, name: &str) -> Option<Arc<Function>> {
        self.registry.read().get(name)
    }

    pub fn function_names(&self) -> Vec<Name> {
        self.registry.read().names()
    }

    /// Run the named function with `args` bound as locals.
    pub fn invoke<I>(&self, name: &str, args: I) -> Result<Value, FunctionError>
    where
        I: IntoIterator<Item = (Name, Value)>,
    {
        let function = self
            .function(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;

        let mut env = Environment::with_global(self.globals.clone());
        env.push_scope();
        for (arg, value) in args {
            env.define(arg, value);
        }

        tracing::debug!(function = name, run_as = ?function.run_as(), "invoking function");
        let mut interp = Interpreter::builder()
            .max_depth(self.config.max_depth)
            .build();
        interp
            .exec_block(function.body(), &mut env)
            .map_err(|source| {
                tracing::debug!(function = name, error = %source, "function failed");
                FunctionError::Eval {
                    function: name.to_string(),
                    source,
                }
            })
    }

    /// Run every call on the worker pool. Results come back in call order.
    pub fn invoke_all(&self, calls: &[Invocation]) -> Vec<Result<Value, FunctionError>> {
        self.pool.install(|| {
            calls
                .par_iter()
                .map(|call| self.invoke(&call.function, call.args.iter().cloned()))
                .collect()
        })
    }
}
