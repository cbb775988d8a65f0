//! Variable scoping.
//!
//! An `Environment` is a private stack of local scopes over a global scope
//! that may be shared between concurrently running executions. Locals are
//! owned outright and need no locking; the global scope sits behind a
//! `parking_lot::RwLock` and every access takes the lock for one operation.

mod scope_guard;

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;

use backd_ir::Name;
use backd_value::Value;

pub use scope_guard::ScopedEnvironment;

/// A single scope: unique names mapped to values.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Overwrite an existing binding. Returns `false` if `name` is not bound here.
    #[inline]
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Global scope shared across executions.
pub struct SharedScope(Arc<RwLock<Scope>>);

impl SharedScope {
    pub fn new(scope: Scope) -> Self {
        SharedScope(Arc::new(RwLock::new(scope)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Scope> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Scope> {
        self.0.write()
    }

    pub fn ptr_eq(&self, other: &SharedScope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Clone for SharedScope {
    fn clone(&self) -> Self {
        SharedScope(Arc::clone(&self.0))
    }
}

impl Default for SharedScope {
    fn default() -> Self {
        SharedScope::new(Scope::new())
    }
}

impl fmt::Debug for SharedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedScope({:?})", self.0.read().names())
    }
}

/// Scope chain for one execution.
///
/// With no local scope pushed, definitions land in the global scope.
#[derive(Debug, Default)]
pub struct Environment {
    /// Local scopes, innermost last.
    locals: Vec<Scope>,
    global: SharedScope,
}

impl Environment {
    /// Environment with a fresh, unshared global scope.
    pub fn new() -> Self {
        Environment::default()
    }

    /// Environment rooted at an existing global scope.
    pub fn with_global(global: SharedScope) -> Self {
        Environment {
            locals: Vec::new(),
            global,
        }
    }

    pub fn global(&self) -> &SharedScope {
        &self.global
    }

    /// Number of local scopes.
    pub fn depth(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        self.locals.push(Scope::new());
    }

    /// Pop the innermost local scope. The global scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        self.locals.pop();
    }

    /// Push a scope that is popped when the returned guard drops.
    pub fn scoped(&mut self) -> ScopedEnvironment<'_> {
        ScopedEnvironment::new(self)
    }

    /// Bind `name` in the innermost scope.
    pub fn define(&mut self, name: Name, value: Value) {
        match self.locals.last_mut() {
            Some(scope) => scope.define(name, value),
            None => self.global.write().define(name, value),
        }
    }

    /// Overwrite the nearest existing binding of `name`, innermost first.
    ///
    /// Returns `false`, changing nothing, when `name` is bound nowhere.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        for scope in self.locals.iter_mut().rev() {
            if scope.contains(name) {
                return scope.set(name, value);
            }
        }
        self.global.write().set(name, value)
    }

    /// Nearest binding of `name`, innermost first.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        for scope in self.locals.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value.clone());
            }
        }
        self.global.read().get(name).cloned()
    }
}
