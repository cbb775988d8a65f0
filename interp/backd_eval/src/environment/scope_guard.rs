//! RAII scope guard for `Environment`.
//!
//! The guard pushes a local scope on creation and pops it on drop, including
//! during unwinding, so an early `?` return from a loop body cannot leave a
//! stale scope behind.

use std::ops::{Deref, DerefMut};

use super::Environment;

/// Access the environment through this guard; it derefs to `Environment`.
pub struct ScopedEnvironment<'env> {
    env: &'env mut Environment,
}

impl<'env> ScopedEnvironment<'env> {
    pub(super) fn new(env: &'env mut Environment) -> Self {
        env.push_scope();
        ScopedEnvironment { env }
    }
}

impl Drop for ScopedEnvironment<'_> {
    fn drop(&mut self) {
        self.env.pop_scope();
    }
}

impl Deref for ScopedEnvironment<'_> {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl DerefMut for ScopedEnvironment<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}
