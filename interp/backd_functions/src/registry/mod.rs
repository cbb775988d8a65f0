//! Function registry with unique ids and names.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use backd_ir::Name;

use crate::{Function, FunctionError};

#[derive(Debug, Default)]
pub struct FunctionRegistry {
    by_name: FxHashMap<Name, Arc<Function>>,
    /// id -> name
    ids: FxHashMap<String, Name>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function`; ids and names must both be unused.
    pub fn register(&mut self, function: Function) -> Result<Arc<Function>, FunctionError> {
        if self.ids.contains_key(function.id()) {
            return Err(FunctionError::DuplicateId(function.id().to_string()));
        }
        if self.by_name.contains_key(function.name()) {
            return Err(FunctionError::DuplicateName(function.name().to_string()));
        }
        let function = Arc::new(function);
        self.ids
            .insert(function.id().to_string(), function.name().clone());
        self.by_name
            .insert(function.name().clone(), Arc::clone(&function));
        Ok(function)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Function>> {
        self.by_name.get(name).cloned()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Arc<Function>> {
        self.ids.get(id).and_then(|name| self.get(name))
    }

    /// Remove by name, freeing both its id and its name.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Function>> {
        let function = self.by_name.remove(name)?;
        self.ids.remove(function.id());
        Some(function)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
