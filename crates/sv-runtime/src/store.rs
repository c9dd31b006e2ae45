use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use dashmap::DashMap;
use sv_core::{StepVarsError, TypedValue, Variable};
use tracing::debug;

use crate::coerce::render_present;

/// Name-keyed variables of one scope.
///
/// Entries are sharded, so operations on different names do not contend and
/// a write to one name replaces the whole value at once.
#[derive(Debug, Default)]
pub struct VariableStore {
    entries: DashMap<String, TypedValue>,
    /// Writers hold the read side across their insert; closing takes the
    /// write side, so no insert can land after the store is cleared.
    closed: RwLock<bool>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `name`. The new value may have a different kind.
    pub fn set(&self, name: &str, value: TypedValue) -> Result<(), StepVarsError> {
        if name.is_empty() {
            return Err(StepVarsError::EmptyVariableName);
        }
        let closed = self.closed.read().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(StepVarsError::NoActiveScope);
        }
        debug!(variable = name, kind = %value.kind(), "set variable");
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Variable, StepVarsError> {
        self.entries
            .get(name)
            .map(|entry| Variable {
                name: name.to_string(),
                value: entry.value().clone(),
            })
            .ok_or_else(|| StepVarsError::variable_not_found(name))
    }

    pub fn get_value(&self, name: &str) -> Option<TypedValue> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Rendered text of `name`; `None` when absent or stored as null.
    pub fn get_value_text(&self, name: &str) -> Option<String> {
        self.entries
            .get(name)
            .and_then(|entry| render_present(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn delete(&self, name: &str) -> Result<(), StepVarsError> {
        match self.entries.remove(name) {
            Some(_) => {
                debug!(variable = name, "deleted variable");
                Ok(())
            }
            None => Err(StepVarsError::variable_not_found(name)),
        }
    }

    /// Guard for steps that create a new variable.
    pub fn require_absent(&self, name: &str) -> Result<(), StepVarsError> {
        if self.contains(name) {
            return Err(StepVarsError::VariableAlreadyExists {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Guard for steps that change or remove an existing variable.
    pub fn require_exists(&self, name: &str) -> Result<(), StepVarsError> {
        if !self.contains(name) {
            return Err(StepVarsError::variable_not_found(name));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn snapshot(&self) -> BTreeMap<String, TypedValue> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Drops every entry and refuses later writes.
    pub(crate) fn close(&self) {
        let mut closed = self.closed.write().unwrap_or_else(PoisonError::into_inner);
        *closed = true;
        self.entries.clear();
    }
}
