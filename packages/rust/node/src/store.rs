//! In-process variable store.

use std::collections::BTreeMap;

use serde::Serialize;
use xmlfetch_shared::VariableStore;

/// Ordered in-memory [`VariableStore`].
///
/// Keeps explicit nulls, so a variable set to `None` is distinguishable from
/// one that was never written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MemoryStore {
    vars: BTreeMap<String, Option<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` was ever written, including as null.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Number of stored variables, null entries included.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variable has been stored.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl VariableStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned().flatten()
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        self.vars.insert(key.to_string(), value);
    }
}
