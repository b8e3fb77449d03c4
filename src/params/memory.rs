//! In-memory parameter store for local runs and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{ParameterStore, ParameterStoreError};

/// Parameter store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryParameterStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter value, replacing any previous value.
    pub fn put_parameter(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.write().expect("parameter map poisoned");
        values.insert(name.into(), value.into());
    }

    /// Remove a parameter value.
    pub fn delete_parameter(&self, name: &str) {
        let mut values = self.values.write().expect("parameter map poisoned");
        values.remove(name);
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError> {
        let values = self.values.read().expect("parameter map poisoned");
        values
            .get(name)
            .cloned()
            .ok_or_else(|| ParameterStoreError::not_found(name))
    }
}
