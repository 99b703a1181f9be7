use crate::core::preferences::PreferenceStore;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory preference store, shared between service instances through an `Arc`
#[derive(Default)]
pub struct MemoryPreferenceStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .inner
            .read()
            .map_err(|_| anyhow!("Preference store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .inner
            .write()
            .map_err(|_| anyhow!("Preference store lock poisoned"))?;
        debug!(key, value, "Preference PUT");
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
