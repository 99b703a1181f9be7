use crate::core::preferences::PreferenceStore;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "preferences";

/// Preference store persisted in a fjall keyspace
pub struct DiskPreferenceStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskPreferenceStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open preference store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open preference partition")?;
        debug!("Opened preference store at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl PreferenceStore for DiskPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.partition.get(key.as_bytes())? {
            Some(value) => {
                let value = String::from_utf8(value.to_vec())
                    .with_context(|| format!("Stored preference {key} is not valid UTF-8"))?;
                debug!(key, "Preference HIT");
                Ok(Some(value))
            }
            None => {
                debug!(key, "Preference MISS");
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.partition.insert(key.as_bytes(), value.as_bytes())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(key, value, "Preference PUT");
        Ok(())
    }
}
