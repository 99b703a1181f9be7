pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::preferences::PreferenceStore;
use anyhow::Result;
use disk::DiskPreferenceStore;
use std::sync::Arc;

/// Opens the persistent preference store under the configured data path.
pub fn open_preference_store(config: &AppConfig) -> Result<Arc<dyn PreferenceStore>> {
    let path = config.default_data_path()?.join("preferences");
    Ok(Arc::new(DiskPreferenceStore::open(&path)?))
}
