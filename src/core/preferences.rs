//! Persisted display preferences

use anyhow::Result;
use tracing::warn;

pub const SELECTED_CURRENCY_KEY: &str = "preferred_currency";
pub const AUTO_DETECT_KEY: &str = "currency_auto_detect";

/// Synchronous string key/value storage for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub selected_currency: Option<String>,
    pub auto_detect: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            selected_currency: None,
            auto_detect: true,
        }
    }
}

impl Preferences {
    /// Reads preferences, treating unreadable or malformed entries as unset.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let selected_currency = store.get(SELECTED_CURRENCY_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Could not read stored currency");
            None
        });

        let auto_detect = match store.get(AUTO_DETECT_KEY) {
            Ok(Some(flag)) => match flag.parse::<bool>() {
                Ok(flag) => flag,
                Err(_) => {
                    warn!(%flag, "Ignoring malformed auto-detect flag");
                    true
                }
            },
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "Could not read auto-detect flag");
                true
            }
        };

        Preferences {
            selected_currency,
            auto_detect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryPreferenceStore;

    #[test]
    fn test_load_defaults() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[test]
    fn test_load_stored_values() {
        let store = MemoryPreferenceStore::new();
        store.set(SELECTED_CURRENCY_KEY, "GBP").unwrap();
        store.set(AUTO_DETECT_KEY, "false").unwrap();

        let prefs = Preferences::load(&store);
        assert_eq!(prefs.selected_currency.as_deref(), Some("GBP"));
        assert!(!prefs.auto_detect);
    }

    #[test]
    fn test_malformed_flag_keeps_auto_detect() {
        let store = MemoryPreferenceStore::new();
        store.set(AUTO_DETECT_KEY, "nope").unwrap();
        assert!(Preferences::load(&store).auto_detect);
    }
}
