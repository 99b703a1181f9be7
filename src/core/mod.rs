//! Core currency logic

pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod locale;
pub mod log;
pub mod preferences;
pub mod rates;
pub mod service;

// Re-export main types for cleaner imports
pub use currency::{Currency, SUPPORTED_CURRENCIES};
pub use error::{CurrencyError, CurrencyResult};
pub use preferences::PreferenceStore;
pub use rates::{RateOrigin, RateSource, RateTable};
pub use service::{CurrencyService, ServiceOptions};
