//! Exchange rate tables and the source abstraction

use super::currency::{BASE_CURRENCY, SUPPORTED_CURRENCIES};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Approximate rates per 1 EUR, used until (or instead of) a live fetch.
const FALLBACK_RATES: [(&str, f64); 6] = [
    ("EUR", 1.0),
    ("USD", 1.08),
    ("CAD", 1.47),
    ("HTG", 143.0),
    ("GBP", 0.86),
    ("CHF", 0.95),
];

/// A remote source of EUR-based exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns units of each currency per 1 EUR, keyed by currency code.
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RateOrigin {
    Fallback,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    rates: HashMap<String, f64>,
    origin: RateOrigin,
    fetched_at: Option<DateTime<Utc>>,
}

fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

impl RateTable {
    pub fn fallback() -> Self {
        Self {
            rates: FALLBACK_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
            origin: RateOrigin::Fallback,
            fetched_at: None,
        }
    }

    /// Builds a table from remotely fetched rates.
    ///
    /// Only supported currencies are kept. Codes that are missing or carry a
    /// non-positive or non-finite rate take their fallback value, and the base
    /// currency is pinned to 1.
    pub fn from_remote(remote: &HashMap<String, f64>) -> Self {
        let mut table = Self::fallback();
        for currency in SUPPORTED_CURRENCIES.iter() {
            if currency.code == BASE_CURRENCY {
                continue;
            }
            match remote.get(currency.code) {
                Some(rate) if is_valid_rate(*rate) => {
                    table.rates.insert(currency.code.to_string(), *rate);
                }
                Some(rate) => {
                    debug!(code = currency.code, rate, "Ignoring invalid remote rate");
                }
                None => {
                    debug!(code = currency.code, "Remote rates missing code, using fallback");
                }
            }
        }
        table.origin = RateOrigin::Remote;
        table.fetched_at = Some(Utc::now());
        table
    }

    /// Units of `code` per 1 EUR.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn origin(&self) -> RateOrigin {
        self.origin
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_covers_supported_set() {
        let table = RateTable::fallback();
        for currency in SUPPORTED_CURRENCIES.iter() {
            let rate = table.rate(currency.code).unwrap();
            assert!(rate.is_finite() && rate > 0.0, "bad rate for {}", currency.code);
        }
        assert_eq!(table.rate(BASE_CURRENCY), Some(1.0));
        assert_eq!(table.origin(), RateOrigin::Fallback);
        assert!(table.fetched_at().is_none());
    }

    #[test]
    fn test_from_remote_fills_gaps_from_fallback() {
        let remote = HashMap::from([
            ("EUR".to_string(), 1.0),
            ("USD".to_string(), 1.12),
            ("GBP".to_string(), -3.0),
            ("CHF".to_string(), f64::NAN),
            ("JPY".to_string(), 160.0),
        ]);

        let table = RateTable::from_remote(&remote);
        assert_eq!(table.origin(), RateOrigin::Remote);
        assert!(table.fetched_at().is_some());
        assert_eq!(table.rate("USD"), Some(1.12));
        assert_eq!(table.rate("GBP"), Some(0.86));
        assert_eq!(table.rate("CHF"), Some(0.95));
        assert_eq!(table.rate("CAD"), Some(1.47));
        assert_eq!(table.rate("JPY"), None);
        assert_eq!(table.iter().count(), SUPPORTED_CURRENCIES.len());
    }

    #[test]
    fn test_from_remote_pins_base_rate() {
        let remote = HashMap::from([("EUR".to_string(), 2.0)]);
        let table = RateTable::from_remote(&remote);
        assert_eq!(table.rate("EUR"), Some(1.0));
    }
}
