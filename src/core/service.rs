//! The display-currency service
//!
//! Owns the active currency and the current rate table. Prices are stored in
//! EUR and converted here for display. Conversion never waits on the network:
//! until a live fetch lands, the static fallback table is used.

use super::config::AppConfig;
use super::currency::{Currency, find_currency, supported};
use super::error::{CurrencyError, CurrencyResult};
use super::format::{NumberFormat, format_money};
use super::locale::{detect_default_currency, system_locale};
use super::preferences::{AUTO_DETECT_KEY, PreferenceStore, Preferences, SELECTED_CURRENCY_KEY};
use super::rates::{RateSource, RateTable};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Locale tag used for default currency detection, e.g. "fr-CA"
    pub locale: String,
    /// Text shown instead of an amount when a price is not fixed
    pub price_on_request: String,
    pub number_format: NumberFormat,
}

impl ServiceOptions {
    /// Resolves options from config, reading the system locale when the
    /// config does not pin one.
    pub fn from_config(config: &AppConfig) -> Self {
        let locale = config
            .locale
            .clone()
            .or_else(system_locale)
            .unwrap_or_default();
        ServiceOptions {
            locale,
            price_on_request: config.price_on_request.clone(),
            number_format: config.number_format.clone(),
        }
    }
}

#[derive(Debug)]
struct State {
    currency: &'static Currency,
    rates: RateTable,
    auto_detect: bool,
}

struct Inner {
    state: RwLock<State>,
    source: Arc<dyn RateSource>,
    store: Arc<dyn PreferenceStore>,
    options: ServiceOptions,
    in_flight: AtomicUsize,
    closed: AtomicBool,
}

/// Marks a rate fetch as in flight until dropped, including when the
/// fetching task is aborted.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh(&self) {
        if self.closed.load(Ordering::SeqCst) {
            debug!("Service closed, skipping rate refresh");
            return;
        }
        let _in_flight = InFlight::enter(&self.in_flight);

        match self.source.fetch_rates().await {
            Ok(remote) => {
                let table = RateTable::from_remote(&remote);
                let mut state = self.write();
                if self.closed.load(Ordering::SeqCst) {
                    debug!("Service closed during rate refresh, dropping result");
                    return;
                }
                state.rates = table;
                info!("Exchange rates refreshed");
            }
            Err(e) => {
                warn!(error = %e, "Exchange rate refresh failed, keeping current rates");
            }
        }
    }
}

pub struct CurrencyService {
    inner: Arc<Inner>,
    startup_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl CurrencyService {
    /// Builds the service from stored preferences and the fallback rates.
    /// No network request is made.
    pub fn new(
        source: Arc<dyn RateSource>,
        store: Arc<dyn PreferenceStore>,
        options: ServiceOptions,
    ) -> Self {
        let prefs = Preferences::load(store.as_ref());
        let stored = if prefs.auto_detect {
            None
        } else {
            prefs.selected_currency.as_deref().and_then(|code| {
                let found = find_currency(code);
                if found.is_none() {
                    warn!(code, "Ignoring unsupported stored currency");
                }
                found
            })
        };
        let currency = stored.unwrap_or_else(|| detect_default_currency(&options.locale));
        debug!(
            currency = currency.code,
            auto_detect = prefs.auto_detect,
            locale = %options.locale,
            "Currency service initialized"
        );

        CurrencyService {
            inner: Arc::new(Inner {
                state: RwLock::new(State {
                    currency,
                    rates: RateTable::fallback(),
                    auto_detect: prefs.auto_detect,
                }),
                source,
                store,
                options,
                in_flight: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
            startup_refresh: Mutex::new(None),
        }
    }

    /// Builds the service and starts the initial rate refresh in the
    /// background. Must be called within a Tokio runtime.
    pub fn start(
        source: Arc<dyn RateSource>,
        store: Arc<dyn PreferenceStore>,
        options: ServiceOptions,
    ) -> Self {
        let service = Self::new(source, store, options);
        let inner = Arc::clone(&service.inner);
        let handle = tokio::spawn(async move { inner.refresh().await });
        *service
            .startup_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        service
    }

    /// Waits for the startup refresh, if one was started and is still pending.
    pub async fn settle(&self) {
        let handle = self
            .startup_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                debug!(error = %e, "Startup rate refresh did not complete");
            }
        }
    }

    /// Cancels the startup refresh. Fetches completing afterwards are discarded.
    pub fn shutdown(&self) {
        {
            // a refresh applies its table under this lock, after checking the flag
            let _state = self.inner.write();
            self.inner.closed.store(true, Ordering::SeqCst);
        }
        let handle = self
            .startup_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// Fetches live rates once. Failures keep the current table and are only logged.
    pub async fn refresh_rates(&self) {
        self.inner.refresh().await
    }

    pub fn current_currency(&self) -> &'static Currency {
        self.inner.read().currency
    }

    pub fn rates(&self) -> RateTable {
        self.inner.read().rates.clone()
    }

    pub fn auto_detect(&self) -> bool {
        self.inner.read().auto_detect
    }

    /// True while a rate fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn locale(&self) -> &str {
        &self.inner.options.locale
    }

    pub fn price_on_request(&self) -> &str {
        &self.inner.options.price_on_request
    }

    fn persist(&self, key: &str, value: &str) -> CurrencyResult<()> {
        self.inner
            .store
            .set(key, value)
            .map_err(|e| CurrencyError::Storage(e.to_string()))
    }

    /// Makes `currency` the active display currency. An explicit choice
    /// always turns auto-detection off.
    ///
    /// The auto-detect flag is stored before the code. If storing the code
    /// fails, a reload falls back to the previously stored code or to
    /// detection, never to a half-applied choice with auto-detect on.
    pub fn set_currency(&self, currency: &Currency) -> CurrencyResult<()> {
        let currency = supported(currency)
            .ok_or_else(|| CurrencyError::InvalidCurrency(currency.code.to_string()))?;

        self.persist(AUTO_DETECT_KEY, "false")?;
        self.persist(SELECTED_CURRENCY_KEY, currency.code)?;

        let mut state = self.inner.write();
        state.currency = currency;
        state.auto_detect = false;
        info!(currency = currency.code, "Display currency set");
        Ok(())
    }

    pub fn set_currency_code(&self, code: &str) -> CurrencyResult<()> {
        let currency =
            find_currency(code).ok_or_else(|| CurrencyError::InvalidCurrency(code.to_string()))?;
        self.set_currency(currency)
    }

    /// Turns locale detection on or off. Enabling it switches to the
    /// detected currency right away.
    pub fn set_auto_detect(&self, enabled: bool) -> CurrencyResult<()> {
        self.persist(AUTO_DETECT_KEY, &enabled.to_string())?;

        let mut state = self.inner.write();
        state.auto_detect = enabled;
        if enabled {
            state.currency = detect_default_currency(&self.inner.options.locale);
        }
        info!(
            auto_detect = enabled,
            currency = state.currency.code,
            "Auto-detect updated"
        );
        Ok(())
    }

    /// Converts an EUR amount into the active currency, formatted for display.
    pub fn convert(&self, amount_eur: f64) -> CurrencyResult<String> {
        if !amount_eur.is_finite() || amount_eur < 0.0 {
            return Err(CurrencyError::InvalidAmount(amount_eur));
        }
        let amount_eur = amount_eur + 0.0;

        let state = self.inner.read();
        let currency = state.currency;
        let rate = state
            .rates
            .rate(currency.code)
            .ok_or_else(|| CurrencyError::InvalidCurrency(currency.code.to_string()))?;

        format_money(
            currency,
            amount_eur * rate,
            &self.inner.options.number_format,
        )
        .ok_or(CurrencyError::InvalidAmount(amount_eur))
    }

    /// Like [`convert`](Self::convert), but a missing or zero price means
    /// "price on request" and yields the configured sentinel text.
    pub fn format_price(&self, amount_eur: Option<f64>) -> CurrencyResult<String> {
        match amount_eur {
            None => Ok(self.price_on_request().to_string()),
            Some(amount) if amount == 0.0 => Ok(self.price_on_request().to_string()),
            Some(amount) => self.convert(amount),
        }
    }
}

impl Drop for CurrencyService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
