pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::{currency, ui};
use crate::core::config::AppConfig;
use crate::core::{CurrencyService, ServiceOptions};
use crate::providers::ExchangeRateApiProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Show,
    List,
    Set(String),
    Auto(bool),
    Convert(f64),
    Price(Option<f64>),
    Detect(Option<String>),
}

impl AppCommand {
    /// Whether the output depends on exchange rates.
    fn needs_rates(&self) -> bool {
        matches!(
            self,
            AppCommand::Show | AppCommand::List | AppCommand::Convert(_) | AppCommand::Price(_)
        )
    }
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Runs a command against a freshly started service and returns its output.
pub async fn execute(command: AppCommand, config: &AppConfig, offline: bool) -> Result<String> {
    let store = store::open_preference_store(config)?;
    let source = Arc::new(ExchangeRateApiProvider::from_config(
        &config.providers.exchange_rate,
    )?);
    let options = ServiceOptions::from_config(config);

    let service = if offline || !command.needs_rates() {
        CurrencyService::new(source, store, options)
    } else {
        let service = CurrencyService::start(source, store, options);
        if console::Term::stdout().is_term() {
            let spinner = ui::new_spinner("Fetching exchange rates...");
            service.settle().await;
            spinner.finish_and_clear();
        } else {
            service.settle().await;
        }
        service
    };

    let output = match command {
        AppCommand::Show => currency::show(&service),
        AppCommand::List => currency::list(&service),
        AppCommand::Set(code) => currency::set(&service, &code)?,
        AppCommand::Auto(enabled) => currency::auto(&service, enabled)?,
        AppCommand::Convert(amount) => currency::convert(&service, amount)?,
        AppCommand::Price(amount) => currency::price(&service, amount)?,
        AppCommand::Detect(locale) => currency::detect(&service, locale.as_deref()),
    };

    service.shutdown();
    Ok(output)
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    offline: bool,
) -> Result<()> {
    info!("gallery-fx starting...");
    let config = load_config(config_path)?;
    let output = execute(command, &config, offline).await?;
    println!("{output}");
    Ok(())
}
