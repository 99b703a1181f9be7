use super::format::NumberFormat;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RATES_BASE_URL: &str = "https://api.exchangerate-api.com";
pub const DEFAULT_PRICE_ON_REQUEST: &str = "Sur demande";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ExchangeRateProviderConfig {
    fn default() -> Self {
        ExchangeRateProviderConfig {
            base_url: DEFAULT_RATES_BASE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchange_rate: ExchangeRateProviderConfig,
}

fn default_price_on_request() -> String {
    DEFAULT_PRICE_ON_REQUEST.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Locale tag overriding the system locale, e.g. "fr-CA"
    pub locale: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_price_on_request")]
    pub price_on_request: String,
    #[serde(default)]
    pub number_format: NumberFormat,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            locale: None,
            providers: ProvidersConfig::default(),
            price_on_request: default_price_on_request(),
            number_format: NumberFormat::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "gallery", "gallery-fx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "gallery", "gallery-fx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
