use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::ExchangeRateProviderConfig;
use crate::core::currency::BASE_CURRENCY;
use crate::core::rates::RateSource;

/// Fetches EUR based rates from an exchangerate-api compatible endpoint
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("gallery-fx/0.1")
            .timeout(timeout)
            .build()?;
        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ExchangeRateProviderConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
        let url = format!("{}/v4/latest/{}", self.base_url, BASE_CURRENCY);
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for exchange rates of {}",
                response.status(),
                BASE_CURRENCY
            ));
        }

        let text = response.text().await?;

        let data: LatestRatesResponse = serde_json::from_str(&text).map_err(|e| {
            anyhow!(
                "Failed to parse JSON response for {} rates: {}",
                BASE_CURRENCY,
                e
            )
        })?;

        debug!(count = data.rates.len(), "Received exchange rates");
        Ok(data.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/latest/EUR"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(mock_server: &MockServer) -> ExchangeRateApiProvider {
        ExchangeRateApiProvider::new(&mock_server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "base": "EUR",
            "date": "2024-05-02",
            "rates": {
                "EUR": 1,
                "USD": 1.0712,
                "CAD": 1.4655,
                "HTG": 142.1
            }
        }"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        let rates = provider(&mock_server).fetch_rates().await.unwrap();
        assert_eq!(rates.len(), 4);
        assert_eq!(rates["USD"], 1.0712);
        assert_eq!(rates["EUR"], 1.0);
        assert_eq!(rates["HTG"], 142.1);
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mock_server = create_mock_server(
            ResponseTemplate::new(200).set_body_string(r#"{"rates": {"GBP": 0.85}}"#),
        )
        .await;

        let base_url = format!("{}/", mock_server.uri());
        let provider = ExchangeRateApiProvider::new(&base_url, Duration::from_secs(5)).unwrap();
        let rates = provider.fetch_rates().await.unwrap();
        assert_eq!(rates["GBP"], 0.85);
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server(ResponseTemplate::new(500)).await;

        let result = provider(&mock_server).fetch_rates().await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for exchange rates of EUR"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_response = r#"{ "conversion_rates": { "USD": 1.07 } }"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        let result = provider(&mock_server).fetch_rates().await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for EUR rates")
        );
    }

    #[tokio::test]
    async fn test_non_numeric_rate_is_malformed() {
        let mock_response = r#"{ "rates": { "USD": "1.07" } }"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        assert!(provider(&mock_server).fetch_rates().await.is_err());
    }
}
