//! Exchange-rate provider.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use expensa_core::currency::{CurrencyCode, ExchangeRates};
use expensa_shared::{AppError, CurrencyConfig};

/// Errors raised while fetching rates.
#[derive(Debug, Error)]
pub enum RateError {
    /// The request could not be sent or timed out.
    #[error("rate request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("rate provider returned status {0}")]
    Status(u16),

    /// The provider body could not be decoded.
    #[error("invalid rate payload: {0}")]
    Decode(String),
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// Source of exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates quoted against `base`.
    async fn latest(&self, base: CurrencyCode) -> Result<ExchangeRates, RateError>;
}

#[derive(Debug, Deserialize)]
struct ProviderPayload {
    rates: BTreeMap<String, Decimal>,
}

/// Provider calling `{api_url}/{base}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    client: reqwest::Client,
    api_url: String,
}

impl HttpRateProvider {
    /// Builds a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CurrencyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn latest(&self, base: CurrencyCode) -> Result<ExchangeRates, RateError> {
        let url = format!("{}/{base}", self.api_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(error = %e, %base, "Exchange rate request failed");
            RateError::Request(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(RateError::Status(response.status().as_u16()));
        }

        let payload: ProviderPayload = response
            .json()
            .await
            .map_err(|e| RateError::Decode(e.to_string()))?;

        Ok(ExchangeRates {
            base,
            rates: payload.rates,
            timestamp: Utc::now(),
        })
    }
}

/// Provider serving a fixed table, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRateProvider {
    tables: BTreeMap<CurrencyCode, BTreeMap<String, Decimal>>,
}

impl StaticRateProvider {
    /// Adds the rates quoted against `base`.
    #[must_use]
    pub fn with_rates<I, K>(mut self, base: CurrencyCode, rates: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<String>,
    {
        self.tables
            .entry(base)
            .or_default()
            .extend(rates.into_iter().map(|(code, rate)| (code.into(), rate)));
        self
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn latest(&self, base: CurrencyCode) -> Result<ExchangeRates, RateError> {
        let rates = self.tables.get(&base).cloned().ok_or(RateError::Status(404))?;
        Ok(ExchangeRates {
            base,
            rates,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_provider_payload_accepts_numeric_rates() {
        let payload: ProviderPayload = serde_json::from_str(
            r#"{"base": "USD", "date": "2025-01-15", "rates": {"USD": 1, "EUR": 0.92}}"#,
        )
        .unwrap();
        assert_eq!(payload.rates["EUR"], dec!(0.92));
    }

    #[test]
    fn test_http_provider_trims_trailing_slash() {
        let provider = HttpRateProvider::new(&CurrencyConfig {
            api_url: "http://rates.local/v4/latest/".to_string(),
            timeout_ms: 100,
        })
        .unwrap();
        assert_eq!(provider.api_url, "http://rates.local/v4/latest");
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider =
            StaticRateProvider::default().with_rates(CurrencyCode::USD, [("EUR", dec!(0.9))]);
        let table = provider.latest(CurrencyCode::USD).await.unwrap();
        assert_eq!(table.rates["EUR"], dec!(0.9));

        let eur = CurrencyCode::parse("EUR").unwrap();
        assert!(matches!(
            provider.latest(eur).await,
            Err(RateError::Status(404))
        ));
    }
}
