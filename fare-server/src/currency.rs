//! Currency conversion factors.
//!
//! Currency codes are compared case-insensitively and handled lowercased
//! (`eur`, `pln`), matching what fare sources quote.

use std::collections::HashMap;
use std::future::Future;

use serde::Deserialize;

/// Errors resolving a conversion factor.
#[derive(Debug, thiserror::Error)]
pub enum CurrencyError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate API returned a non-success status
    #[error("rate API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate API response could not be decoded
    #[error("rate API returned invalid JSON: {0}")]
    Json(String),

    /// No rate known for this pair
    #[error("no conversion rate from {from} to {to}")]
    UnknownPair { from: String, to: String },

    /// The rate was zero, negative or not a number
    #[error("invalid conversion rate {rate} from {from} to {to}")]
    InvalidRate { from: String, to: String, rate: f64 },
}

/// Resolves multiplicative conversion factors between currencies.
pub trait CurrencyResolver: Send + Sync {
    /// Factor `f` such that `amount_in_from * f == amount_in_to`.
    fn get_conversion_factor(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<f64, CurrencyError>> + Send;
}

fn check_rate(from: &str, to: &str, rate: f64) -> Result<f64, CurrencyError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(CurrencyError::InvalidRate {
            from: from.to_string(),
            to: to.to_string(),
            rate,
        })
    }
}

/// Configuration for the rate API client.
#[derive(Debug, Clone)]
pub struct CurrencyClientConfig {
    /// Base URL for the rate API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CurrencyClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    rate: f64,
}

/// Rate API client: `GET {base}/rates?from=..&to=..` answering `{"rate": n}`.
#[derive(Debug, Clone)]
pub struct HttpCurrencyClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCurrencyClient {
    pub fn new(config: CurrencyClientConfig) -> Result<Self, CurrencyError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl CurrencyResolver for HttpCurrencyClient {
    async fn get_conversion_factor(&self, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let url = format!("{}/rates", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("from", from), ("to", to)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CurrencyError::UnknownPair {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CurrencyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let parsed: RateResponse =
            serde_json::from_str(&body).map_err(|e| CurrencyError::Json(e.to_string()))?;
        check_rate(from, to, parsed.rate)
    }
}

/// A fixed rate table.
///
/// Pairs are looked up in both directions; the reverse of a known pair
/// resolves to the reciprocal.
#[derive(Debug, Clone, Default)]
pub struct FixedRates {
    rates: HashMap<(String, String), f64>,
}

impl FixedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rate: one unit of `from` is worth `rate` units of `to`.
    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates
            .insert((from.to_ascii_lowercase(), to.to_ascii_lowercase()), rate);
        self
    }
}

impl CurrencyResolver for FixedRates {
    async fn get_conversion_factor(&self, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let from_key = from.to_ascii_lowercase();
        let to_key = to.to_ascii_lowercase();
        if from_key == to_key {
            return Ok(1.0);
        }

        if let Some(rate) = self.rates.get(&(from_key.clone(), to_key.clone())) {
            return check_rate(from, to, *rate);
        }
        if let Some(rate) = self.rates.get(&(to_key, from_key)) {
            return check_rate(from, to, 1.0 / *rate);
        }
        Err(CurrencyError::UnknownPair {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
