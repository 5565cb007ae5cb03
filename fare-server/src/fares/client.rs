//! HTTP fare source client.
//!
//! Queries a fare API for one route and day at a time, and serves the
//! source's airport listing for the connectivity refresh.

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::domain::AirportCode;
use crate::graph::{AirportDirectory, AirportInfo};

use super::FareSource;
use super::error::FareSourceError;
use super::types::{AirportDto, FareQuote, FareResponse};

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// How much of an undecodable body to keep in the error.
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for a fare source client.
#[derive(Debug, Clone)]
pub struct FareSourceConfig {
    /// Source name, used in logs and metric names
    pub name: String,
    /// Base URL for the API
    pub base_url: String,
    /// Optional API key, sent as `x-apikey`
    pub api_key: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FareSourceConfig {
    /// Create a new config for the named source.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Fare API client.
///
/// Uses a semaphore to limit concurrent requests to the source.
#[derive(Debug, Clone)]
pub struct HttpFareSource {
    name: String,
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpFareSource {
    /// Create a new client with the given configuration.
    pub fn new(config: FareSourceConfig) -> Result<Self, FareSourceError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| FareSourceError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
            headers.insert("x-apikey", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            name: config.name,
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// GET `path` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FareSourceError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FareSourceError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FareSourceError::from_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FareSourceError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
        })
    }
}

impl FareSource for HttpFareSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_flights(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        date: NaiveDate,
    ) -> Result<FareQuote, FareSourceError> {
        let path = format!("/fares/{}/{}", origin, destination);
        let response: FareResponse = self
            .get_json(&path, &[("date", date.format("%Y-%m-%d").to_string())])
            .await?;

        let quote = response.into_quote().map_err(|e| FareSourceError::Json {
            message: e.to_string(),
            body: None,
        })?;

        tracing::debug!(
            source = %self.name,
            %origin,
            %destination,
            %date,
            flights = quote.legs.len(),
            "fetched fares"
        );
        Ok(quote)
    }
}

impl AirportDirectory for HttpFareSource {
    async fn list_airports(&self) -> Result<Vec<AirportInfo>, FareSourceError> {
        let airports: Vec<AirportDto> = self.get_json("/airports", &[]).await?;
        Ok(airports.into_iter().filter_map(AirportDto::into_info).collect())
    }

    async fn connections_from(
        &self,
        code: &AirportCode,
    ) -> Result<Vec<AirportCode>, FareSourceError> {
        let path = format!("/airports/{}/connections", code);
        let codes: Vec<String> = self.get_json(&path, &[]).await?;
        Ok(codes
            .iter()
            .filter_map(|c| match AirportCode::parse(c) {
                Ok(code) => Some(code),
                Err(e) => {
                    tracing::warn!(source = %self.name, error = %e, "skipping invalid connection");
                    None
                }
            })
            .collect())
    }
}
