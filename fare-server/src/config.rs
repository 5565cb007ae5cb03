//! Server configuration from the environment.
//!
//! Only `main` reads the environment; everything below it takes plain
//! config structs.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::AirportCode;

/// Errors reading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

fn invalid(var: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        message: message.into(),
    }
}

/// A fare source endpoint. Its name doubles as its snapshot name.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub name: String,
    pub base_url: String,
}

/// Everything `main` needs to wire the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `FARE_SERVER_ADDR`
    pub addr: SocketAddr,
    /// `FARE_SOURCES`, as `name=url,name=url`
    pub sources: Vec<SourceSpec>,
    /// `FARE_API_KEY`, sent to every fare source
    pub api_key: Option<String>,
    /// `FARE_MAX_REQUESTS`, fare lookups per source per refresh
    pub max_requests: usize,
    /// `CURRENCY_API_URL`
    pub currency_api_url: String,
    /// `BASE_CURRENCY`
    pub base_currency: String,
    /// `GRAPH_DIR`
    pub graph_dir: PathBuf,
    /// `REFRESH_INTERVAL_SECS`
    pub refresh_interval: Duration,
    /// `AIRPORTS_REFRESH_INTERVAL_SECS`
    pub airports_refresh_interval: Duration,
    /// `ALLOWED_AIRPORTS`, comma separated; all airports when unset
    pub allowed_airports: Option<BTreeSet<AirportCode>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            sources: Vec::new(),
            api_key: None,
            max_requests: 100,
            currency_api_url: "http://127.0.0.1:8081".to_string(),
            base_currency: crate::refresh::DEFAULT_BASE_CURRENCY.to_string(),
            graph_dir: PathBuf::from("data/graphs"),
            refresh_interval: Duration::from_secs(60 * 60),
            airports_refresh_interval: Duration::from_secs(10 * 60),
            allowed_airports: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Unset or blank variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("FARE_SERVER_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|e| invalid("FARE_SERVER_ADDR", format!("{addr:?}: {e}")))?;
        }
        if let Some(sources) = get("FARE_SOURCES") {
            config.sources = parse_sources(&sources)?;
        }
        config.api_key = get("FARE_API_KEY");
        if let Some(n) = get("FARE_MAX_REQUESTS") {
            config.max_requests = parse_number("FARE_MAX_REQUESTS", &n)? as usize;
        }
        if let Some(url) = get("CURRENCY_API_URL") {
            config.currency_api_url = url;
        }
        if let Some(currency) = get("BASE_CURRENCY") {
            config.base_currency = currency.to_ascii_lowercase();
        }
        if let Some(dir) = get("GRAPH_DIR") {
            config.graph_dir = PathBuf::from(dir);
        }
        if let Some(secs) = get("REFRESH_INTERVAL_SECS") {
            config.refresh_interval = parse_interval("REFRESH_INTERVAL_SECS", &secs)?;
        }
        if let Some(secs) = get("AIRPORTS_REFRESH_INTERVAL_SECS") {
            config.airports_refresh_interval =
                parse_interval("AIRPORTS_REFRESH_INTERVAL_SECS", &secs)?;
        }
        if let Some(codes) = get("ALLOWED_AIRPORTS") {
            config.allowed_airports = Some(parse_airports(&codes)?);
        }

        Ok(config)
    }

    /// Snapshot names, one per source.
    pub fn snapshot_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(var, format!("expected a number, got {value:?}")))
}

fn parse_interval(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match parse_number(var, value)? {
        0 => Err(invalid(var, "interval must be positive")),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Parse `name=url,name=url`.
pub fn parse_sources(value: &str) -> Result<Vec<SourceSpec>, ConfigError> {
    let mut sources: Vec<SourceSpec> = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, url) = item
            .split_once('=')
            .ok_or_else(|| invalid("FARE_SOURCES", format!("expected name=url, got {item:?}")))?;
        let (name, url) = (name.trim(), url.trim());

        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_name {
            return Err(invalid("FARE_SOURCES", format!("invalid source name {name:?}")));
        }
        if url.is_empty() {
            return Err(invalid("FARE_SOURCES", format!("source {name:?} has no url")));
        }
        if sources.iter().any(|s| s.name == name) {
            return Err(invalid("FARE_SOURCES", format!("duplicate source {name:?}")));
        }

        sources.push(SourceSpec {
            name: name.to_string(),
            base_url: url.to_string(),
        });
    }
    Ok(sources)
}

/// Parse a comma separated list of airport codes (case-insensitive).
pub fn parse_airports(value: &str) -> Result<BTreeSet<AirportCode>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| AirportCode::parse_normalized(s).map_err(|e| invalid("ALLOWED_AIRPORTS", e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert!(config.sources.is_empty());
        assert_eq!(config.base_currency, "eur");
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
        assert!(config.allowed_airports.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("FARE_SERVER_ADDR", "0.0.0.0:8080"),
            ("FARE_SOURCES", "ryanair=http://a.test, wizzair=http://b.test/"),
            ("FARE_API_KEY", "secret"),
            ("FARE_MAX_REQUESTS", "40"),
            ("CURRENCY_API_URL", "http://rates.test"),
            ("BASE_CURRENCY", "PLN"),
            ("GRAPH_DIR", "/tmp/graphs"),
            ("REFRESH_INTERVAL_SECS", "60"),
            ("AIRPORTS_REFRESH_INTERVAL_SECS", "30"),
            ("ALLOWED_AIRPORTS", "tsf, VIE,,bgy"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.snapshot_names(), vec!["ryanair", "wizzair"]);
        assert_eq!(config.sources[1].base_url, "http://b.test/");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.max_requests, 40);
        assert_eq!(config.currency_api_url, "http://rates.test");
        assert_eq!(config.base_currency, "pln");
        assert_eq!(config.graph_dir, PathBuf::from("/tmp/graphs"));
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.airports_refresh_interval, Duration::from_secs(30));
        let allowed = config.allowed_airports.unwrap();
        assert_eq!(allowed.len(), 3);
        assert!(allowed.contains(&AirportCode::parse("BGY").unwrap()));
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("GRAPH_DIR", "  "), ("FARE_API_KEY", "")])).unwrap();
        assert_eq!(config.graph_dir, PathBuf::from("data/graphs"));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            ("FARE_SERVER_ADDR", "localhost"),
            ("FARE_SOURCES", "ryanair"),
            ("FARE_SOURCES", "../up=http://x"),
            ("FARE_SOURCES", "a=http://x,a=http://y"),
            ("FARE_SOURCES", "a="),
            ("FARE_MAX_REQUESTS", "many"),
            ("REFRESH_INTERVAL_SECS", "0"),
            ("ALLOWED_AIRPORTS", "TSF,VIEN"),
        ];
        for (var, value) in cases {
            let err = ServerConfig::from_lookup(lookup(&[(var, value)])).unwrap_err();
            let ConfigError::Invalid { var: reported, .. } = err;
            assert_eq!(reported, var, "{var}={value}");
        }
    }
}
