//! Query configuration.

/// Configuration parameters for trip queries.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Number of trips returned when the request does not say.
    pub default_max_results: usize,

    /// Largest ceiling a request may ask for.
    pub max_results_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_max_results: 10,
            max_results_limit: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.default_max_results, 10);
        assert_eq!(config.max_results_limit, 10_000);
    }
}
