//! Fare source error types.

/// Errors from a fare source.
#[derive(Debug, thiserror::Error)]
pub enum FareSourceError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The source rejected the request itself (HTTP 400, 413, 414).
    ///
    /// Retrying with other routes will not help, so callers stop querying
    /// the source for the rest of the run.
    #[error("malformed request ({status}): {message}")]
    MalformedRequest { status: u16, message: String },

    /// The source does not fly this route on this date
    #[error("route not available")]
    RouteUnavailable,

    /// Rate limited by the source
    #[error("rate limited by fare source")]
    RateLimited,

    /// Invalid credentials
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl FareSourceError {
    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 | 413 | 414 => FareSourceError::MalformedRequest {
                status,
                message: body,
            },
            401 | 403 => FareSourceError::Unauthorized,
            404 => FareSourceError::RouteUnavailable,
            429 => FareSourceError::RateLimited,
            _ => FareSourceError::Api {
                status,
                message: body,
            },
        }
    }

    /// Whether the source should not be queried again this run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FareSourceError::MalformedRequest { .. })
    }
}
