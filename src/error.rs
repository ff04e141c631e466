//! Provider error taxonomy.
//!
//! Every failure mode of an upstream weather API maps onto one of these
//! variants. Errors are contained at the adapter boundary: the
//! aggregator converts them into an absent slot plus a log entry, so no
//! provider failure ever reaches the HTTP caller as an error.

use thiserror::Error;

/// Failure of a single provider fetch.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The configured API key environment variable is not set.
    #[error("API key environment variable '{0}' is not set")]
    MissingCredential(String),

    /// The provider rejected our API key (HTTP 401/403).
    #[error("upstream rejected the API key (status {0})")]
    InvalidCredential(u16),

    /// The provider's rate limit was exceeded (HTTP 429).
    #[error("upstream rate limit exceeded")]
    RateLimited,

    /// Any other non-2xx upstream response.
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The request exceeded the configured client timeout.
    #[error("request timed out")]
    Timeout,

    /// The response body was not the JSON shape we expect.
    #[error("failed to parse upstream payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// Connection-level failure (DNS, TLS, refused, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Short stable label for structured log entries.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential(_) => "missing_credential",
            ProviderError::InvalidCredential(_) => "invalid_credential",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::Upstream { .. } => "upstream_error",
            ProviderError::Timeout => "timeout",
            ProviderError::Parse(_) => "parse_error",
            ProviderError::Transport(_) => "transport_error",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Transport(format!("body decode failed: {err}"))
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
