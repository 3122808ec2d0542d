//! Error types for search operations

use thiserror::Error;

/// Errors that can occur while talking to the search provider
#[derive(Error, Debug)]
pub enum SearchError {
    /// The query or freshness value was rejected before any network I/O
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller gave up while waiting for a rate-limit token
    #[error("rate limit exceeded: request cancelled while waiting for capacity")]
    RateLimited,

    /// The caller gave up while the HTTP request was in flight
    #[error("search request cancelled")]
    Cancelled,

    /// The HTTP client timeout elapsed
    #[error("request to search provider timed out")]
    Timeout,

    /// The response body exceeded the read cap
    #[error("search provider response exceeds {limit} bytes")]
    ResponseTooLarge {
        /// Maximum accepted body size in bytes
        limit: usize,
    },

    /// The provider answered with a non-2xx status
    #[error(
        "search provider returned status {status}{}",
        .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    ProviderError {
        /// HTTP status code
        status: u16,
        /// Error message decoded from the response body, if any
        message: Option<String>,
    },

    /// The 2xx body was not valid JSON for the expected shape
    #[error("failed to parse search provider response: {0}")]
    DecodeError(#[source] serde_json::Error),

    /// The 2xx body had no result list at all
    #[error("search provider returned an empty or invalid response")]
    EmptyResponse,

    /// Connection-level failure (DNS, TLS, refused connection, ...)
    #[error("failed to send request to search provider: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Transport(err)
        }
    }
}

/// Result type alias for search operations
pub type BochaResult<T> = Result<T, SearchError>;
