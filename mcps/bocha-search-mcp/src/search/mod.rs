//! Search client for the Bocha web search API
//!
//! [`BochaClient`] performs exactly one POST per call: it waits for a
//! rate-limit token, validates the arguments, sends the request and parses
//! the reply. It never retries.
//! See: https://open.bochaai.com

pub mod error;
pub mod limiter;
pub mod types;

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use error::{BochaResult, SearchError};
pub use limiter::RateLimiter;
pub use types::{
    Freshness, ImageResult, SearchQuery, SearchRequest, SearchResponse, SearchResult,
};

use types::{WireErrorBody, WireRequest, WireResponse};

/// User agent sent with every provider request
pub const USER_AGENT: &str = concat!("bocha-search-mcp/", env!("CARGO_PKG_VERSION"));

/// Hard cap on the provider response body
pub const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Connection settings handed to the client by its owner
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_base_url: String,
    /// Applies to the whole request, redirects included
    pub http_timeout: Duration,
    pub requests_per_second: u32,
    pub burst: u32,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("requests_per_second", &self.requests_per_second)
            .field("burst", &self.burst)
            .finish()
    }
}

/// Trait for search providers
///
/// The tool adapter only talks to this trait so it can be exercised without
/// a network.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Run one search, aborting as soon as `cancel` fires
    async fn search(
        &self,
        cancel: &CancellationToken,
        request: SearchRequest,
    ) -> BochaResult<SearchResponse>;
}

/// HTTP client for the Bocha web search endpoint
pub struct BochaClient {
    client: Client,
    api_key: String,
    api_base_url: String,
    limiter: Arc<RateLimiter>,
    max_response_bytes: usize,
}

impl BochaClient {
    /// Build a client with its own rate limiter
    pub fn new(config: ClientConfig) -> BochaResult<Self> {
        let limiter = Arc::new(RateLimiter::new(config.requests_per_second, config.burst));
        Self::with_limiter(config, limiter)
    }

    /// Build a client sharing an existing rate limiter
    pub fn with_limiter(config: ClientConfig, limiter: Arc<RateLimiter>) -> BochaResult<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .pool_max_idle_per_host(100)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            api_base_url: config.api_base_url,
            limiter,
            max_response_bytes: MAX_RESPONSE_BYTES,
        })
    }

    /// Override the response body cap
    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    async fn execute(&self, query: &SearchQuery) -> BochaResult<SearchResponse> {
        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(&WireRequest::from(query))
            .send()
            .await?;

        let status = response.status();
        let body = read_capped(response, self.max_response_bytes).await?;

        if !status.is_success() {
            // Only the decoded message is kept; the raw body may echo secrets
            let message = serde_json::from_slice::<WireErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty());

            tracing::warn!(status = status.as_u16(), "Search provider returned an error");
            return Err(SearchError::ProviderError {
                status: status.as_u16(),
                message,
            });
        }

        let wire: WireResponse = serde_json::from_slice(&body).map_err(SearchError::DecodeError)?;
        let parsed = wire.into_response()?;

        tracing::debug!(
            results = parsed.results.len(),
            images = parsed.images.len(),
            "Search provider responded"
        );
        Ok(parsed)
    }
}

#[async_trait]
impl SearchService for BochaClient {
    fn name(&self) -> &str {
        "bocha"
    }

    async fn search(
        &self,
        cancel: &CancellationToken,
        request: SearchRequest,
    ) -> BochaResult<SearchResponse> {
        // The token is spent even if validation fails below
        self.limiter.acquire(cancel).await?;

        let query = SearchQuery::try_from(request)?;

        tracing::info!(
            query = %query.query,
            freshness = %query.freshness,
            count = query.count,
            summary = query.summary,
            "Searching"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            result = self.execute(&query) => result,
        }
    }
}

/// Read a response body, failing once it grows past `limit` bytes
async fn read_capped(mut response: Response, limit: usize) -> BochaResult<Vec<u8>> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(SearchError::ResponseTooLarge { limit });
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(SearchError::ResponseTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
