//! Token-bucket rate limiting for outbound search requests
//!
//! One limiter is owned by each [`BochaClient`](super::BochaClient) and shared
//! by every concurrent search made through it.

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use tokio_util::sync::CancellationToken;

use super::error::{BochaResult, SearchError};

/// Default sustained request rate (requests per second)
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
/// Default burst capacity
pub const DEFAULT_BURST: u32 = 20;

/// Rate limiter guarding the remote provider
#[derive(Debug)]
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
}

impl RateLimiter {
    /// Create a limiter refilling `requests_per_second` tokens per second with
    /// room for `burst` tokens. Zero values are raised to one.
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        Self::with_quota(Quota::per_second(rate).allow_burst(burst))
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self {
            inner: DefaultDirectRateLimiter::direct(quota),
        }
    }

    /// Wait for one token, giving up as soon as `cancel` fires
    pub async fn acquire(&self, cancel: &CancellationToken) -> BochaResult<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::RateLimited),
            _ = self.inner.until_ready() => Ok(()),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_SECOND, DEFAULT_BURST)
    }
}
