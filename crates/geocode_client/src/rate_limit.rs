//! Outbound rate limiter for the geocoding provider.
//!
//! The provider allows two requests per second.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

const REQUESTS_PER_SEC: u32 = 2;

/// Token bucket awaited before every outbound geocoding request. It
/// delays, never rejects, so callers see nothing but latency.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limiter: Arc<
        GovLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl RateLimiter {
    /// Create with the provider's published limit.
    pub fn new() -> Self {
        Self::with_limit(REQUESTS_PER_SEC)
    }

    /// Create with a custom per-second limit.
    pub fn with_limit(requests_per_sec: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_sec).expect("limit must be non-zero"));
        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a request slot is available.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
