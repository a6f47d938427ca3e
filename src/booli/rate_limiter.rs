use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::debug;

use crate::metrics::registry::BOOLI_RATE_LIMIT_WAITS_TOTAL;

/// Client-side throttle for Booli API requests
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    requests_per_second: u32,
}

impl RateLimiter {
    /// Create a new rate limiter; a rate of zero is raised to one request per second
    pub fn new(requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = GovernorRateLimiter::direct(Quota::per_second(rate));

        Self {
            limiter: Arc::new(limiter),
            requests_per_second: rate.get(),
        }
    }

    /// Wait until a request is allowed
    pub async fn acquire(&self) {
        while let Err(not_until) = self.limiter.check() {
            let wait_time = not_until.wait_time_from(DefaultClock::default().now());
            debug!("Rate limit reached, waiting {:?}", wait_time);
            BOOLI_RATE_LIMIT_WAITS_TOTAL.inc();
            sleep(wait_time).await;
        }
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }
}
