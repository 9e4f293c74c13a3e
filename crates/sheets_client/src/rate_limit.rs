//! Rate limiter for the Sheets API.
//!
//! One read quota per client, from `sheets.reads_per_minute` (60 by default).

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = GovLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Read-request limiter shared by clones of the REST client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    read_limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// Create with a custom per-minute limit. Zero is treated as one.
    pub fn per_minute(reads_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(reads_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            read_limiter: Arc::new(GovLimiter::direct(Quota::per_minute(per_minute))),
        }
    }

    /// Wait until a read slot is available.
    pub async fn wait_read(&self) {
        self.read_limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acquire(limiter: &RateLimiter) -> bool {
        limiter.read_limiter.check().is_ok()
    }

    #[test]
    fn test_burst_is_capped_by_quota() {
        let limiter = RateLimiter::per_minute(2);
        assert!(acquire(&limiter));
        assert!(acquire(&limiter));
        assert!(!acquire(&limiter), "third read within the minute should be refused");
    }

    #[test]
    fn test_zero_quota_still_allows_one_read() {
        let limiter = RateLimiter::per_minute(0);
        assert!(acquire(&limiter));
    }
}
