//! Pacing of GitHub core API calls.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Rate limit information for the core API.
#[derive(Debug, Clone)]
pub(crate) struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
}

/// Waits for the core rate limit to reset when few requests remain.
///
/// Hosts without rate limiting (some GitHub Enterprise installs) answer the
/// rate limit endpoint with an error; that is logged and ignored.
pub(crate) async fn ensure_core_rate_limit(octocrab: &Octocrab) {
    match octocrab.ratelimit().get().await {
        Ok(rate_limit) => {
            let core = &rate_limit.resources.core;
            let info = RateLimitInfo {
                remaining: core.remaining as u32,
                reset: core.reset,
            };
            wait_if_needed(&info).await;
        }
        Err(e) => debug!(error = %e, "Rate limit unavailable, continuing"),
    }
}

/// Returns how long to wait before the next request, if at all.
fn wait_duration(info: &RateLimitInfo, now: u64) -> Option<Duration> {
    if info.remaining >= MIN_REMAINING_THRESHOLD || info.reset <= now {
        return None;
    }

    let wait_secs = info.reset - now;
    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }
    Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
}

/// Sleeps until the reset when the limit is low. Returns true if it waited.
pub(crate) async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let Some(wait) = wait_duration(info, now) else {
        return false;
    };

    info!(
        remaining = info.remaining,
        wait_secs = wait.as_secs(),
        "Rate limit low, waiting for reset"
    );
    tokio::time::sleep(wait).await;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_wait_with_capacity() {
        let info = RateLimitInfo {
            remaining: 100,
            reset: 2_000,
        };
        assert_eq!(wait_duration(&info, 1_000), None);
    }

    #[test]
    fn no_wait_after_reset() {
        let info = RateLimitInfo {
            remaining: 1,
            reset: 500,
        };
        assert_eq!(wait_duration(&info, 1_000), None);
    }

    #[test]
    fn waits_until_reset_capped() {
        let soon = RateLimitInfo {
            remaining: 1,
            reset: 1_030,
        };
        assert_eq!(wait_duration(&soon, 1_000), Some(Duration::from_secs(30)));

        let far = RateLimitInfo {
            remaining: 0,
            reset: 1_000 + MAX_WAIT_SECS * 2,
        };
        assert_eq!(
            wait_duration(&far, 1_000),
            Some(Duration::from_secs(MAX_WAIT_SECS))
        );
    }

    #[tokio::test]
    async fn wait_if_needed_returns_immediately_with_capacity() {
        let info = RateLimitInfo {
            remaining: 100,
            reset: 0,
        };
        assert!(!wait_if_needed(&info).await);
    }
}
