//! Attempt throttling for credential checks.
//!
//! Fixed-window counters keyed per client address. Guards the status
//! lookup and sign-in endpoints against password guessing.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use whisper_common::{AppError, AppResult};

/// Rate limit configuration for one endpoint class.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum attempts per window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

pub mod limits {
    use super::RateLimitConfig;

    /// Status lookups and reporter comments.
    pub const STATUS_LOOKUP: RateLimitConfig = RateLimitConfig::new(10, 300);

    /// Staff and user sign-in.
    pub const SIGN_IN: RateLimitConfig = RateLimitConfig::new(10, 300);

    /// Account creation.
    pub const SIGN_UP: RateLimitConfig = RateLimitConfig::new(5, 3600);

    /// Longest window in use, for cleanup.
    pub const MAX_WINDOW_SECS: u64 = 3600;
}

#[derive(Debug, Clone)]
struct RateLimitState {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// Per-key attempt counter.
#[derive(Clone, Default)]
pub struct ApiRateLimiter {
    states: Arc<RwLock<HashMap<String, RateLimitState>>>,
}

impl ApiRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt for `key` and report whether it is allowed.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(config.window_secs);

        let state = states
            .entry(key.to_string())
            .or_insert_with(RateLimitState::new);

        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        let reset = window
            .saturating_sub(now.duration_since(state.window_start))
            .as_secs();

        if state.count >= config.max_requests {
            return RateLimitResult::Limited {
                retry_after: reset.max(1),
            };
        }

        state.count += 1;
        RateLimitResult::Allowed {
            remaining: config.max_requests.saturating_sub(state.count),
            reset,
        }
    }

    /// [`Self::check`], as an error for handlers to propagate.
    pub async fn enforce(&self, key: &str, config: &RateLimitConfig) -> AppResult<()> {
        match self.check(key, config).await {
            RateLimitResult::Allowed { .. } => Ok(()),
            RateLimitResult::Limited { retry_after } => {
                tracing::warn!(key, retry_after, "Attempt limit reached");
                Err(AppError::RateLimited { retry_after })
            }
        }
    }

    /// Drop counters whose window ended long ago.
    pub async fn cleanup(&self, max_window_secs: u64) {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let max_window = Duration::from_secs(max_window_secs * 2);

        states.retain(|_, state| now.duration_since(state.window_start) < max_window);
    }

    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed {
        /// Attempts left in the window.
        remaining: u32,
        /// Seconds until the window resets.
        reset: u64,
    },
    Limited {
        /// Seconds until attempts are accepted again.
        retry_after: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new(5, 60);

        for expected_remaining in (0..5).rev() {
            match limiter.check("ip:10.0.0.1", &config).await {
                RateLimitResult::Allowed { remaining, .. } => {
                    assert_eq!(remaining, expected_remaining);
                }
                RateLimitResult::Limited { .. } => panic!("Expected Allowed"),
            }
        }
    }

    #[tokio::test]
    async fn test_blocks_after_limit() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new(3, 60);

        for _ in 0..3 {
            limiter.check("ip:10.0.0.1", &config).await;
        }

        match limiter.check("ip:10.0.0.1", &config).await {
            RateLimitResult::Limited { retry_after } => assert!(retry_after > 0),
            RateLimitResult::Allowed { .. } => panic!("Expected Limited"),
        }
    }

    #[tokio::test]
    async fn test_separate_keys() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new(1, 60);

        limiter.check("ip:10.0.0.1", &config).await;
        assert!(matches!(
            limiter.check("ip:10.0.0.2", &config).await,
            RateLimitResult::Allowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_enforce_maps_to_app_error() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(limiter.enforce("status:1.2.3.4", &config).await.is_ok());
        assert!(matches!(
            limiter.enforce("status:1.2.3.4", &config).await,
            Err(AppError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_window_reset() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new(1, 0);

        limiter.check("k", &config).await;
        assert!(matches!(
            limiter.check("k", &config).await,
            RateLimitResult::Allowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_cleanup() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new(10, 60);

        limiter.check("a", &config).await;
        limiter.check("b", &config).await;
        assert_eq!(limiter.key_count().await, 2);

        limiter.cleanup(0).await;
        assert_eq!(limiter.key_count().await, 0);
    }

    #[test]
    fn test_status_lookup_limit() {
        assert_eq!(limits::STATUS_LOOKUP.max_requests, 10);
        assert_eq!(limits::STATUS_LOOKUP.window_secs, 300);
    }
}
