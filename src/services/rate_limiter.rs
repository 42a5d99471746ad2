//! Sliding-window rate limiter for outbound search requests.
//!
//! Tracks the timestamps of requests issued in the trailing window and
//! answers whether another request may be issued now. Pure local
//! computation: it never fails, it only delays.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::domain::models::RateLimitConfig;

/// Rolling-window request limiter
///
/// Owned exclusively by the discovery loop. Timestamps come from
/// [`tokio::time::Instant`] so tests can drive the window on a paused clock.
#[derive(Debug)]
pub struct RateLimiter {
    /// Request timestamps inside the window, oldest first
    history: VecDeque<Instant>,
    /// Maximum requests allowed per window
    max_requests: usize,
    /// Length of the trailing window
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window`
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            history: VecDeque::with_capacity(max_requests.min(8_192)),
            max_requests,
            window,
        }
    }

    /// Create a limiter whose ceiling depends only on whether a credential is configured
    pub fn for_credential(config: &RateLimitConfig, authenticated: bool) -> Self {
        Self::new(
            config.limit_for(authenticated),
            Duration::from_secs(config.window_secs),
        )
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Requests currently counted against the window
    pub fn in_window(&mut self) -> usize {
        self.evict_expired(Instant::now());
        self.history.len()
    }

    /// True iff fewer than `max_requests` timestamps remain in the trailing window
    pub fn may_proceed(&mut self) -> bool {
        self.evict_expired(Instant::now());
        self.history.len() < self.max_requests
    }

    /// Record a request issued now
    pub fn record_request(&mut self) {
        let now = Instant::now();
        self.evict_expired(now);
        self.history.push_back(now);
    }

    /// Time until `may_proceed` would return true; zero when it already does
    pub fn time_until_allowed(&mut self) -> Duration {
        let now = Instant::now();
        self.evict_expired(now);
        if self.history.len() < self.max_requests {
            return Duration::ZERO;
        }

        // The oldest entries must expire until one slot frees up.
        let excess = self.history.len() - self.max_requests;
        self.history
            .get(excess)
            .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Sleep until the window has capacity
    ///
    /// Returns `false` if `cancel` fired before capacity freed up.
    pub async fn wait_until_allowed(&mut self, cancel: &CancellationToken) -> bool {
        loop {
            if cancel.is_cancelled() {
                return false;
            }

            let wait = self.time_until_allowed();
            if wait.is_zero() {
                return true;
            }

            tracing::warn!(
                wait_secs = wait.as_secs(),
                in_window = self.history.len(),
                limit = self.max_requests,
                "Rate limit reached, waiting for window capacity"
            );
            if self.max_requests <= 60 {
                tracing::info!("Set GITHUB_TOKEN to raise the request ceiling");
            }

            tokio::select! {
                () = cancel.cancelled() => return false,
                () = sleep(wait) => {}
            }
        }
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(oldest) = self.history.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}
