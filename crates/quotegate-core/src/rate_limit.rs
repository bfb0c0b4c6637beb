//! Fixed-window admission control.
//!
//! A single counter is shared by every caller. The window is reset lazily
//! when a request arrives after it has expired; there is no background
//! timer.
//!
//! Fixed windows allow a burst of up to `2 * max_requests` around a window
//! boundary: a full budget spent just before the reset followed by another
//! full budget just after it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::clock::{Clock, Millis, SystemClock, elapsed_since};
use crate::error::ProxyError;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Limits applied by a [`RateLimiter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per window (default: 30).
    pub max_requests: u32,
    /// Window length (default: 60 seconds).
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Rejects limits that would never admit anything.
    pub fn validate(&self) -> Result<(), ProxyError> {
        if self.max_requests == 0 {
            return Err(ProxyError::invalid_configuration(
                "RATE_LIMIT_MAX_REQUESTS",
                "must be greater than zero",
            ));
        }
        if self.window.as_millis() == 0 {
            return Err(ProxyError::invalid_configuration(
                "RATE_LIMIT_WINDOW_MS",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    fn window_millis(&self) -> Millis {
        self.window.as_millis() as Millis
    }
}

/// Counter state for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    pub window_start: Millis,
}

/// Point-in-time view of the limiter, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateWindowSnapshot {
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    pub window_start: Millis,
    pub window_ms: Millis,
}

/// Process-wide fixed-window rate limiter.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use quotegate_core::{Decision, ManualClock, RateLimitConfig, RateLimiter};
///
/// let clock = ManualClock::new(0);
/// let limiter = RateLimiter::with_clock(
///     RateLimitConfig::new(1, Duration::from_secs(60)),
///     clock.clone(),
/// );
///
/// assert_eq!(limiter.admit(), Decision::Allow);
/// assert_eq!(limiter.admit(), Decision::Reject);
///
/// clock.advance(Duration::from_secs(60));
/// assert_eq!(limiter.admit(), Decision::Allow);
/// ```
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Mutex<RateWindow>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter driven by the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Creates a limiter driven by the given clock.
    ///
    /// The first window starts at the clock's current time.
    pub fn with_clock(config: RateLimitConfig, clock: impl Clock + 'static) -> Self {
        Self::with_shared_clock(config, Arc::new(clock))
    }

    /// Creates a limiter sharing a clock with other components.
    pub fn with_shared_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window = RateWindow {
            count: 0,
            window_start: clock.now_millis(),
        };

        Self {
            config,
            window: Mutex::new(window),
            clock,
        }
    }

    /// Decides whether one more request may proceed.
    ///
    /// Expired windows are reset before counting. Allowed requests consume
    /// one unit of the budget; rejected requests consume nothing.
    pub fn admit(&self) -> Decision {
        let now = self.clock.now_millis();
        let mut window = self.window.lock();

        if elapsed_since(window.window_start, now) >= self.config.window_millis() {
            window.count = 0;
            window.window_start = now;
        }

        if window.count >= self.config.max_requests {
            return Decision::Reject;
        }

        window.count += 1;
        Decision::Allow
    }

    /// Time until the current window ends.
    pub fn retry_after(&self) -> Duration {
        let now = self.clock.now_millis();
        let window = self.window.lock();
        let elapsed = elapsed_since(window.window_start, now);

        Duration::from_millis(self.config.window_millis().saturating_sub(elapsed))
    }

    /// Current window state without consuming budget.
    pub fn snapshot(&self) -> RateWindowSnapshot {
        let window = *self.window.lock();

        RateWindowSnapshot {
            count: window.count,
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(window.count),
            window_start: window.window_start,
            window_ms: self.config.window_millis(),
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("window", &*self.window.lock())
            .finish()
    }
}
