//! Bounded polling for eventually-consistent reads.
//!
//! A custom claim written by the role service only shows up in a session
//! token after the token is refreshed, so readers re-check on a schedule
//! instead of trusting the first answer. [`RetryPolicy`] describes the
//! schedule and [`poll_until`] runs it.
//!
//! ```rust
//! use shiptrack_runtime::retry::{poll_until, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy::fixed(5, Duration::from_secs(1));
//! let role = poll_until(&policy, |attempt| async move {
//!     (attempt >= 2).then_some("CUSTOMER")
//! })
//! .await;
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// How often and how long to poll.
///
/// # Default Values
///
/// - `max_attempts`: 5
/// - `initial_delay`: 1 second
/// - `max_delay`: 1 second
/// - `multiplier`: 1.0 (fixed interval)
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Number of checks after the initial read
    pub max_attempts: usize,
    /// Wait before the first check
    pub initial_delay: Duration,
    /// Upper bound for any single wait
    pub max_delay: Duration,
    /// Growth factor between consecutive waits
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(5, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// `attempts` checks, `interval` apart.
    #[must_use]
    pub const fn fixed(attempts: usize, interval: Duration) -> Self {
        Self {
            max_attempts: attempts,
            initial_delay: interval,
            max_delay: interval,
            multiplier: 1.0,
        }
    }

    /// `attempts` checks, starting at `initial_delay` and doubling up to
    /// `max_delay`.
    #[must_use]
    pub const fn exponential(attempts: usize, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: attempts,
            initial_delay,
            max_delay,
            multiplier: 2.0,
        }
    }

    /// Total time spent waiting if every check comes back empty.
    #[must_use]
    pub fn window(&self) -> Duration {
        (0..self.max_attempts).map(|attempt| self.delay_for_attempt(attempt)).sum()
    }

    /// Wait before the check with 0-based index `attempt`.
    ///
    /// `initial_delay * multiplier^attempt`, capped at `max_delay`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = attempt.min(i32::MAX as usize) as i32;
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);

        if !delay_ms.is_finite() || delay_ms >= self.max_delay.as_millis() as f64 {
            self.max_delay
        } else {
            Duration::from_millis(delay_ms as u64)
        }
    }
}

/// Re-run `check` until it yields a value or the policy runs out of attempts.
///
/// Each attempt first waits [`RetryPolicy::delay_for_attempt`], then calls
/// `check` with the 1-based attempt number. The initial (undelayed) read is the
/// caller's job, so `max_attempts` counts only the follow-up checks.
///
/// Returns `None` when every check came back empty. Dropping the returned
/// future stops polling at the next await point.
pub async fn poll_until<F, Fut, T>(policy: &RetryPolicy, mut check: F) -> Option<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 0..policy.max_attempts {
        sleep(policy.delay_for_attempt(attempt)).await;

        if let Some(value) = check(attempt + 1).await {
            tracing::debug!(attempt = attempt + 1, "Poll observed a value");
            return Some(value);
        }
    }

    tracing::debug!(attempts = policy.max_attempts, "Polling exhausted without a value");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_exponential_delays_double_then_cap() {
        let policy =
            RetryPolicy::exponential(6, Duration::from_millis(250), Duration::from_secs(2));

        let delays: Vec<_> = (0..6).map(|a| policy.delay_for_attempt(a)).collect();

        assert_eq!(
            delays,
            [250, 500, 1000, 2000, 2000, 2000].map(Duration::from_millis)
        );
    }

    #[test]
    fn test_default_window_is_five_seconds() {
        assert_eq!(RetryPolicy::default().window(), Duration::from_secs(5));
    }

    proptest! {
        #[test]
        fn prop_delay_never_exceeds_cap(attempt in 0usize..256, initial_ms in 1u64..5_000, cap_ms in 1u64..60_000) {
            let policy = RetryPolicy::exponential(
                attempt + 1,
                Duration::from_millis(initial_ms),
                Duration::from_millis(cap_ms),
            );

            prop_assert!(policy.delay_for_attempt(attempt) <= Duration::from_millis(cap_ms));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_returns_first_value() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(1));
        let started = tokio::time::Instant::now();

        let seen = poll_until(&policy, |attempt| async move {
            (attempt == 3).then_some(attempt)
        })
        .await;

        assert_eq!(seen, Some(3));
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_gives_up_after_max_attempts() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(1));
        let checks = Arc::new(AtomicUsize::new(0));
        let checks_clone = Arc::clone(&checks);

        let seen: Option<()> = poll_until(&policy, |_| {
            let p = Arc::clone(&checks_clone);
            async move {
                p.fetch_add(1, Ordering::SeqCst);
                None
            }
        })
        .await;

        assert!(seen.is_none());
        assert_eq!(checks.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_poll_stops_checking() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(1));
        let checks = Arc::new(AtomicUsize::new(0));
        let checks_clone = Arc::clone(&checks);

        let poll = poll_until(&policy, move |_| {
            let p = Arc::clone(&checks_clone);
            async move {
                p.fetch_add(1, Ordering::SeqCst);
                None::<()>
            }
        });
        let _ = tokio::time::timeout(Duration::from_millis(2500), poll).await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(checks.load(Ordering::SeqCst), 2);
    }
}
