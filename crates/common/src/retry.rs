//! Bounded, fixed-interval retry policy.
//!
//! Used where a command completes before its confirmation is observable and the
//! caller has to poll for the outcome a limited number of times, e.g. waiting
//! for a local camera track to be published after the camera was enabled.
//!
//! # Example
//!
//! ```rust
//! use common::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(5, Duration::from_millis(500)).unwrap();
//!
//! assert_eq!(policy.delay_before(1), Duration::ZERO);
//! assert_eq!(policy.delay_before(2), Duration::from_millis(500));
//! assert!(!policy.is_exhausted(4));
//! assert!(policy.is_exhausted(5));
//! ```

use std::time::Duration;
use thiserror::Error;

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Errors building a [`RetryPolicy`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RetryPolicyError {
    /// A policy must allow at least one attempt.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Retry policy with a fixed attempt budget and a constant delay between
/// attempts. The first attempt runs immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    ///
    /// # Errors
    ///
    /// Returns `RetryPolicyError::ZeroAttempts` if `max_attempts` is zero.
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self, RetryPolicyError> {
        if max_attempts == 0 {
            return Err(RetryPolicyError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    /// Maximum number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between consecutive attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay to wait before the given 1-based attempt.
    #[must_use]
    pub const fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.interval
        }
    }

    /// Whether `attempts_made` attempts use up the budget.
    #[must_use]
    pub const fn is_exhausted(&self, attempts_made: u32) -> bool {
        attempts_made >= self.max_attempts
    }

    /// Total time from the first attempt to the last one.
    #[must_use]
    pub fn total_span(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    /// 5 attempts, 500 ms apart.
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}
