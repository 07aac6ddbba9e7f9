//! Retry state and backoff sleeping.

use std::sync::Arc;
use std::time::Duration;

use tradefeed_core::{DomainError, DomainResult};

/// Where a [`RetryState`] sits relative to its budget.
///
/// Derived from the counters on demand; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryPhase {
    /// A failure here will be followed by another attempt.
    CanRetry,
    /// One attempt is still allowed, but a failure ends the record.
    LastTry,
    /// No attempt may be made.
    Exhausted,
}

/// Immutable retry state for a single record.
///
/// `attempt` is 1-based and `max_attempts` is inclusive. `delay` is the
/// backoff slept *before the next* attempt; every [`next`](Self::next) doubles
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    delay: Duration,
}

impl RetryState {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

    /// Build an arbitrary state. Rejects `attempt == 0`.
    pub fn new(attempt: u32, max_attempts: u32, delay: Duration) -> DomainResult<Self> {
        if attempt == 0 {
            return Err(DomainError::validation("retry attempt is 1-based; got 0"));
        }
        Ok(Self {
            attempt,
            max_attempts,
            delay,
        })
    }

    /// First attempt under the given budget.
    pub fn initial(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempt: 1,
            max_attempts,
            delay: base_delay,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt > self.max_attempts
    }

    pub fn is_last_try(&self) -> bool {
        self.attempt == self.max_attempts
    }

    pub fn phase(&self) -> RetryPhase {
        if self.is_exhausted() {
            RetryPhase::Exhausted
        } else if self.is_last_try() {
            RetryPhase::LastTry
        } else {
            RetryPhase::CanRetry
        }
    }

    /// The state for the following attempt: one more attempt, twice the delay.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            attempt: self.attempt.saturating_add(1),
            max_attempts: self.max_attempts,
            delay: self.delay.checked_mul(2).unwrap_or(Duration::MAX),
        }
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::initial(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

/// Blocking pause between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration);
}

impl<S> Sleeper for Arc<S>
where
    S: Sleeper + ?Sized,
{
    fn sleep(&self, delay: Duration) {
        (**self).sleep(delay)
    }
}

/// Sleeps the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
