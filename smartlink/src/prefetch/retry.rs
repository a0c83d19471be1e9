//! Retry bookkeeping with exponential backoff.
//!
//! Attempts are counted from zero, so the first retry waits the unscaled base
//! delay:
//!
//! ```text
//! attempt 0 → base
//! attempt 1 → base × 2
//! attempt n → base × 2^n
//! ```

use std::time::Duration;

/// Default number of retries after the first failure.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default base delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Retry counters owned by one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryState {
    fn default() -> Self {
        Self {
            attempt_count: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// What to do after a genuine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule another attempt after `delay`. `attempt` is 1-based.
    Retry { delay: Duration, attempt: u32 },
    /// Attempts exhausted.
    GiveUp,
}

/// Compute `base × 2^attempt`, saturating instead of overflowing.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Decides retry vs give-up and tracks the attempt count.
#[derive(Debug, Clone)]
pub struct RetryController {
    state: RetryState,
}

impl RetryController {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            state: RetryState {
                attempt_count: 0,
                max_attempts,
                base_delay,
            },
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn attempt_count(&self) -> u32 {
        self.state.attempt_count
    }

    pub fn max_attempts(&self) -> u32 {
        self.state.max_attempts
    }

    /// Pure decision for a failure observed at `current_attempt`.
    pub fn decide(&self, current_attempt: u32) -> RetryDecision {
        if current_attempt < self.state.max_attempts {
            RetryDecision::Retry {
                delay: backoff_delay(self.state.base_delay, current_attempt),
                attempt: current_attempt + 1,
            }
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Record a genuine failure. Never call this for cancellations.
    pub fn on_failure(&mut self) -> RetryDecision {
        let decision = self.decide(self.state.attempt_count);
        if let RetryDecision::Retry { attempt, .. } = decision {
            self.state.attempt_count = attempt;
        }
        decision
    }

    pub fn on_success(&mut self) {
        self.state.attempt_count = 0;
    }

    /// Start a fresh retry lineage.
    pub fn reset(&mut self) {
        self.state.attempt_count = 0;
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}
