//! Prefetch status state machine and its read-only projections.
//!
//! # State Machine
//!
//! ```text
//! Idle     --request-->            Loading
//! Loading  --ok-->                 Success  (terminal)
//! Loading  --failure, retry-->     Retrying
//! Loading  --failure, give up-->   Error
//! Loading  --supersede-->          Loading
//! Loading  --spontaneous abort-->  Idle
//! Retrying --request-->            Loading
//! Error    --fresh trigger-->      Loading
//! ```

use std::fmt;

use thiserror::Error;

use super::types::{NetworkSnapshot, PrefetchStatus};

/// Attempted transition that the lifecycle does not allow.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Invalid prefetch status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: PrefetchStatus,
    pub to: PrefetchStatus,
}

/// Canonical lifecycle state of one link.
#[derive(Debug, Clone, Default)]
pub struct StatusStateMachine {
    status: PrefetchStatus,
}

impl StatusStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PrefetchStatus {
        self.status
    }

    /// Whether `from -> to` is a legal transition.
    pub fn can_transition(from: PrefetchStatus, to: PrefetchStatus) -> bool {
        use PrefetchStatus::*;
        matches!(
            (from, to),
            (Idle, Loading)
                | (Loading, Success)
                | (Loading, Retrying)
                | (Loading, Error)
                | (Loading, Loading)
                | (Loading, Idle)
                | (Retrying, Loading)
                | (Error, Loading)
        )
    }

    pub fn transition(&mut self, to: PrefetchStatus) -> Result<PrefetchStatus, InvalidTransition> {
        let from = self.status;
        if !Self::can_transition(from, to) {
            return Err(InvalidTransition { from, to });
        }
        self.status = to;
        Ok(from)
    }
}

/// Everything an observer of a link can see about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub status: PrefetchStatus,
    /// Retries consumed in the current lineage.
    pub attempt: u32,
    pub max_attempts: u32,
    /// Whether a request issued now would pass the eligibility gate.
    pub eligible: bool,
    pub network: NetworkSnapshot,
}

impl StatusSnapshot {
    pub fn indicator(&self) -> StatusIndicator {
        StatusIndicator {
            status: self.status,
            attempt: self.attempt,
            max_attempts: self.max_attempts,
        }
    }
}

/// Projection for a visual status dot and its tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIndicator {
    pub status: PrefetchStatus,
    pub attempt: u32,
    pub max_attempts: u32,
}

impl StatusIndicator {
    /// Tooltip text, with the attempt count once a retry has happened.
    pub fn tooltip(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatusIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prefetch status: {}", self.status)?;
        if self.attempt > 0 {
            write!(f, " (Attempt {}/{})", self.attempt, self.max_attempts)?;
        }
        Ok(())
    }
}
