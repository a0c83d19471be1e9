//! Per-link prefetch counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for monitoring a link's prefetch activity.
#[derive(Debug, Default)]
pub struct LinkStats {
    /// Requests that reached the executor.
    pub requests: AtomicU64,
    /// Requests rejected by the eligibility gate.
    pub denied: AtomicU64,
    /// Requests dropped because a call was already loading.
    pub deduplicated: AtomicU64,
    /// Calls issued to the prefetch primitive.
    pub started: AtomicU64,
    pub succeeded: AtomicU64,
    /// Retries scheduled after recoverable failures.
    pub retries: AtomicU64,
    /// Terminal failures.
    pub failed: AtomicU64,
    /// Call results discarded because they were superseded or aborted.
    pub cancelled: AtomicU64,
}

impl LinkStats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> LinkStatsSnapshot {
        LinkStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            started: self.started.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of link statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatsSnapshot {
    pub requests: u64,
    pub denied: u64,
    pub deduplicated: u64,
    pub started: u64,
    pub succeeded: u64,
    pub retries: u64,
    pub failed: u64,
    pub cancelled: u64,
}
