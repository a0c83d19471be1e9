//! Prefetch lifecycle hooks.
//!
//! Hooks fire synchronously from the state transition that causes them, on
//! the link's own task. Implementations should return quickly.

use tracing::{info, warn};

use super::error::PrefetchError;
use super::types::LinkTarget;

/// Observer of a link's prefetch lifecycle.
///
/// Every method has an empty default, so implementors only override the
/// hooks they care about. Cancelled attempts never fire any hook.
pub trait PrefetchObserver: Send + Sync {
    /// A prefetch call is about to be issued.
    fn on_prefetch_start(&self) {}

    /// The destination was prefetched.
    fn on_prefetch_success(&self) {}

    /// Attempts are exhausted; `error` is the last failure.
    fn on_prefetch_error(&self, _error: &PrefetchError) {}

    /// A retry was scheduled. `attempt` counts from 1.
    fn on_prefetch_retry(&self, _attempt: u32) {}
}

/// Observer that ignores every hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PrefetchObserver for NoopObserver {}

/// Observer that reports hooks through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    target: LinkTarget,
}

impl TracingObserver {
    pub fn new(target: LinkTarget) -> Self {
        Self { target }
    }
}

impl PrefetchObserver for TracingObserver {
    fn on_prefetch_start(&self) {
        info!(target_path = %self.target, "Prefetch started");
    }

    fn on_prefetch_success(&self) {
        info!(target_path = %self.target, "Prefetch succeeded");
    }

    fn on_prefetch_error(&self, error: &PrefetchError) {
        warn!(target_path = %self.target, error = %error, "Prefetch gave up");
    }

    fn on_prefetch_retry(&self, attempt: u32) {
        info!(target_path = %self.target, attempt, "Prefetch retry scheduled");
    }
}
