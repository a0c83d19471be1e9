//! Prefetch execution for one link.
//!
//! The executor owns the link's status, retry counters and gate. It issues
//! calls to the [`PrefetchPrimitive`] through [`PendingWork`], and turns
//! completions into status transitions, hook notifications and retries.
//!
//! Call results arrive tagged with the generation they were issued under.
//! A result whose generation is no longer current was superseded (or the
//! link is going away) and is dropped without touching any state.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::eligibility::{DenyReason, Eligibility, EligibilityGate};
use super::error::PrefetchError;
use super::observer::PrefetchObserver;
use super::pending::{PendingWork, TimerKind};
use super::primitive::PrefetchPrimitive;
use super::retry::{RetryController, RetryDecision, RetryState};
use super::stats::LinkStats;
use super::status::StatusStateMachine;
use super::trigger::TriggerChannel;
use super::types::{NetworkSnapshot, PrefetchStatus};

/// Where a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    Trigger(TriggerChannel),
    /// The retry timer fired.
    Retry,
    /// Requested directly through the link handle.
    Manual,
}

impl RequestOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger(channel) => channel.as_str(),
            Self::Retry => "retry",
            Self::Manual => "manual",
        }
    }
}

/// Result of asking the executor to prefetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A call was issued under `generation`.
    Started { generation: u64 },
    /// The gate refused.
    Denied(DenyReason),
    /// A call is already loading; the request was dropped.
    AlreadyLoading,
}

/// Result of processing a call completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Succeeded,
    RetryScheduled { attempt: u32 },
    GaveUp,
    /// The current call was cancelled without a replacement.
    Aborted,
    /// The completion belonged to a superseded call.
    Discarded,
}

/// Drives one link's prefetch lifecycle.
pub struct PrefetchExecutor {
    gate: EligibilityGate,
    retry: RetryController,
    machine: StatusStateMachine,
    primitive: Arc<dyn PrefetchPrimitive>,
    observer: Arc<dyn PrefetchObserver>,
    stats: Arc<LinkStats>,
}

impl PrefetchExecutor {
    pub fn new(
        gate: EligibilityGate,
        retry: RetryController,
        primitive: Arc<dyn PrefetchPrimitive>,
        observer: Arc<dyn PrefetchObserver>,
        stats: Arc<LinkStats>,
    ) -> Self {
        Self {
            gate,
            retry,
            machine: StatusStateMachine::new(),
            primitive,
            observer,
            stats,
        }
    }

    pub fn status(&self) -> PrefetchStatus {
        self.machine.status()
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry.state()
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    /// Whether a request issued now under `network` would pass the gate.
    pub fn eligibility(&self, network: &NetworkSnapshot) -> Eligibility {
        self.gate.evaluate(self.machine.status(), network)
    }

    /// Request a prefetch. A no-op while a call is loading.
    pub fn request(
        &mut self,
        origin: RequestOrigin,
        network: &NetworkSnapshot,
        pending: &mut PendingWork,
    ) -> RequestOutcome {
        self.start(origin, network, pending, false)
    }

    /// Request a prefetch, cancelling and replacing any loading call.
    pub fn supersede(
        &mut self,
        network: &NetworkSnapshot,
        pending: &mut PendingWork,
    ) -> RequestOutcome {
        self.start(RequestOrigin::Manual, network, pending, true)
    }

    fn start(
        &mut self,
        origin: RequestOrigin,
        network: &NetworkSnapshot,
        pending: &mut PendingWork,
        replace_loading: bool,
    ) -> RequestOutcome {
        LinkStats::bump(&self.stats.requests);
        let status = self.machine.status();

        if let Eligibility::Denied(reason) = self.gate.evaluate(status, network) {
            LinkStats::bump(&self.stats.denied);
            debug!(
                target_path = %self.gate.target(),
                origin = origin.as_str(),
                reason = %reason,
                "Prefetch request denied"
            );
            return RequestOutcome::Denied(reason);
        }

        if status == PrefetchStatus::Loading && !replace_loading {
            LinkStats::bump(&self.stats.deduplicated);
            trace!(
                target_path = %self.gate.target(),
                origin = origin.as_str(),
                "Prefetch already loading"
            );
            return RequestOutcome::AlreadyLoading;
        }

        if status == PrefetchStatus::Error && origin != RequestOrigin::Retry {
            self.retry.reset();
            info!(target_path = %self.gate.target(), "Prefetch re-armed after error");
        }

        // The new call takes over from any scheduled retry.
        pending.cancel_timer(TimerKind::Retry);

        self.set_status(PrefetchStatus::Loading);
        self.observer.on_prefetch_start();

        let generation = pending.begin_call(&self.primitive, self.gate.target().clone());
        LinkStats::bump(&self.stats.started);

        debug!(
            target_path = %self.gate.target(),
            origin = origin.as_str(),
            generation,
            attempt = self.retry.attempt_count(),
            "Prefetch call issued"
        );
        RequestOutcome::Started { generation }
    }

    /// Process the result of the call issued under `generation`.
    pub fn on_complete(
        &mut self,
        generation: u64,
        result: Result<(), PrefetchError>,
        pending: &mut PendingWork,
    ) -> CompletionOutcome {
        if !pending.finish_call(generation) {
            LinkStats::bump(&self.stats.cancelled);
            trace!(
                target_path = %self.gate.target(),
                generation,
                "Superseded prefetch result discarded"
            );
            return CompletionOutcome::Discarded;
        }

        match result {
            Ok(()) => {
                self.set_status(PrefetchStatus::Success);
                self.retry.on_success();
                LinkStats::bump(&self.stats.succeeded);
                self.observer.on_prefetch_success();
                CompletionOutcome::Succeeded
            }
            Err(error) if error.is_cancellation() => {
                self.set_status(PrefetchStatus::Idle);
                LinkStats::bump(&self.stats.cancelled);
                debug!(target_path = %self.gate.target(), generation, "Prefetch aborted");
                CompletionOutcome::Aborted
            }
            Err(error) => match self.retry.on_failure() {
                RetryDecision::Retry { delay, attempt } => {
                    self.set_status(PrefetchStatus::Retrying);
                    LinkStats::bump(&self.stats.retries);
                    pending.start_timer(TimerKind::Retry, delay);
                    warn!(
                        target_path = %self.gate.target(),
                        error = %error,
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Prefetch failed, retry scheduled"
                    );
                    self.observer.on_prefetch_retry(attempt);
                    CompletionOutcome::RetryScheduled { attempt }
                }
                RetryDecision::GiveUp => {
                    self.set_status(PrefetchStatus::Error);
                    LinkStats::bump(&self.stats.failed);
                    warn!(
                        target_path = %self.gate.target(),
                        error = %error,
                        attempts = self.retry.attempt_count(),
                        "Prefetch failed, giving up"
                    );
                    self.observer.on_prefetch_error(&error);
                    CompletionOutcome::GaveUp
                }
            },
        }
    }

    /// Handle a fired retry timer. `None` when the report is stale.
    pub fn on_retry_timer(
        &mut self,
        id: u64,
        network: &NetworkSnapshot,
        pending: &mut PendingWork,
    ) -> Option<RequestOutcome> {
        if !pending.take_fired(TimerKind::Retry, id) {
            trace!(target_path = %self.gate.target(), id, "Stale retry timer discarded");
            return None;
        }
        Some(self.request(RequestOrigin::Retry, network, pending))
    }

    fn set_status(&mut self, to: PrefetchStatus) {
        match self.machine.transition(to) {
            Ok(from) => {
                trace!(target_path = %self.gate.target(), from = %from, to = %to, "Status changed")
            }
            Err(e) => warn!(target_path = %self.gate.target(), error = %e, "Status change refused"),
        }
    }
}
