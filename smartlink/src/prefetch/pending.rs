//! Outstanding timers and the in-flight prefetch call of one link.
//!
//! At most one timer of each [`TimerKind`] and one call exist at a time.
//! Starting a new one cancels its predecessor of the same kind. Every timer
//! and call runs as a spawned task holding a child of the link's root token,
//! and reports back by posting a [`LinkEvent`] to the link's queue. Each
//! report carries the id it was started with, so a report that raced with a
//! cancellation is recognized as stale and dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::error::PrefetchError;
use super::link::LinkEvent;
use super::primitive::PrefetchPrimitive;
use super::types::LinkTarget;

/// Kind of single-shot timer a link can have pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Viewport,
    Hover,
    Retry,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewport => "viewport",
            Self::Hover => "hover",
            Self::Retry => "retry",
        }
    }
}

#[derive(Debug)]
struct TimerSlot {
    id: u64,
    token: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Pending work owned by one link.
#[derive(Debug)]
pub struct PendingWork {
    events: mpsc::UnboundedSender<LinkEvent>,
    root: CancellationToken,
    viewport: Option<TimerSlot>,
    hover: Option<TimerSlot>,
    retry: Option<TimerSlot>,
    next_timer_id: u64,
    in_flight: Option<InFlight>,
    generation: u64,
}

impl PendingWork {
    /// Create pending work that reports to `events`.
    ///
    /// Cancelling `root` cancels everything started from here.
    pub fn new(events: mpsc::UnboundedSender<LinkEvent>, root: CancellationToken) -> Self {
        Self {
            events,
            root,
            viewport: None,
            hover: None,
            retry: None,
            next_timer_id: 0,
            in_flight: None,
            generation: 0,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerSlot> {
        match kind {
            TimerKind::Viewport => &mut self.viewport,
            TimerKind::Hover => &mut self.hover,
            TimerKind::Retry => &mut self.retry,
        }
    }

    /// Start (or restart) the timer of `kind`. Returns its id.
    pub fn start_timer(&mut self, kind: TimerKind, delay: Duration) -> u64 {
        self.cancel_timer(kind);

        self.next_timer_id += 1;
        let id = self.next_timer_id;
        let token = self.root.child_token();
        let task_token = token.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = events.send(LinkEvent::TimerFired { kind, id });
                }
            }
        });

        trace!(timer = kind.as_str(), id, delay_ms = delay.as_millis() as u64, "Timer started");
        *self.slot_mut(kind) = Some(TimerSlot { id, token });
        id
    }

    /// Cancel the timer of `kind`. Returns whether one was pending.
    pub fn cancel_timer(&mut self, kind: TimerKind) -> bool {
        match self.slot_mut(kind).take() {
            Some(slot) => {
                slot.token.cancel();
                trace!(timer = kind.as_str(), id = slot.id, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn has_timer(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Viewport => self.viewport.is_some(),
            TimerKind::Hover => self.hover.is_some(),
            TimerKind::Retry => self.retry.is_some(),
        }
    }

    /// Consume a fired timer report.
    ///
    /// Returns `false` when the report is stale (the timer was cancelled or
    /// restarted after it fired).
    pub fn take_fired(&mut self, kind: TimerKind, id: u64) -> bool {
        let slot = self.slot_mut(kind);
        if slot.as_ref().is_some_and(|current| current.id == id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Cancel any in-flight call and issue `target` to `primitive` under a
    /// fresh token. Returns the call's generation.
    pub fn begin_call(&mut self, primitive: &Arc<dyn PrefetchPrimitive>, target: LinkTarget) -> u64 {
        self.cancel_call();

        self.generation += 1;
        let generation = self.generation;
        let token = self.root.child_token();
        let task_token = token.clone();
        let events = self.events.clone();
        let future = primitive.prefetch(target, token.clone());

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = task_token.cancelled() => Err(PrefetchError::Cancelled),
                result = future => result,
            };
            let _ = events.send(LinkEvent::PrefetchDone { generation, result });
        });

        self.in_flight = Some(InFlight { generation, token });
        generation
    }

    /// Cancel the in-flight call. Returns whether one was in flight.
    pub fn cancel_call(&mut self) -> bool {
        match self.in_flight.take() {
            Some(call) => {
                call.token.cancel();
                trace!(generation = call.generation, "In-flight prefetch cancelled");
                true
            }
            None => false,
        }
    }

    pub fn has_call_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Consume a call completion.
    ///
    /// Returns `false` when `generation` is not the current call, meaning the
    /// result was superseded and must be disregarded.
    pub fn finish_call(&mut self, generation: u64) -> bool {
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|call| call.generation == generation && !call.token.is_cancelled());
        if current {
            self.in_flight = None;
        }
        current
    }

    /// Cancel all timers and the in-flight call without waiting for them.
    pub fn cancel_all(&mut self) {
        self.cancel_timer(TimerKind::Viewport);
        self.cancel_timer(TimerKind::Hover);
        self.cancel_timer(TimerKind::Retry);
        self.cancel_call();
    }
}

impl Drop for PendingWork {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
