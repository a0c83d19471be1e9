//! Smart link: one destination, one task.
//!
//! Each link is a Tokio task that owns its whole state (status, retry
//! counters, timers, in-flight call). Everything reaches it as a
//! [`LinkEvent`] on its queue: trigger reports and commands from the
//! [`LinkHandle`], timer expiries, and call completions. Because events are
//! processed one at a time, a timer firing and a result arriving can never
//! interleave inside a transition.
//!
//! # Architecture
//!
//! ```text
//! LinkHandle ──events──┐
//! timers     ──events──┼──→ link task ──watch──→ StatusSnapshot
//! calls      ──events──┘      │  ▲
//!                             │  └── NetworkConditionTracker (watch)
//!                             └──→ TriggerCoordinator → PrefetchExecutor
//! ```
//!
//! Dropping the handle (or calling [`LinkHandle::shutdown`]) cancels the
//! link's root token, which cancels every timer and the in-flight call
//! without waiting for them. No hook fires after teardown.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::config::LinkConfig;
use super::eligibility::EligibilityGate;
use super::error::PrefetchError;
use super::executor::{PrefetchExecutor, RequestOrigin};
use super::network::{NetworkConditionTracker, NetworkSource};
use super::observer::{NoopObserver, PrefetchObserver};
use super::pending::{PendingWork, TimerKind};
use super::primitive::PrefetchPrimitive;
use super::retry::RetryController;
use super::stats::{LinkStats, LinkStatsSnapshot};
use super::status::{StatusIndicator, StatusSnapshot};
use super::trigger::{TriggerAction, TriggerCoordinator, TriggerEvent};
use super::types::{LinkTarget, NetworkSnapshot};
use super::visibility::VisibilityOptions;

/// Message processed by a link's task.
#[derive(Debug)]
pub enum LinkEvent {
    Trigger(TriggerEvent),
    Request,
    Supersede,
    TimerFired {
        kind: TimerKind,
        id: u64,
    },
    PrefetchDone {
        generation: u64,
        result: Result<(), PrefetchError>,
    },
}

/// Builder for a smart link.
///
/// # Example
///
/// ```ignore
/// let link = SmartLink::builder("/docs", primitive)
///     .config(LinkConfig::new().with_hover_delay(Duration::from_millis(100)))
///     .network(source.clone())
///     .spawn();
///
/// link.pointer_enter()?;
/// ```
pub struct SmartLinkBuilder {
    target: LinkTarget,
    primitive: Arc<dyn PrefetchPrimitive>,
    config: LinkConfig,
    observer: Arc<dyn PrefetchObserver>,
    network: Option<NetworkSource>,
}

impl SmartLinkBuilder {
    pub fn new(target: impl Into<LinkTarget>, primitive: Arc<dyn PrefetchPrimitive>) -> Self {
        Self {
            target: target.into(),
            primitive,
            config: LinkConfig::default(),
            observer: Arc::new(NoopObserver),
            network: None,
        }
    }

    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn PrefetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Subscribe the link to a network source. Without one, the link assumes
    /// a fast, unrestricted network.
    pub fn network(mut self, source: NetworkSource) -> Self {
        self.network = Some(source);
        self
    }

    /// Spawn the link task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> LinkHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let stats = Arc::new(LinkStats::default());

        let network = match &self.network {
            Some(source) => NetworkConditionTracker::subscribe(source),
            None => NetworkConditionTracker::inert(),
        };

        let executor = PrefetchExecutor::new(
            EligibilityGate::new(
                self.config.prefetch_enabled,
                self.target.clone(),
                self.config.priority,
            ),
            RetryController::new(self.config.max_attempts, self.config.base_retry_delay),
            self.primitive,
            self.observer,
            stats.clone(),
        );

        let initial = snapshot_of(&executor, network.snapshot());
        let (status_tx, status_rx) = watch::channel(initial);

        let actor = LinkActor {
            events_rx,
            shutdown: shutdown.clone(),
            network,
            triggers: TriggerCoordinator::new(self.config.trigger_config()),
            executor,
            pending: PendingWork::new(events_tx.clone(), shutdown.clone()),
            status_tx,
        };
        let task = tokio::spawn(actor.run());

        LinkHandle {
            events: events_tx,
            shutdown,
            status: status_rx,
            stats,
            target: self.target,
            visibility: self.config.visibility_options(),
            show_status: self.config.show_status,
            task: Some(task),
        }
    }
}

/// Entry point for building links.
pub struct SmartLink;

impl SmartLink {
    pub fn builder(
        target: impl Into<LinkTarget>,
        primitive: Arc<dyn PrefetchPrimitive>,
    ) -> SmartLinkBuilder {
        SmartLinkBuilder::new(target, primitive)
    }
}

fn snapshot_of(executor: &PrefetchExecutor, network: NetworkSnapshot) -> StatusSnapshot {
    let retry = executor.retry_state();
    StatusSnapshot {
        status: executor.status(),
        attempt: retry.attempt_count,
        max_attempts: retry.max_attempts,
        eligible: executor.eligibility(&network).is_allowed(),
        network,
    }
}

struct LinkActor {
    events_rx: mpsc::UnboundedReceiver<LinkEvent>,
    shutdown: CancellationToken,
    network: NetworkConditionTracker,
    triggers: TriggerCoordinator,
    executor: PrefetchExecutor,
    pending: PendingWork,
    status_tx: watch::Sender<StatusSnapshot>,
}

impl LinkActor {
    async fn run(mut self) {
        info!(target_path = %self.executor.gate().target(), "Link started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    break;
                }

                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => self.handle(event),
                        None => break,
                    }
                }

                snapshot = self.network.changed() => {
                    debug!(
                        target_path = %self.executor.gate().target(),
                        network = %snapshot,
                        "Network conditions changed"
                    );
                }
            }

            self.publish();
        }

        self.pending.cancel_all();
        info!(target_path = %self.executor.gate().target(), "Link torn down");
    }

    fn handle(&mut self, event: LinkEvent) {
        let network = self.network.snapshot();

        match event {
            LinkEvent::Trigger(trigger) => {
                if let TriggerAction::RequestNow(channel) =
                    self.triggers.handle(trigger, &mut self.pending)
                {
                    self.executor
                        .request(RequestOrigin::Trigger(channel), &network, &mut self.pending);
                }
            }
            LinkEvent::Request => {
                self.executor
                    .request(RequestOrigin::Manual, &network, &mut self.pending);
            }
            LinkEvent::Supersede => {
                self.executor.supersede(&network, &mut self.pending);
            }
            LinkEvent::TimerFired {
                kind: TimerKind::Retry,
                id,
            } => {
                self.executor
                    .on_retry_timer(id, &network, &mut self.pending);
            }
            LinkEvent::TimerFired { kind, id } => {
                if let Some(channel) = self.triggers.on_timer(kind, id, &mut self.pending) {
                    self.executor
                        .request(RequestOrigin::Trigger(channel), &network, &mut self.pending);
                }
            }
            LinkEvent::PrefetchDone { generation, result } => {
                self.executor
                    .on_complete(generation, result, &mut self.pending);
            }
        }
    }

    fn publish(&self) {
        let next = snapshot_of(&self.executor, self.network.snapshot());
        self.status_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Handle to a running link.
///
/// Dropping the handle tears the link down.
pub struct LinkHandle {
    events: mpsc::UnboundedSender<LinkEvent>,
    shutdown: CancellationToken,
    status: watch::Receiver<StatusSnapshot>,
    stats: Arc<LinkStats>,
    target: LinkTarget,
    visibility: VisibilityOptions,
    show_status: bool,
    task: Option<JoinHandle<()>>,
}

impl LinkHandle {
    fn send(&self, event: LinkEvent) -> Result<(), PrefetchError> {
        if self.shutdown.is_cancelled() {
            return Err(PrefetchError::LinkClosed);
        }
        self.events
            .send(event)
            .map_err(|_| PrefetchError::LinkClosed)
    }

    /// Report a raw trigger event for the link's element.
    pub fn trigger(&self, event: TriggerEvent) -> Result<(), PrefetchError> {
        self.send(LinkEvent::Trigger(event))
    }

    pub fn viewport_enter(&self) -> Result<(), PrefetchError> {
        self.trigger(TriggerEvent::ViewportEnter)
    }

    pub fn viewport_leave(&self) -> Result<(), PrefetchError> {
        self.trigger(TriggerEvent::ViewportLeave)
    }

    pub fn pointer_enter(&self) -> Result<(), PrefetchError> {
        self.trigger(TriggerEvent::PointerEnter)
    }

    pub fn pointer_leave(&self) -> Result<(), PrefetchError> {
        self.trigger(TriggerEvent::PointerLeave)
    }

    pub fn focus(&self) -> Result<(), PrefetchError> {
        self.trigger(TriggerEvent::Focus)
    }

    pub fn blur(&self) -> Result<(), PrefetchError> {
        self.trigger(TriggerEvent::Blur)
    }

    /// Request a prefetch now. Ignored while a call is loading.
    pub fn request(&self) -> Result<(), PrefetchError> {
        self.send(LinkEvent::Request)
    }

    /// Request a prefetch now, cancelling any loading call in its favour.
    pub fn supersede(&self) -> Result<(), PrefetchError> {
        self.send(LinkEvent::Supersede)
    }

    /// Latest published state.
    pub fn status(&self) -> StatusSnapshot {
        *self.status.borrow()
    }

    /// Status indicator, present only when the link shows its status.
    pub fn indicator(&self) -> Option<StatusIndicator> {
        self.show_status.then(|| self.status().indicator())
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for_status<F>(&self, mut predicate: F) -> Result<StatusSnapshot, PrefetchError>
    where
        F: FnMut(&StatusSnapshot) -> bool,
    {
        let mut rx = self.status.clone();
        let snapshot = rx
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| PrefetchError::LinkClosed)?;
        Ok(*snapshot)
    }

    pub fn stats(&self) -> LinkStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn target(&self) -> &LinkTarget {
        &self.target
    }

    /// Options for the visibility notifier reporting this link's element.
    pub fn visibility_options(&self) -> VisibilityOptions {
        self.visibility
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Tear the link down without waiting.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Tear the link down and wait for its task to exit.
    pub async fn close(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LinkHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for LinkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkHandle")
            .field("target", &self.target)
            .field("status", &self.status())
            .field("closed", &self.is_closed())
            .finish()
    }
}
