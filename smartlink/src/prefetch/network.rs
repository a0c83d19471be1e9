//! Network condition tracking.
//!
//! A [`NetworkSource`] is the publishing side, owned by whatever reads the
//! platform's connection information. Each link holds its own
//! [`NetworkConditionTracker`] subscribed to that source. Without a source
//! the tracker stays inert on the optimistic default snapshot.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::types::NetworkSnapshot;

/// Publisher of network snapshots.
///
/// Cloning a source shares the same underlying channel.
#[derive(Debug, Clone)]
pub struct NetworkSource {
    tx: Arc<watch::Sender<NetworkSnapshot>>,
}

impl NetworkSource {
    pub fn new(initial: NetworkSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Publish a new reading. Subscribers are only notified when it differs
    /// from the previous one.
    pub fn publish(&self, snapshot: NetworkSnapshot) {
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    pub fn current(&self) -> NetworkSnapshot {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for NetworkSource {
    fn default() -> Self {
        Self::new(NetworkSnapshot::default())
    }
}

/// Per-link view of network conditions.
#[derive(Debug)]
pub struct NetworkConditionTracker {
    current: NetworkSnapshot,
    rx: Option<watch::Receiver<NetworkSnapshot>>,
}

impl NetworkConditionTracker {
    /// Tracker with no source; keeps the default snapshot forever.
    pub fn inert() -> Self {
        Self {
            current: NetworkSnapshot::default(),
            rx: None,
        }
    }

    /// Subscribe to a source, reading its current value immediately.
    pub fn subscribe(source: &NetworkSource) -> Self {
        Self::from_receiver(source.subscribe())
    }

    pub fn from_receiver(mut rx: watch::Receiver<NetworkSnapshot>) -> Self {
        let current = *rx.borrow_and_update();
        Self {
            current,
            rx: Some(rx),
        }
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.current
    }

    pub fn is_inert(&self) -> bool {
        self.rx.is_none()
    }

    /// Wait for the next change notification and republish it.
    ///
    /// Never resolves for an inert tracker. If the source goes away the
    /// tracker keeps its last snapshot and becomes inert.
    pub async fn changed(&mut self) -> NetworkSnapshot {
        let Some(rx) = self.rx.as_mut() else {
            return std::future::pending().await;
        };

        if rx.changed().await.is_err() {
            debug!(snapshot = %self.current, "Network source closed, keeping last snapshot");
            self.rx = None;
            return std::future::pending().await;
        }

        self.current = *rx.borrow_and_update();
        self.current
    }
}

impl Default for NetworkConditionTracker {
    fn default() -> Self {
        Self::inert()
    }
}
