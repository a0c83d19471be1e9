//! Trigger coordination.
//!
//! Converts raw visibility and pointer/focus events into immediate or delayed
//! prefetch requests. Each channel has its own single-shot delay timer:
//!
//! ```text
//! ViewportEnter ─┬─ delay = 0 → request now
//!                └─ delay > 0 → (re)start viewport timer ──fires──→ request
//! ViewportLeave ──→ cancel viewport timer
//!
//! PointerEnter / Focus ─┬─ delay = 0 → request now
//!                       └─ delay > 0 → (re)start hover timer ──fires──→ request
//! PointerLeave / Blur   ──→ cancel hover timer
//! ```
//!
//! The coordinator never calls the executor itself; it returns a
//! [`TriggerAction`] and the link routes `RequestNow` into the executor, so
//! both channels go through the same eligibility gate.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use super::pending::{PendingWork, TimerKind};

/// Raw event reported for the link's element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    ViewportEnter,
    ViewportLeave,
    PointerEnter,
    PointerLeave,
    Focus,
    Blur,
}

impl TriggerEvent {
    pub fn channel(&self) -> TriggerChannel {
        match self {
            Self::ViewportEnter | Self::ViewportLeave => TriggerChannel::Viewport,
            Self::PointerEnter | Self::PointerLeave | Self::Focus | Self::Blur => {
                TriggerChannel::Hover
            }
        }
    }

    /// Whether the event arms its channel (as opposed to disarming it).
    pub fn is_arming(&self) -> bool {
        matches!(self, Self::ViewportEnter | Self::PointerEnter | Self::Focus)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewportEnter => "viewport-enter",
            Self::ViewportLeave => "viewport-leave",
            Self::PointerEnter => "pointer-enter",
            Self::PointerLeave => "pointer-leave",
            Self::Focus => "focus",
            Self::Blur => "blur",
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source channel of a prefetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerChannel {
    Viewport,
    Hover,
}

impl TriggerChannel {
    fn timer(&self) -> TimerKind {
        match self {
            Self::Viewport => TimerKind::Viewport,
            Self::Hover => TimerKind::Hover,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewport => "viewport",
            Self::Hover => "hover",
        }
    }
}

/// What the link should do after a trigger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Call the executor now.
    RequestNow(TriggerChannel),
    /// A delay timer was started or restarted.
    Scheduled(TriggerChannel, Duration),
    /// A pending delay timer was cancelled.
    Cancelled(TriggerChannel),
    /// Nothing to do (channel disabled, or nothing pending to cancel).
    Ignored,
}

/// Per-channel enablement and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerConfig {
    pub enable_viewport: bool,
    pub enable_hover: bool,
    pub viewport_delay: Duration,
    pub hover_delay: Duration,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            enable_viewport: true,
            enable_hover: true,
            viewport_delay: Duration::ZERO,
            hover_delay: Duration::ZERO,
        }
    }
}

/// Routes trigger events to requests and delay timers.
#[derive(Debug, Clone)]
pub struct TriggerCoordinator {
    config: TriggerConfig,
}

impl TriggerCoordinator {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    fn channel_settings(&self, channel: TriggerChannel) -> (bool, Duration) {
        match channel {
            TriggerChannel::Viewport => (self.config.enable_viewport, self.config.viewport_delay),
            TriggerChannel::Hover => (self.config.enable_hover, self.config.hover_delay),
        }
    }

    /// Handle a raw trigger event.
    pub fn handle(&self, event: TriggerEvent, pending: &mut PendingWork) -> TriggerAction {
        let channel = event.channel();
        let (enabled, delay) = self.channel_settings(channel);

        if !enabled {
            debug!(event = %event, "Trigger ignored - channel disabled");
            return TriggerAction::Ignored;
        }

        if event.is_arming() {
            if delay.is_zero() {
                // A zero delay never leaves a timer behind; drop any stale one.
                pending.cancel_timer(channel.timer());
                debug!(event = %event, "Trigger requesting prefetch immediately");
                TriggerAction::RequestNow(channel)
            } else {
                pending.start_timer(channel.timer(), delay);
                debug!(
                    event = %event,
                    delay_ms = delay.as_millis() as u64,
                    "Trigger scheduled prefetch"
                );
                TriggerAction::Scheduled(channel, delay)
            }
        } else if pending.cancel_timer(channel.timer()) {
            debug!(event = %event, "Trigger cancelled pending prefetch");
            TriggerAction::Cancelled(channel)
        } else {
            TriggerAction::Ignored
        }
    }

    /// Handle a fired delay timer. Returns the channel to request for, or
    /// `None` when the report is stale.
    pub fn on_timer(
        &self,
        kind: TimerKind,
        id: u64,
        pending: &mut PendingWork,
    ) -> Option<TriggerChannel> {
        let channel = match kind {
            TimerKind::Viewport => TriggerChannel::Viewport,
            TimerKind::Hover => TriggerChannel::Hover,
            TimerKind::Retry => return None,
        };

        if pending.take_fired(kind, id) {
            Some(channel)
        } else {
            debug!(timer = kind.as_str(), id, "Stale timer report discarded");
            None
        }
    }
}
