//! Link prefetch scheduling.
//!
//! A smart link decides when to warm its destination ahead of navigation.
//! It reacts to visibility and pointer/focus events, consults the network
//! before spending bandwidth, and retries failed prefetches with exponential
//! backoff.
//!
//! ```text
//! visibility / pointer / focus
//!          ↓
//!   TriggerCoordinator ── delay timers
//!          ↓
//!   PrefetchExecutor ── EligibilityGate ← NetworkConditionTracker
//!          ├─ PrefetchPrimitive (cancellable)
//!          ├─ RetryController ── retry timer
//!          └─ StatusStateMachine → StatusSnapshot / StatusIndicator
//! ```
//!
//! # Example
//!
//! ```ignore
//! use smartlink::prefetch::{LinkConfig, NetworkSource, PriorityClass, SmartLink};
//!
//! let network = NetworkSource::default();
//! let link = SmartLink::builder("/pricing", primitive)
//!     .config(LinkConfig::new().with_priority(PriorityClass::High))
//!     .network(network.clone())
//!     .spawn();
//!
//! link.viewport_enter()?;
//! let snapshot = link.wait_for_status(|s| s.status.is_terminal()).await?;
//! ```

mod config;
mod eligibility;
mod error;
mod executor;
mod link;
mod network;
mod observer;
mod pending;
mod primitive;
mod report;
mod retry;
mod stats;
mod status;
mod trigger;
mod types;
pub mod visibility;

pub use config::{LinkConfig, MAX_ATTEMPTS_LIMIT};
pub use eligibility::{network_allows, DenyReason, Eligibility, EligibilityGate};
pub use error::PrefetchError;
pub use executor::{CompletionOutcome, PrefetchExecutor, RequestOrigin, RequestOutcome};
pub use link::{LinkEvent, LinkHandle, SmartLink, SmartLinkBuilder};
pub use network::{NetworkConditionTracker, NetworkSource};
pub use observer::{NoopObserver, PrefetchObserver, TracingObserver};
pub use pending::{PendingWork, TimerKind};
pub use primitive::{PrefetchFuture, PrefetchPrimitive, SimulatedPrimitive};
pub use report::{NetworkStatusReport, PriorityLine};
pub use retry::{
    backoff_delay, RetryController, RetryDecision, RetryState, DEFAULT_BASE_DELAY,
    DEFAULT_MAX_ATTEMPTS,
};
pub use stats::{LinkStats, LinkStatsSnapshot};
pub use status::{InvalidTransition, StatusIndicator, StatusSnapshot, StatusStateMachine};
pub use trigger::{TriggerAction, TriggerChannel, TriggerConfig, TriggerCoordinator, TriggerEvent};
pub use types::{
    EffectiveClass, LinkTarget, NetworkSnapshot, ParseValueError, PrefetchStatus, PriorityClass,
};
pub use visibility::{MarginLength, MarginParseError, ProximityMargin, VisibilityOptions};
