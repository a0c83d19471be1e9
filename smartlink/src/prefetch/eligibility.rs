//! Prefetch eligibility decisions.
//!
//! The gate is a pure function of the link's fixed settings (opt-out flag,
//! destination, priority) and the dynamic inputs sampled at request time
//! (current status and network snapshot). It is consulted fresh on every
//! request and never cached.
//!
//! # Network ladder
//!
//! ```text
//! reduced data or slow-2g  → deny (any priority)
//! 2g                       → high only
//! 3g                       → high, medium
//! 4g                       → all
//! ```

use std::fmt;

use super::types::{EffectiveClass, LinkTarget, NetworkSnapshot, PrefetchStatus, PriorityClass};

/// Why a prefetch was not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The caller opted out of prefetching.
    Disabled,
    /// The destination is not a path on this site.
    ExternalTarget,
    /// The destination has already been prefetched.
    AlreadyPrefetched,
    /// Data saving is requested.
    ReducedData,
    /// The network is slower than any priority tolerates.
    SlowNetwork,
    /// The network is too slow for this priority.
    PriorityTooLow {
        effective_class: EffectiveClass,
        priority: PriorityClass,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "prefetching disabled"),
            Self::ExternalTarget => write!(f, "destination is not site-local"),
            Self::AlreadyPrefetched => write!(f, "destination already prefetched"),
            Self::ReducedData => write!(f, "data saver enabled"),
            Self::SlowNetwork => write!(f, "network too slow (slow-2g)"),
            Self::PriorityTooLow {
                effective_class,
                priority,
            } => write!(f, "{} priority not allowed on {}", priority, effective_class),
        }
    }
}

/// Result of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Allowed,
    Denied(DenyReason),
}

impl Eligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Whether the network ladder lets `priority` prefetch on `network`.
///
/// Covers only the network rules; see [`EligibilityGate::evaluate`] for the
/// full decision.
pub fn network_allows(network: &NetworkSnapshot, priority: PriorityClass) -> Result<(), DenyReason> {
    if network.reduced_data {
        return Err(DenyReason::ReducedData);
    }

    let allowed = match network.effective_class {
        EffectiveClass::Slow2G => return Err(DenyReason::SlowNetwork),
        EffectiveClass::TwoG => priority == PriorityClass::High,
        EffectiveClass::ThreeG => matches!(priority, PriorityClass::High | PriorityClass::Medium),
        EffectiveClass::FourG => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(DenyReason::PriorityTooLow {
            effective_class: network.effective_class,
            priority,
        })
    }
}

/// Allow/deny decision for a single link.
#[derive(Debug, Clone)]
pub struct EligibilityGate {
    prefetch_enabled: bool,
    target: LinkTarget,
    priority: PriorityClass,
}

impl EligibilityGate {
    pub fn new(prefetch_enabled: bool, target: LinkTarget, priority: PriorityClass) -> Self {
        Self {
            prefetch_enabled,
            target,
            priority,
        }
    }

    pub fn target(&self) -> &LinkTarget {
        &self.target
    }

    pub fn priority(&self) -> PriorityClass {
        self.priority
    }

    /// Decide whether a prefetch may start now.
    pub fn evaluate(&self, status: PrefetchStatus, network: &NetworkSnapshot) -> Eligibility {
        if !self.prefetch_enabled {
            return Eligibility::Denied(DenyReason::Disabled);
        }
        if !self.target.is_site_local() {
            return Eligibility::Denied(DenyReason::ExternalTarget);
        }
        if status == PrefetchStatus::Success {
            return Eligibility::Denied(DenyReason::AlreadyPrefetched);
        }

        match network_allows(network, self.priority) {
            Ok(()) => Eligibility::Allowed,
            Err(reason) => Eligibility::Denied(reason),
        }
    }
}
