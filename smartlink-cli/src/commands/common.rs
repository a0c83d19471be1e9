//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use smartlink::prefetch::{EffectiveClass, NetworkSnapshot, PriorityClass};

/// Link priority selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PriorityArg {
    /// Prefetch on every network except slow-2g
    High,
    /// Prefetch on 3g and better
    Medium,
    /// Prefetch only on 4g
    Low,
}

impl From<PriorityArg> for PriorityClass {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::High => PriorityClass::High,
            PriorityArg::Medium => PriorityClass::Medium,
            PriorityArg::Low => PriorityClass::Low,
        }
    }
}

/// Effective connection class selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum NetworkArg {
    #[value(name = "slow-2g")]
    Slow2g,
    #[value(name = "2g")]
    TwoG,
    #[value(name = "3g")]
    ThreeG,
    #[value(name = "4g")]
    FourG,
}

impl From<NetworkArg> for EffectiveClass {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Slow2g => EffectiveClass::Slow2G,
            NetworkArg::TwoG => EffectiveClass::TwoG,
            NetworkArg::ThreeG => EffectiveClass::ThreeG,
            NetworkArg::FourG => EffectiveClass::FourG,
        }
    }
}

/// Build a snapshot from optional CLI arguments, defaulting to 4g.
pub fn network_snapshot(network: Option<NetworkArg>, data_saver: bool) -> NetworkSnapshot {
    let effective_class = network.map(EffectiveClass::from).unwrap_or_default();
    NetworkSnapshot::new(effective_class, data_saver)
}
