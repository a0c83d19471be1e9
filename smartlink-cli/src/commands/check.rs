//! Check command - show eligibility decisions without running a link.
//!
//! With `--priority` the command evaluates one link on one network. Without
//! it, the full network × priority grid is printed together with the network
//! status report.

use smartlink::prefetch::{
    EffectiveClass, Eligibility, EligibilityGate, LinkTarget, NetworkSnapshot,
    NetworkStatusReport, PrefetchStatus, PriorityClass,
};

use super::common::{network_snapshot, NetworkArg, PriorityArg};
use crate::error::CliError;

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Link destination
    #[arg(long, default_value = "/")]
    pub target: String,

    /// Link priority (prints the whole grid when omitted)
    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Effective connection class (default: 4g)
    #[arg(long, value_enum)]
    pub network: Option<NetworkArg>,

    /// Data Saver is on
    #[arg(long)]
    pub data_saver: bool,

    /// Treat the link as opted out of prefetching
    #[arg(long)]
    pub disabled: bool,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let target = LinkTarget::new(args.target.as_str());
    let network = network_snapshot(args.network, args.data_saver);

    match args.priority {
        Some(priority) => {
            let gate = EligibilityGate::new(!args.disabled, target, priority.into());
            print_decision(&gate, &network);
        }
        None => {
            print!("{}", NetworkStatusReport::new(Some(network)));
            println!();
            print_grid(&target, !args.disabled, args.data_saver);
        }
    }

    Ok(())
}

fn print_decision(gate: &EligibilityGate, network: &NetworkSnapshot) {
    println!("Target:   {}", gate.target());
    println!("Priority: {}", gate.priority());
    println!("Network:  {}", network);
    match gate.evaluate(PrefetchStatus::Idle, network) {
        Eligibility::Allowed => println!("Decision: prefetch"),
        Eligibility::Denied(reason) => println!("Decision: skip ({})", reason),
    }
}

fn print_grid(target: &LinkTarget, enabled: bool, data_saver: bool) {
    print!("{:<10}", "");
    for priority in PriorityClass::ALL {
        print!("{:<10}", priority.as_str());
    }
    println!();

    for class in EffectiveClass::ALL {
        let network = NetworkSnapshot::new(class, data_saver);
        print!("{:<10}", class.as_str());
        for priority in PriorityClass::ALL {
            let gate = EligibilityGate::new(enabled, target.clone(), priority);
            let cell = if gate.evaluate(PrefetchStatus::Idle, &network).is_allowed() {
                "yes"
            } else {
                "no"
            };
            print!("{:<10}", cell);
        }
        println!();
    }
}
