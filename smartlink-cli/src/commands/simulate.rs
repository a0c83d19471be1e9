//! Simulate command - drive one link through a scripted event sequence.
//!
//! The link runs against a [`SimulatedPrimitive`] with configurable latency
//! and failures, so retry, cancellation and network gating can be observed
//! without a real network. Hooks and status changes are printed as they
//! happen, with timestamps relative to the start of the run.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use smartlink::prefetch::{
    EffectiveClass, LinkHandle, NetworkSource, PrefetchError, PrefetchObserver,
    SimulatedPrimitive, SmartLink, TriggerEvent,
};
use tracing::info;

use super::common::{network_snapshot, NetworkArg, PriorityArg};
use crate::error::CliError;
use crate::runner::CliRunner;

const TRIGGER_EVENTS: [TriggerEvent; 6] = [
    TriggerEvent::ViewportEnter,
    TriggerEvent::ViewportLeave,
    TriggerEvent::PointerEnter,
    TriggerEvent::PointerLeave,
    TriggerEvent::Focus,
    TriggerEvent::Blur,
];

/// Arguments for the simulate command.
#[derive(Debug, clap::Args)]
pub struct SimulateArgs {
    /// Link destination
    #[arg(long, default_value = "/docs")]
    pub target: String,

    /// Comma-separated steps: viewport-enter, viewport-leave, pointer-enter,
    /// pointer-leave, focus, blur, request, supersede, wait:<ms>,
    /// network:<class>, data-saver:<on|off>
    #[arg(long, default_value = "viewport-enter")]
    pub script: String,

    /// Link priority (default: from config)
    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Initial effective connection class (default: 4g)
    #[arg(long, value_enum)]
    pub network: Option<NetworkArg>,

    /// Start with Data Saver on
    #[arg(long)]
    pub data_saver: bool,

    /// Number of prefetch calls that fail before one succeeds
    #[arg(long, default_value = "0")]
    pub failures: u32,

    /// Latency of each simulated prefetch call in milliseconds
    #[arg(long, default_value = "200")]
    pub latency_ms: u64,

    /// Retries after the first failure (default: from config)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Base retry delay in milliseconds (default: from config)
    #[arg(long)]
    pub base_delay_ms: Option<u64>,

    /// Viewport trigger delay in milliseconds (default: from config)
    #[arg(long)]
    pub viewport_delay_ms: Option<u64>,

    /// Hover trigger delay in milliseconds (default: from config)
    #[arg(long)]
    pub hover_delay_ms: Option<u64>,

    /// How long to wait for a terminal status after the script ends
    #[arg(long, default_value = "10000")]
    pub settle_ms: u64,
}

/// One step of a simulation script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimStep {
    Trigger(TriggerEvent),
    Request,
    Supersede,
    Wait(Duration),
    Network(EffectiveClass),
    DataSaver(bool),
}

impl FromStr for SimStep {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = s.trim().to_lowercase();
        let invalid = |reason: &str| CliError::InvalidArgument(format!("step '{}': {}", s, reason));

        if let Some(event) = TRIGGER_EVENTS.iter().find(|e| e.as_str() == step) {
            return Ok(SimStep::Trigger(*event));
        }

        match step.split_once(':') {
            None => match step.as_str() {
                "request" => Ok(SimStep::Request),
                "supersede" => Ok(SimStep::Supersede),
                _ => Err(invalid("unknown step")),
            },
            Some(("wait", ms)) => ms
                .parse()
                .map(|ms| SimStep::Wait(Duration::from_millis(ms)))
                .map_err(|_| invalid("wait needs milliseconds")),
            Some(("network", class)) => class
                .parse()
                .map(SimStep::Network)
                .map_err(|e| invalid(&e.to_string())),
            Some(("data-saver", "on")) => Ok(SimStep::DataSaver(true)),
            Some(("data-saver", "off")) => Ok(SimStep::DataSaver(false)),
            Some(("data-saver", _)) => Err(invalid("data-saver takes on or off")),
            Some(_) => Err(invalid("unknown step")),
        }
    }
}

/// Parse a comma-separated script.
pub fn parse_script(script: &str) -> Result<Vec<SimStep>, CliError> {
    script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Observer that prints hooks with elapsed time.
struct PrintingObserver {
    started: Instant,
}

impl PrintingObserver {
    fn print(&self, message: &str) {
        println!("[{:>6}ms] {}", self.started.elapsed().as_millis(), message);
    }
}

impl PrefetchObserver for PrintingObserver {
    fn on_prefetch_start(&self) {
        self.print("hook: prefetch start");
    }

    fn on_prefetch_success(&self) {
        self.print("hook: prefetch success");
    }

    fn on_prefetch_error(&self, error: &PrefetchError) {
        self.print(&format!("hook: prefetch error ({})", error));
    }

    fn on_prefetch_retry(&self, attempt: u32) {
        self.print(&format!("hook: prefetch retry (attempt {})", attempt));
    }
}

/// Run the simulate command.
pub async fn run(args: SimulateArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::start("simulate", debug)?;

    let steps = parse_script(&args.script)?;

    let mut config = runner.config().link_config();
    if let Some(priority) = args.priority {
        config.priority = priority.into();
    }
    if let Some(max_attempts) = args.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(ms) = args.base_delay_ms {
        config.base_retry_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = args.viewport_delay_ms {
        config.viewport_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = args.hover_delay_ms {
        config.hover_delay = Duration::from_millis(ms);
    }

    let network = NetworkSource::new(network_snapshot(args.network, args.data_saver));
    let primitive = Arc::new(
        SimulatedPrimitive::new(Duration::from_millis(args.latency_ms))
            .with_failures(args.failures),
    );
    let observer = Arc::new(PrintingObserver {
        started: Instant::now(),
    });

    println!("Simulating link {}", args.target);
    println!(
        "  priority={} network={} max_attempts={} base_delay={}ms",
        config.priority,
        network.current(),
        config.max_attempts,
        config.base_retry_delay.as_millis()
    );
    println!();

    let link = SmartLink::builder(args.target.as_str(), primitive.clone())
        .config(config)
        .observer(observer.clone())
        .network(network.clone())
        .spawn();

    for step in steps {
        run_step(&link, &network, step, &observer).await?;
    }

    let settled = tokio::time::timeout(
        Duration::from_millis(args.settle_ms),
        link.wait_for_status(|s| s.status.is_terminal()),
    )
    .await;
    if settled.is_err() {
        observer.print("settle timeout reached");
    }

    let snapshot = link.status();
    let stats = link.stats();
    info!(status = %snapshot.status, calls = primitive.calls(), "Simulation finished");

    println!();
    println!("{}", snapshot.indicator().tooltip());
    println!(
        "Primitive calls: {}  (requests {}, denied {}, deduplicated {}, retries {}, cancelled {})",
        primitive.calls(),
        stats.requests,
        stats.denied,
        stats.deduplicated,
        stats.retries,
        stats.cancelled
    );

    link.close().await;
    Ok(())
}

async fn run_step(
    link: &LinkHandle,
    network: &NetworkSource,
    step: SimStep,
    observer: &PrintingObserver,
) -> Result<(), CliError> {
    match step {
        SimStep::Trigger(event) => {
            observer.print(&format!("event: {}", event));
            link.trigger(event)?;
        }
        SimStep::Request => {
            observer.print("event: request");
            link.request()?;
        }
        SimStep::Supersede => {
            observer.print("event: supersede");
            link.supersede()?;
        }
        SimStep::Wait(duration) => {
            tokio::time::sleep(duration).await;
        }
        SimStep::Network(class) => {
            let mut snapshot = network.current();
            snapshot.effective_class = class;
            network.publish(snapshot);
            observer.print(&format!("network: {}", snapshot));
        }
        SimStep::DataSaver(on) => {
            let mut snapshot = network.current();
            snapshot.reduced_data = on;
            network.publish(snapshot);
            observer.print(&format!("network: {}", snapshot));
        }
    }
    // Let the link process the step before the next one.
    tokio::task::yield_now().await;
    Ok(())
}
