//! SmartLink CLI - Command-line interface
//!
//! This binary inspects and exercises the SmartLink prefetch scheduler:
//! eligibility checks, scripted link simulations, and config management.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::config::ConfigCommands;
use commands::simulate::SimulateArgs;

#[derive(Parser)]
#[command(name = "smartlink")]
#[command(version = smartlink::VERSION)]
#[command(about = "Network-aware link prefetch scheduler", long_about = None)]
struct Cli {
    /// Enable debug-level logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether a link would prefetch on a given network
    Check(CheckArgs),

    /// Drive one link through a scripted sequence of events
    Simulate(SimulateArgs),

    /// View and modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Simulate(args) => commands::simulate::run(args, cli.debug).await,
        Commands::Config(command) => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
