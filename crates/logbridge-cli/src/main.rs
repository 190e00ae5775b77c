//! logbridge CLI
//!
//! Command-line front end that assembles a log adapter and relays records

use clap::{Parser, Subcommand};
use logbridge_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "logbridge")]
#[command(about = "logbridge - relay log records to a single handler", long_about = None)]
struct Cli {
    /// Diagnostics profile for the adapter's own logs (dev, prod, test)
    #[arg(long, global = true, default_value = "test")]
    profile: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Relay records emitted through the `log` facade to stdout
    Relay(commands::relay::RelayArgs),
    /// Walk the adapter state machine and print each observation
    Lifecycle,
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.profile);

    let result = match cli.command {
        Commands::Relay(args) => commands::relay::execute(args),
        Commands::Lifecycle => commands::lifecycle::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
