//! Skewbridge CLI
//!
//! Command-line interface over the legacy definition store and the model matcher

use clap::{Parser, Subcommand};
use skewbridge_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "skewbridge")]
#[command(about = "Skewbridge - Management model version transformation", long_about = None)]
struct Cli {
    /// Emit debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON logs instead of human-readable ones
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Map the attributes of a current definition onto a legacy one
    Match(commands::matcher::MatchArgs),
    /// Load a definition from a directory and summarize it
    Inspect(commands::inspect::InspectArgs),
    /// Resolve an expression against the environment and given properties
    Resolve(commands::resolve::ResolveArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        init(Profile::Production);
    } else if cli.verbose {
        init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Match(args) => commands::matcher::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
        Commands::Resolve(args) => commands::resolve::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
