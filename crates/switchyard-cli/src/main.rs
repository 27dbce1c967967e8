//! Switchyard CLI - inspect routing configurations and query paths.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(author, version, about = "Switchyard AV routing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a routing configuration
    Validate(commands::validate::ValidateArgs),

    /// List the connections in a routing configuration
    Connections(commands::connections::ConnectionsArgs),

    /// Find paths from a source to destination groups
    Paths(commands::paths::PathsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Connections(args) => commands::connections::run(args),
        Commands::Paths(args) => commands::paths::run(args),
    }
}
