//! List connections in a routing configuration.

use clap::Args;
use switchyard_core::ConnectionType;

use super::common::{format_availability, load_graph};

/// List connections, optionally filtered by signal type.
#[derive(Args)]
pub struct ConnectionsArgs {
    /// Path to the routing configuration (TOML)
    pub config: std::path::PathBuf,

    /// Only show connections carrying any of these types (e.g. "audio,video")
    #[arg(short, long)]
    pub types: Option<ConnectionType>,
}

/// Run the connections command.
pub fn run(args: ConnectionsArgs) -> anyhow::Result<()> {
    let (config, graph) = load_graph(&args.config)?;

    println!("{}", config.name);
    if let Some(description) = &config.description {
        println!("{description}");
    }
    println!();

    let mut midpoints: Vec<_> = graph.midpoints().map(|m| m.to_string()).collect();
    midpoints.sort();
    println!(
        "Midpoints: {}",
        if midpoints.is_empty() {
            "(none)".to_string()
        } else {
            midpoints.join(", ")
        }
    );
    println!();

    println!(
        "{:>5}  {:<12} {:<12} {:<16} {:<14} {:<14}",
        "ID", "SOURCE", "DESTINATION", "TYPES", "SOURCES", "ROOMS"
    );
    let mut shown = 0;
    for connection in graph.iter() {
        if let Some(filter) = args.types
            && !connection.connection_type.intersects(filter)
        {
            continue;
        }
        println!(
            "{:>5}  {:<12} {:<12} {:<16} {:<14} {:<14}",
            connection.id.0,
            connection.source.to_string(),
            connection.destination.to_string(),
            connection.connection_type.to_string(),
            format_availability(&connection.source_devices),
            format_availability(&connection.rooms),
        );
        shown += 1;
    }
    println!();
    println!("{shown} of {} connections", graph.len());

    Ok(())
}
