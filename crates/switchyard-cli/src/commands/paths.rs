//! Run path queries against a routing configuration.

use std::sync::Arc;

use clap::Args;
use switchyard_core::{
    ConnectionPath, ConnectionType, ConnectionUsages, EndpointInfo, PathBuilder, PathFinder, RoomId,
};

use super::common::{EndpointGroup, load_graph};

/// Find paths from a source to one or more destination groups.
#[derive(Args)]
pub struct PathsArgs {
    /// Path to the routing configuration (TOML)
    pub config: std::path::PathBuf,

    /// Source endpoint(s), comma-separated alternates (device.control.address)
    #[arg(long, required = true, value_delimiter = ',')]
    pub from: Vec<EndpointInfo>,

    /// Destination group, comma-separated alternates; repeat for more groups
    #[arg(long, required = true)]
    pub to: Vec<EndpointGroup>,

    /// Signal types to route (e.g. "video", "audio,video")
    #[arg(short, long, default_value = "video")]
    pub types: ConnectionType,

    /// Requesting room id (0 = unscoped)
    #[arg(short, long, default_value_t = 0)]
    pub room: u32,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail unless every destination group is reachable for every type
    #[arg(long)]
    pub require: bool,
}

/// Run the paths command.
pub fn run(args: PathsArgs) -> anyhow::Result<()> {
    let (_, graph) = load_graph(&args.config)?;
    let finder = PathFinder::new(Arc::new(graph), Arc::new(ConnectionUsages::new()));

    let room = RoomId(args.room);
    let query = args
        .to
        .iter()
        .fold(PathBuilder::new().sources(args.from.iter().copied()), |builder, group| {
            builder.destination_group(group.0.iter().copied())
        })
        .of_type(args.types)
        .in_room(room)
        .build();

    let paths = finder.find_paths([&query]);
    let expected = query.destinations.len() * query.connection_type.singles().count();

    if args.json {
        print_json(&paths)?;
    } else {
        print_text(&paths, room, expected);
    }

    if args.require && !finder.has_paths([&query]) {
        anyhow::bail!(
            "only {} of {} requested paths exist",
            paths.len(),
            expected
        );
    }
    Ok(())
}

fn print_text(paths: &[ConnectionPath], room: RoomId, expected: usize) {
    println!("{room}: {} of {expected} paths found", paths.len());
    for path in paths {
        println!();
        println!("  {path}");
        let operations = path.route_operations();
        if operations.is_empty() {
            println!("    direct connection, no switching");
        }
        for operation in operations {
            println!("    switch {operation}");
        }
    }
}

fn print_json(paths: &[ConnectionPath]) -> anyhow::Result<()> {
    let report: Vec<_> = paths
        .iter()
        .map(|path| {
            serde_json::json!({
                "type": path.connection_type().to_string(),
                "source": path.source().to_string(),
                "destination": path.destination().to_string(),
                "connections": path.connection_ids().map(|id| id.0).collect::<Vec<_>>(),
                "operations": path.route_operations().iter().map(|op| serde_json::json!({
                    "control": op.control.to_string(),
                    "input": op.input,
                    "output": op.output,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
