//! Shared CLI helpers used across multiple commands.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use switchyard_config::RoutingConfig;
use switchyard_core::{Availability, ConnectionGraph, EndpointInfo, ParseEndpointError};

/// Equivalent destination endpoints given as one argument, e.g. `40.0.1,40.0.2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointGroup(pub Vec<EndpointInfo>);

impl FromStr for EndpointGroup {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',').map(str::parse).collect::<Result<_, _>>().map(Self)
    }
}

/// Load a routing configuration from a TOML file.
pub fn load_config(path: &Path) -> anyhow::Result<RoutingConfig> {
    let config = RoutingConfig::load(path)?;
    tracing::info!(
        name = %config.name,
        connections = config.len(),
        midpoints = config.midpoints.len(),
        "loaded configuration"
    );
    Ok(config)
}

/// Load a routing configuration and build its connection graph.
pub fn load_graph(path: &Path) -> anyhow::Result<(RoutingConfig, ConnectionGraph)> {
    let config = load_config(path)?;
    let graph = config
        .build_graph()
        .with_context(|| format!("invalid configuration '{}'", path.display()))?;
    Ok((config, graph))
}

/// Short text form of an availability rule.
pub fn format_availability(availability: &Availability) -> String {
    let join = |ids: &std::collections::BTreeSet<u32>| {
        ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
    };
    match availability {
        Availability::All => "all".to_string(),
        Availability::Only(ids) => format!("only {}", join(ids)),
        Availability::Except(ids) => format!("except {}", join(ids)),
    }
}
