//! Routing configuration file format and operations.

use std::path::Path;

use serde::{Deserialize, Serialize};
use switchyard_core::{ConnectionGraph, GraphBuilder};

use crate::connection_config::{ConnectionConfig, DeviceControlConfig};
use crate::error::ConfigError;
use crate::validation::{ValidationResult, resolve_config, validate_config};

/// Routing configuration for one site.
///
/// Lists the routing-capable device controls (midpoints) and every physical
/// connection between device connectors. Loaded from TOML, validated, then
/// turned into a [`ConnectionGraph`].
///
/// # TOML Format
///
/// ```toml
/// name = "Building A"
/// description = "Ground floor conference rooms"
///
/// [[midpoints]]
/// device = 20
/// name = "Main matrix"
///
/// [[connections]]
/// id = 1
/// source = "10.0.1"
/// destination = "20.0.1"
/// types = ["audio", "video"]
///
/// [[connections]]
/// id = 2
/// source = "20.0.1"
/// destination = "30.0.1"
/// types = ["video"]
/// rooms = { mode = "only", ids = [1] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingConfig {
    /// Name of the site.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Routing-capable device controls.
    #[serde(default)]
    pub midpoints: Vec<DeviceControlConfig>,

    /// Physical connections.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

impl RoutingConfig {
    /// Create an empty configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            midpoints: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Create a configuration describing an existing graph.
    ///
    /// Midpoints are written in id order, connections in graph order.
    pub fn from_graph(name: impl Into<String>, graph: &ConnectionGraph) -> Self {
        let mut midpoints: Vec<_> = graph.midpoints().collect();
        midpoints.sort_unstable();
        Self::new(name)
            .with_midpoints(midpoints.into_iter().map(DeviceControlConfig::from))
            .with_connections(graph.iter().map(ConnectionConfig::from))
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a midpoint.
    pub fn with_midpoint(mut self, midpoint: DeviceControlConfig) -> Self {
        self.midpoints.push(midpoint);
        self
    }

    /// Add several midpoints.
    pub fn with_midpoints(mut self, midpoints: impl IntoIterator<Item = DeviceControlConfig>) -> Self {
        self.midpoints.extend(midpoints);
        self
    }

    /// Add a connection.
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connections.push(connection);
        self
    }

    /// Add several connections.
    pub fn with_connections(mut self, connections: impl IntoIterator<Item = ConnectionConfig>) -> Self {
        self.connections.extend(connections);
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every connection and midpoint, reporting all problems.
    ///
    /// See [`validate_config`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// A graph builder loaded with the validated contents.
    pub fn graph_builder(&self) -> Result<GraphBuilder, ConfigError> {
        let resolved = resolve_config(self)?;
        Ok(ConnectionGraph::builder()
            .midpoints(resolved.midpoints)
            .connections(resolved.connections))
    }

    /// Validate and build the connection graph.
    pub fn build_graph(&self) -> Result<ConnectionGraph, ConfigError> {
        Ok(self.graph_builder()?.build()?)
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Check if there are no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
