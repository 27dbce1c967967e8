//! Routing configuration validation.
//!
//! Checks what the graph builder checks, but reports every problem at once
//! instead of stopping at the first: unknown or missing type names, bad
//! endpoint text, duplicate ids, self loops, and endpoints with two outgoing
//! or two incoming connections for the same flag.
//!
//! # Example
//!
//! ```rust
//! use switchyard_config::{ConnectionConfig, RoutingConfig, ValidationError, validate_config};
//!
//! let config = RoutingConfig::new("Broken")
//!     .with_connection(ConnectionConfig::new(1, "1.0.1", "2.0.1").with_type("video"))
//!     .with_connection(ConnectionConfig::new(1, "1.0.2", "2.0.2").with_type("video"))
//!     .with_connection(ConnectionConfig::new(2, "1.0.3", "2.0.3").with_type("smell"));
//!
//! let Err(ValidationError::Multiple(errors)) = validate_config(&config) else {
//!     panic!("expected two errors");
//! };
//! assert_eq!(errors.len(), 2);
//! ```

use std::collections::{HashMap, HashSet};

use switchyard_core::{
    Connection, ConnectionId, ConnectionType, ConnectionTypeError, DeviceControlInfo, EndpointInfo,
    GraphError, ParseEndpointError,
};
use thiserror::Error;

use crate::RoutingConfig;
use crate::connection_config::ConnectionConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A type name is not a known signal type.
    #[error("connection {connection}: unknown connection type '{name}'")]
    UnknownType {
        /// Id of the connection.
        connection: u32,
        /// The unrecognized name.
        name: String,
    },

    /// An endpoint string does not parse.
    #[error("connection {connection}: bad {field}: {source}")]
    InvalidEndpoint {
        /// Id of the connection.
        connection: u32,
        /// `source` or `destination`.
        field: &'static str,
        /// Parse failure.
        #[source]
        source: ParseEndpointError,
    },

    /// The same midpoint is declared twice.
    #[error("midpoint {0} declared more than once")]
    DuplicateMidpoint(DeviceControlInfo),

    /// A structural graph rule is broken.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validated, runtime-typed contents of a [`RoutingConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Connections in file order.
    pub connections: Vec<Connection>,
    /// Declared midpoints in file order.
    pub midpoints: Vec<DeviceControlInfo>,
}

/// Validate a routing configuration.
pub fn validate_config(config: &RoutingConfig) -> ValidationResult<()> {
    resolve_config(config).map(|_| ())
}

/// Validate a routing configuration and convert it to core types.
pub fn resolve_config(config: &RoutingConfig) -> ValidationResult<ResolvedConfig> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    let mut midpoints = Vec::with_capacity(config.midpoints.len());
    for midpoint in &config.midpoints {
        let control = midpoint.device_control();
        if seen.insert(control) {
            midpoints.push(control);
        } else {
            errors.push(ValidationError::DuplicateMidpoint(control));
        }
    }

    let connections: Vec<Connection> = config
        .connections
        .iter()
        .filter_map(|c| resolve_connection(c, &mut errors))
        .collect();
    check_structure(&connections, &mut errors);

    match errors.len() {
        0 => Ok(ResolvedConfig {
            connections,
            midpoints,
        }),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Parse one connection entry, recording every problem found in it.
fn resolve_connection(config: &ConnectionConfig, errors: &mut Vec<ValidationError>) -> Option<Connection> {
    let before = errors.len();
    let id = config.id;

    let mut endpoint = |field: &'static str, text: &str| match text.parse::<EndpointInfo>() {
        Ok(endpoint) => Some(endpoint),
        Err(source) => {
            errors.push(ValidationError::InvalidEndpoint {
                connection: id,
                field,
                source,
            });
            None
        }
    };
    let source = endpoint("source", &config.source);
    let destination = endpoint("destination", &config.destination);

    let mut connection_type = ConnectionType::empty();
    for name in &config.types {
        match name.parse::<ConnectionType>() {
            Ok(flags) => connection_type |= flags,
            Err(ConnectionTypeError::UnknownName(name)) => errors.push(ValidationError::UnknownType {
                connection: id,
                name,
            }),
            Err(other) => errors.push(ValidationError::UnknownType {
                connection: id,
                name: other.to_string(),
            }),
        }
    }
    if connection_type.is_empty() && errors.len() == before {
        errors.push(GraphError::EmptyConnectionType(ConnectionId(id)).into());
    }

    if errors.len() != before {
        return None;
    }
    let (source, destination) = (source?, destination?);
    Some(
        Connection::new(id, source, destination, connection_type)
            .with_source_devices(config.source_devices.to_availability())
            .with_rooms(config.rooms.to_availability()),
    )
}

/// The graph builder's structural rules, collecting every violation.
fn check_structure(connections: &[Connection], errors: &mut Vec<ValidationError>) {
    let mut ids = HashSet::new();
    let mut outgoing: HashMap<(EndpointInfo, ConnectionType), ConnectionId> = HashMap::new();
    let mut incoming: HashMap<(EndpointInfo, ConnectionType), ConnectionId> = HashMap::new();

    for connection in connections {
        let id = connection.id;
        if !ids.insert(id) {
            errors.push(GraphError::DuplicateId(id).into());
            continue;
        }
        if connection.source == connection.destination {
            errors.push(
                GraphError::SelfLoop {
                    id,
                    endpoint: connection.source,
                }
                .into(),
            );
            continue;
        }
        for flag in connection.connection_type.singles() {
            if let Some(&first) = outgoing.get(&(connection.source, flag)) {
                errors.push(
                    GraphError::DuplicateOutgoing {
                        endpoint: connection.source,
                        flag,
                        first,
                        second: id,
                    }
                    .into(),
                );
            } else {
                outgoing.insert((connection.source, flag), id);
            }
            if let Some(&first) = incoming.get(&(connection.destination, flag)) {
                errors.push(
                    GraphError::DuplicateIncoming {
                        endpoint: connection.destination,
                        flag,
                        first,
                        second: id,
                    }
                    .into(),
                );
            } else {
                incoming.insert((connection.destination, flag), id);
            }
        }
    }
}
