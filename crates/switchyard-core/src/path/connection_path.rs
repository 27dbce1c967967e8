//! Found routes and the per-hop switch operations they imply.

use core::fmt;

use thiserror::Error;

use crate::connection::{Connection, ConnectionId};
use crate::connection_type::{ConnectionType, ConnectionTypeError};
use crate::endpoint::{DeviceControlInfo, EndpointInfo};

/// Errors constructing a [`ConnectionPath`] by hand.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path needs at least one connection.
    #[error("path has no connections")]
    Empty,

    /// A path is for exactly one flag.
    #[error(transparent)]
    ConnectionType(#[from] ConnectionTypeError),

    /// A hop does not carry the path's flag.
    #[error("connection {0} does not carry the path's connection type")]
    WrongType(ConnectionId),

    /// A hop does not leave the device control the previous hop arrived at.
    #[error("connection {0} does not continue from the previous hop")]
    Discontinuous(ConnectionId),
}

/// A switch a midpoint must make for a path: route `input` to `output`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RouteOperation {
    /// The switching device control.
    pub control: DeviceControlInfo,
    /// Input address on the control.
    pub input: u32,
    /// Output address on the control.
    pub output: u32,
    /// Single flag to route.
    pub connection_type: ConnectionType,
}

impl fmt::Display for RouteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: in {} -> out {} [{}]",
            self.control, self.input, self.output, self.connection_type
        )
    }
}

/// Ordered hops from a source to a destination for one flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionPath {
    connections: Vec<Connection>,
    connection_type: ConnectionType,
}

impl ConnectionPath {
    /// Builds a path, checking it is non-empty, single-flag and contiguous.
    pub fn new(connections: Vec<Connection>, connection_type: ConnectionType) -> Result<Self, PathError> {
        let connection_type = connection_type.require_single()?;
        let first = connections.first().ok_or(PathError::Empty)?;
        if !first.carries(connection_type) {
            return Err(PathError::WrongType(first.id));
        }
        for pair in connections.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if !next.carries(connection_type) {
                return Err(PathError::WrongType(next.id));
            }
            if next.source.device_control() != prev.destination.device_control() {
                return Err(PathError::Discontinuous(next.id));
            }
        }
        Ok(Self::from_parts(connections, connection_type))
    }

    /// Builds a path the finder has already validated.
    pub(crate) fn from_parts(connections: Vec<Connection>, connection_type: ConnectionType) -> Self {
        debug_assert!(!connections.is_empty());
        Self {
            connections,
            connection_type,
        }
    }

    /// Hops in order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The single flag the path carries.
    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Always false: a path has at least one hop.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Where the path starts.
    pub fn source(&self) -> EndpointInfo {
        self.connections[0].source
    }

    /// Where the path ends.
    pub fn destination(&self) -> EndpointInfo {
        self.connections[self.connections.len() - 1].destination
    }

    /// Ids of the hops, in order.
    pub fn connection_ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections.iter().map(|c| c.id)
    }

    /// Returns true if the path uses `connection`.
    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.connection_ids().any(|id| id == connection)
    }

    /// Switches each intermediate device control must make, in path order.
    ///
    /// A one-hop path needs none.
    pub fn route_operations(&self) -> Vec<RouteOperation> {
        self.connections
            .windows(2)
            .map(|pair| RouteOperation {
                control: pair[0].destination.device_control(),
                input: pair[0].destination.address,
                output: pair[1].source.address,
                connection_type: self.connection_type,
            })
            .collect()
    }
}

impl fmt::Display for ConnectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.connection_type, self.source())?;
        for hop in &self.connections {
            write!(f, " -({})-> {}", hop.id.0, hop.destination)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: ConnectionType = ConnectionType::VIDEO;

    fn ep(device: u32, address: u32) -> EndpointInfo {
        EndpointInfo::new(device, 0, address)
    }

    fn hops() -> Vec<Connection> {
        vec![
            Connection::new(1, ep(1, 1), ep(2, 3), V),
            Connection::new(2, ep(2, 5), ep(3, 2), V),
            Connection::new(3, ep(3, 1), ep(4, 1), V),
        ]
    }

    #[test]
    fn test_route_operations_follow_midpoints() {
        let path = ConnectionPath::new(hops(), V).unwrap();
        assert_eq!(path.source(), ep(1, 1));
        assert_eq!(path.destination(), ep(4, 1));
        assert_eq!(
            path.route_operations(),
            vec![
                RouteOperation {
                    control: DeviceControlInfo::new(2, 0),
                    input: 3,
                    output: 5,
                    connection_type: V,
                },
                RouteOperation {
                    control: DeviceControlInfo::new(3, 0),
                    input: 2,
                    output: 1,
                    connection_type: V,
                },
            ]
        );
    }

    #[test]
    fn test_one_hop_needs_no_switching() {
        let path = ConnectionPath::new(hops()[..1].to_vec(), V).unwrap();
        assert!(path.route_operations().is_empty());
        assert!(path.contains(ConnectionId(1)));
        assert!(!path.contains(ConnectionId(2)));
    }

    #[test]
    fn test_new_validates() {
        assert_eq!(ConnectionPath::new(Vec::new(), V).unwrap_err(), PathError::Empty);
        assert!(matches!(
            ConnectionPath::new(hops(), V | ConnectionType::AUDIO),
            Err(PathError::ConnectionType(_))
        ));
        assert_eq!(
            ConnectionPath::new(hops(), ConnectionType::AUDIO).unwrap_err(),
            PathError::WrongType(ConnectionId(1))
        );
        let mut broken = hops();
        broken.remove(1);
        assert_eq!(
            ConnectionPath::new(broken, V).unwrap_err(),
            PathError::Discontinuous(ConnectionId(3))
        );
    }

    #[test]
    fn test_display() {
        let path = ConnectionPath::new(hops()[..2].to_vec(), V).unwrap();
        assert_eq!(path.to_string(), "[Video] 1.0.1 -(1)-> 2.0.3 -(2)-> 3.0.2");
    }
}
