//! Connection graph storage and lookup indexes.

use std::collections::{HashMap, HashSet};

use crate::connection::{Connection, ConnectionId};
use crate::connection_type::ConnectionType;
use crate::endpoint::{DeviceControlInfo, EndpointInfo};

use super::error::GraphError;

/// Immutable set of connections with lookup indexes.
///
/// Connections keep their configuration order. Every enumeration method
/// yields connections in that order, which makes path search tie-breaks
/// stable for a given graph.
#[derive(Debug, Default)]
pub struct ConnectionGraph {
    connections: Vec<Connection>,
    by_id: HashMap<ConnectionId, usize>,
    by_source: HashMap<EndpointInfo, Vec<usize>>,
    by_destination: HashMap<EndpointInfo, Vec<usize>>,
    from_control: HashMap<DeviceControlInfo, Vec<usize>>,
    to_control: HashMap<DeviceControlInfo, Vec<usize>>,
    midpoints: HashSet<DeviceControlInfo>,
}

/// Collects connections and midpoints, then validates them into a
/// [`ConnectionGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    connections: Vec<Connection>,
    midpoints: Vec<DeviceControlInfo>,
}

impl GraphBuilder {
    /// Adds a connection.
    pub fn connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Adds several connections.
    pub fn connections(mut self, connections: impl IntoIterator<Item = Connection>) -> Self {
        self.connections.extend(connections);
        self
    }

    /// Declares a routing-capable device control.
    pub fn midpoint(mut self, control: DeviceControlInfo) -> Self {
        self.midpoints.push(control);
        self
    }

    /// Declares several routing-capable device controls.
    pub fn midpoints(mut self, controls: impl IntoIterator<Item = DeviceControlInfo>) -> Self {
        self.midpoints.extend(controls);
        self
    }

    /// Validates the collected connections and builds the indexes.
    pub fn build(self) -> Result<ConnectionGraph, GraphError> {
        let mut graph = ConnectionGraph {
            midpoints: self.midpoints.into_iter().collect(),
            ..ConnectionGraph::default()
        };
        let mut outgoing: HashMap<(EndpointInfo, ConnectionType), ConnectionId> = HashMap::new();
        let mut incoming: HashMap<(EndpointInfo, ConnectionType), ConnectionId> = HashMap::new();

        for connection in self.connections {
            let id = connection.id;
            if graph.by_id.contains_key(&id) {
                return Err(GraphError::DuplicateId(id));
            }
            if connection.connection_type.is_empty() {
                return Err(GraphError::EmptyConnectionType(id));
            }
            if connection.source == connection.destination {
                return Err(GraphError::SelfLoop {
                    id,
                    endpoint: connection.source,
                });
            }
            for flag in connection.connection_type.singles() {
                if let Some(&first) = outgoing.get(&(connection.source, flag)) {
                    return Err(GraphError::DuplicateOutgoing {
                        endpoint: connection.source,
                        flag,
                        first,
                        second: id,
                    });
                }
                if let Some(&first) = incoming.get(&(connection.destination, flag)) {
                    return Err(GraphError::DuplicateIncoming {
                        endpoint: connection.destination,
                        flag,
                        first,
                        second: id,
                    });
                }
                outgoing.insert((connection.source, flag), id);
                incoming.insert((connection.destination, flag), id);
            }

            let idx = graph.connections.len();
            graph.by_id.insert(id, idx);
            graph.by_source.entry(connection.source).or_default().push(idx);
            graph
                .by_destination
                .entry(connection.destination)
                .or_default()
                .push(idx);
            graph
                .from_control
                .entry(connection.source.device_control())
                .or_default()
                .push(idx);
            graph
                .to_control
                .entry(connection.destination.device_control())
                .or_default()
                .push(idx);
            graph.connections.push(connection);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            connections = graph.connections.len(),
            midpoints = graph.midpoints.len(),
            "graph_build: connection graph ready"
        );
        Ok(graph)
    }
}

impl ConnectionGraph {
    /// Starts building a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns true if the graph has no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// All connections in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Looks up a connection by id.
    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.by_id.get(&id).map(|&idx| &self.connections[idx])
    }

    /// Returns true if a connection with this id exists.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Returns true if `control` can route an input to an output.
    pub fn is_midpoint(&self, control: DeviceControlInfo) -> bool {
        self.midpoints.contains(&control)
    }

    /// Routing-capable device controls, in no particular order.
    pub fn midpoints(&self) -> impl Iterator<Item = DeviceControlInfo> + '_ {
        self.midpoints.iter().copied()
    }

    /// The connection leaving `endpoint` that carries `flag`.
    ///
    /// There is at most one per single flag. A multi-flag argument matches a
    /// connection that carries all of the flags.
    pub fn outgoing(&self, endpoint: EndpointInfo, flag: ConnectionType) -> Option<&Connection> {
        self.connections_from(endpoint).find(|c| c.carries(flag))
    }

    /// The connection arriving at `endpoint` that carries `flag`.
    pub fn incoming(&self, endpoint: EndpointInfo, flag: ConnectionType) -> Option<&Connection> {
        self.connections_to(endpoint).find(|c| c.carries(flag))
    }

    /// Every connection leaving `endpoint`.
    pub fn connections_from(&self, endpoint: EndpointInfo) -> impl Iterator<Item = &Connection> {
        self.indexed(self.by_source.get(&endpoint))
    }

    /// Every connection arriving at `endpoint`.
    pub fn connections_to(&self, endpoint: EndpointInfo) -> impl Iterator<Item = &Connection> {
        self.indexed(self.by_destination.get(&endpoint))
    }

    /// Connections leaving any output of `control` that carry `flag`.
    pub fn connections_from_control(
        &self,
        control: DeviceControlInfo,
        flag: ConnectionType,
    ) -> impl Iterator<Item = &Connection> {
        self.indexed(self.from_control.get(&control))
            .filter(move |c| c.carries(flag))
    }

    /// Connections arriving at any input of `control` that carry `flag`.
    pub fn connections_to_control(
        &self,
        control: DeviceControlInfo,
        flag: ConnectionType,
    ) -> impl Iterator<Item = &Connection> {
        self.indexed(self.to_control.get(&control))
            .filter(move |c| c.carries(flag))
    }

    fn indexed<'a>(&'a self, indexes: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Connection> {
        indexes
            .into_iter()
            .flatten()
            .map(move |&idx| &self.connections[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Availability;

    fn ep(device: u32, address: u32) -> EndpointInfo {
        EndpointInfo::new(device, 0, address)
    }

    fn video(id: u32, from: EndpointInfo, to: EndpointInfo) -> Connection {
        Connection::new(id, from, to, ConnectionType::VIDEO)
    }

    #[test]
    fn test_lookup_indexes() {
        let graph = ConnectionGraph::builder()
            .midpoint(DeviceControlInfo::new(2, 0))
            .connection(video(1, ep(1, 1), ep(2, 1)))
            .connection(video(2, ep(2, 1), ep(3, 1)))
            .connection(video(3, ep(2, 2), ep(4, 1)))
            .build()
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert!(graph.contains(ConnectionId(2)));
        assert!(!graph.contains(ConnectionId(9)));
        assert_eq!(graph.get(ConnectionId(3)).unwrap().destination, ep(4, 1));
        assert!(graph.is_midpoint(DeviceControlInfo::new(2, 0)));
        assert!(!graph.is_midpoint(DeviceControlInfo::new(3, 0)));

        assert_eq!(graph.outgoing(ep(1, 1), ConnectionType::VIDEO).unwrap().id, ConnectionId(1));
        assert!(graph.outgoing(ep(1, 1), ConnectionType::AUDIO).is_none());
        assert_eq!(graph.incoming(ep(4, 1), ConnectionType::VIDEO).unwrap().id, ConnectionId(3));

        let leaving: Vec<_> = graph
            .connections_from_control(DeviceControlInfo::new(2, 0), ConnectionType::VIDEO)
            .map(|c| c.id.0)
            .collect();
        assert_eq!(leaving, vec![2, 3]);
        let arriving: Vec<_> = graph
            .connections_to_control(DeviceControlInfo::new(2, 0), ConnectionType::VIDEO)
            .map(|c| c.id.0)
            .collect();
        assert_eq!(arriving, vec![1]);
    }

    #[test]
    fn test_split_audio_video_paths() {
        // Same source endpoint, audio and video broken out on separate links.
        let graph = ConnectionGraph::builder()
            .connection(Connection::new(1, ep(1, 1), ep(2, 1), ConnectionType::VIDEO))
            .connection(Connection::new(2, ep(1, 1), ep(5, 1), ConnectionType::AUDIO))
            .build()
            .unwrap();
        assert_eq!(graph.outgoing(ep(1, 1), ConnectionType::VIDEO).unwrap().id.0, 1);
        assert_eq!(graph.outgoing(ep(1, 1), ConnectionType::AUDIO).unwrap().id.0, 2);
        assert!(graph
            .outgoing(ep(1, 1), ConnectionType::AUDIO | ConnectionType::VIDEO)
            .is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = ConnectionGraph::builder()
            .connection(video(1, ep(1, 1), ep(2, 1)))
            .connection(video(1, ep(1, 2), ep(2, 2)))
            .build();
        assert_eq!(result.unwrap_err(), GraphError::DuplicateId(ConnectionId(1)));
    }

    #[test]
    fn test_empty_type_rejected() {
        let result = ConnectionGraph::builder()
            .connection(Connection::new(4, ep(1, 1), ep(2, 1), ConnectionType::empty()))
            .build();
        assert_eq!(result.unwrap_err(), GraphError::EmptyConnectionType(ConnectionId(4)));
    }

    #[test]
    fn test_self_loop_rejected() {
        let result = ConnectionGraph::builder()
            .connection(video(1, ep(1, 1), ep(1, 1)))
            .build();
        assert!(matches!(result, Err(GraphError::SelfLoop { .. })));
    }

    #[test]
    fn test_duplicate_outgoing_per_flag_rejected() {
        let result = ConnectionGraph::builder()
            .connection(Connection::new(1, ep(1, 1), ep(2, 1), ConnectionType::AUDIO | ConnectionType::VIDEO))
            .connection(video(2, ep(1, 1), ep(3, 1)))
            .build();
        assert_eq!(
            result.unwrap_err(),
            GraphError::DuplicateOutgoing {
                endpoint: ep(1, 1),
                flag: ConnectionType::VIDEO,
                first: ConnectionId(1),
                second: ConnectionId(2),
            }
        );
    }

    #[test]
    fn test_duplicate_incoming_per_flag_rejected() {
        let result = ConnectionGraph::builder()
            .connection(video(1, ep(1, 1), ep(3, 1)))
            .connection(video(2, ep(2, 1), ep(3, 1)))
            .build();
        assert!(matches!(result, Err(GraphError::DuplicateIncoming { .. })));
    }

    #[test]
    fn test_availability_is_kept() {
        let graph = ConnectionGraph::builder()
            .connection(video(1, ep(1, 1), ep(2, 1)).with_rooms(Availability::only([3])))
            .build()
            .unwrap();
        let conn = graph.get(ConnectionId(1)).unwrap();
        assert_eq!(conn.rooms, Availability::only([3]));
    }
}
