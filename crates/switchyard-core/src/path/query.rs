//! Path search requests.

use crate::connection::RoomId;
use crate::connection_type::ConnectionType;
use crate::endpoint::EndpointInfo;

/// One routing request handed to the [`PathFinder`](super::PathFinder).
///
/// `sources` are alternate connectors for the same logical source; any of
/// them may be used. Each entry of `destinations` is a group of equivalent
/// connectors of which at least one must be reached. Each flag of
/// `connection_type` is searched independently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathBuilderQuery {
    /// Equivalent source endpoints, tried in order.
    pub sources: Vec<EndpointInfo>,
    /// Destination candidate groups.
    pub destinations: Vec<Vec<EndpointInfo>>,
    /// Requested signal types.
    pub connection_type: ConnectionType,
    /// Room the route is for.
    pub room: RoomId,
}

/// Fluent constructor for [`PathBuilderQuery`].
///
/// # Example
///
/// ```rust
/// use switchyard_core::{ConnectionType, EndpointInfo, PathBuilder, RoomId};
///
/// let query = PathBuilder::new()
///     .source(EndpointInfo::new(1, 0, 1))
///     .destination(EndpointInfo::new(9, 0, 1))
///     .destination_group([EndpointInfo::new(10, 0, 1), EndpointInfo::new(10, 0, 2)])
///     .of_type(ConnectionType::AUDIO | ConnectionType::VIDEO)
///     .in_room(RoomId(4))
///     .build();
///
/// assert_eq!(query.destinations.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    query: PathBuilderQuery,
}

impl PathBuilder {
    /// Starts an empty query (no flags, unscoped room).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source endpoint.
    pub fn source(mut self, source: EndpointInfo) -> Self {
        self.query.sources.push(source);
        self
    }

    /// Adds several equivalent source endpoints.
    pub fn sources(mut self, sources: impl IntoIterator<Item = EndpointInfo>) -> Self {
        self.query.sources.extend(sources);
        self
    }

    /// Adds a destination group with a single member.
    pub fn destination(mut self, destination: EndpointInfo) -> Self {
        self.query.destinations.push(vec![destination]);
        self
    }

    /// Adds a destination group of equivalent endpoints.
    pub fn destination_group(mut self, group: impl IntoIterator<Item = EndpointInfo>) -> Self {
        self.query.destinations.push(group.into_iter().collect());
        self
    }

    /// Adds flags to the requested signal types.
    pub fn of_type(mut self, connection_type: ConnectionType) -> Self {
        self.query.connection_type |= connection_type;
        self
    }

    /// Sets the requesting room.
    pub fn in_room(mut self, room: RoomId) -> Self {
        self.query.room = room;
        self
    }

    /// Finishes the query.
    pub fn build(self) -> PathBuilderQuery {
        self.query
    }
}
