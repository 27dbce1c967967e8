//! Connection edge types for the routing graph.
//!
//! A [`Connection`] is a directed, typed link from one endpoint to another.
//! Connections are configuration data: they are created when the graph is
//! loaded and never mutated while it is live. Routing state lives in the
//! switcher caches and claims live in the usage ledger.

use std::collections::BTreeSet;
use std::fmt;

use crate::connection_type::ConnectionType;
use crate::endpoint::EndpointInfo;

/// Unique identifier for a connection in the routing graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u32);

impl ConnectionId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

/// Identifier of a room, the consumer-side scope for claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoomId(pub u32);

impl RoomId {
    /// The unscoped room. Claims made with it are recorded in no room set.
    pub const UNSCOPED: RoomId = RoomId(0);

    /// Returns true for [`RoomId::UNSCOPED`].
    #[inline]
    pub fn is_unscoped(self) -> bool {
        self == Self::UNSCOPED
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Room({})", self.0)
    }
}

/// Which ids (devices or rooms) may use a connection.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Availability {
    /// Available to every id.
    #[default]
    All,
    /// Available only to the listed ids. An empty list admits nobody.
    Only(BTreeSet<u32>),
    /// Available to every id except the listed ones.
    Except(BTreeSet<u32>),
}

impl Availability {
    /// Returns true if `id` may use the connection.
    pub fn admits(&self, id: u32) -> bool {
        match self {
            Availability::All => true,
            Availability::Only(ids) => ids.contains(&id),
            Availability::Except(ids) => !ids.contains(&id),
        }
    }

    /// Shorthand for [`Availability::Only`].
    pub fn only(ids: impl IntoIterator<Item = u32>) -> Self {
        Availability::Only(ids.into_iter().collect())
    }

    /// Shorthand for [`Availability::Except`].
    pub fn except(ids: impl IntoIterator<Item = u32>) -> Self {
        Availability::Except(ids.into_iter().collect())
    }
}

/// A directed, typed link between two endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    /// Unique id within a graph.
    pub id: ConnectionId,
    /// Upstream endpoint.
    pub source: EndpointInfo,
    /// Downstream endpoint.
    pub destination: EndpointInfo,
    /// Signal types the link carries.
    pub connection_type: ConnectionType,
    /// Source devices whose signal may travel over this link.
    pub source_devices: Availability,
    /// Rooms that may use this link.
    pub rooms: Availability,
}

impl Connection {
    /// Creates a connection available to every source device and room.
    pub fn new(
        id: u32,
        source: EndpointInfo,
        destination: EndpointInfo,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            id: ConnectionId(id),
            source,
            destination,
            connection_type,
            source_devices: Availability::All,
            rooms: Availability::All,
        }
    }

    /// Restricts which source devices may use the link.
    pub fn with_source_devices(mut self, availability: Availability) -> Self {
        self.source_devices = availability;
        self
    }

    /// Restricts which rooms may use the link.
    pub fn with_rooms(mut self, availability: Availability) -> Self {
        self.rooms = availability;
        self
    }

    /// Returns true if the link carries every flag in `flags`.
    #[inline]
    pub fn carries(&self, flags: ConnectionType) -> bool {
        !flags.is_empty() && self.connection_type.contains(flags)
    }

    /// Returns true if signal originating at device `device` may use the link.
    #[inline]
    pub fn is_available_to_source_device(&self, device: u32) -> bool {
        self.source_devices.admits(device)
    }

    /// Returns true if `room` may use the link.
    ///
    /// The unscoped room is subject to the same rule as any other id.
    #[inline]
    pub fn is_available_to_room(&self, room: RoomId) -> bool {
        self.rooms.admits(room.0)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} -> {} [{}]",
            self.id.0, self.source, self.destination, self.connection_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(device: u32, address: u32) -> EndpointInfo {
        EndpointInfo::new(device, 0, address)
    }

    #[test]
    fn availability_rules() {
        assert!(Availability::All.admits(42));
        assert!(Availability::only([1, 2]).admits(2));
        assert!(!Availability::only([1, 2]).admits(3));
        assert!(!Availability::only([]).admits(0));
        assert!(Availability::except([1]).admits(2));
        assert!(!Availability::except([1]).admits(1));
    }

    #[test]
    fn carries_requires_every_flag() {
        let conn = Connection::new(1, ep(1, 1), ep(2, 1), ConnectionType::AUDIO | ConnectionType::VIDEO);
        assert!(conn.carries(ConnectionType::VIDEO));
        assert!(conn.carries(ConnectionType::AUDIO | ConnectionType::VIDEO));
        assert!(!conn.carries(ConnectionType::USB));
        assert!(!conn.carries(ConnectionType::VIDEO | ConnectionType::USB));
        assert!(!conn.carries(ConnectionType::empty()));
    }

    #[test]
    fn trunk_reserved_for_one_room() {
        let trunk = Connection::new(9, ep(2, 5), ep(3, 1), ConnectionType::VIDEO)
            .with_rooms(Availability::only([7]))
            .with_source_devices(Availability::except([4]));
        assert!(trunk.is_available_to_room(RoomId(7)));
        assert!(!trunk.is_available_to_room(RoomId(8)));
        assert!(!trunk.is_available_to_room(RoomId::UNSCOPED));
        assert!(trunk.is_available_to_source_device(1));
        assert!(!trunk.is_available_to_source_device(4));
    }

    #[test]
    fn display() {
        let conn = Connection::new(3, ep(1, 2), ep(2, 1), ConnectionType::VIDEO);
        assert_eq!(conn.to_string(), "#3 1.0.2 -> 2.0.1 [Video]");
    }
}
