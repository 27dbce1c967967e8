//! Errors raised while building a connection graph.

use thiserror::Error;

use crate::connection::ConnectionId;
use crate::connection_type::ConnectionType;
use crate::endpoint::EndpointInfo;

/// Structural errors in a set of connections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two connections share an id.
    #[error("duplicate connection id {0}")]
    DuplicateId(ConnectionId),

    /// A connection carries no signal types.
    #[error("connection {0} has no connection type")]
    EmptyConnectionType(ConnectionId),

    /// A connection starts and ends at the same endpoint.
    #[error("connection {id} loops back to {endpoint}")]
    SelfLoop {
        /// The offending connection.
        id: ConnectionId,
        /// The endpoint at both ends.
        endpoint: EndpointInfo,
    },

    /// Two connections leave the same endpoint for the same flag.
    #[error("endpoint {endpoint} has two outgoing {flag} connections ({first} and {second})")]
    DuplicateOutgoing {
        /// Shared source endpoint.
        endpoint: EndpointInfo,
        /// Flag both connections carry.
        flag: ConnectionType,
        /// Connection registered first.
        first: ConnectionId,
        /// Connection that collided.
        second: ConnectionId,
    },

    /// Two connections arrive at the same endpoint for the same flag.
    #[error("endpoint {endpoint} has two incoming {flag} connections ({first} and {second})")]
    DuplicateIncoming {
        /// Shared destination endpoint.
        endpoint: EndpointInfo,
        /// Flag both connections carry.
        flag: ConnectionType,
        /// Connection registered first.
        first: ConnectionId,
        /// Connection that collided.
        second: ConnectionId,
    },
}
