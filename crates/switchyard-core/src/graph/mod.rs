//! Static connection graph of the building's signal matrix.
//!
//! The graph holds every configured [`Connection`](crate::Connection) and the
//! set of device controls that can route signal from an input to an output
//! (midpoints: matrix switchers, distribution amplifiers, extenders). It is
//! built once per configuration and then only read. Reload is done by building
//! a new graph and sweeping the usage ledger with
//! [`ConnectionUsages::remove_invalid`](crate::ConnectionUsages::remove_invalid).
//!
//! # Invariants
//!
//! Checked by [`GraphBuilder::build`]:
//!
//! - connection ids are unique
//! - every connection carries at least one flag
//! - no connection starts and ends at the same endpoint
//! - an endpoint has at most one outgoing and at most one incoming connection
//!   per single flag
//!
//! # Example
//!
//! ```rust
//! use switchyard_core::{Connection, ConnectionGraph, ConnectionType, DeviceControlInfo, EndpointInfo};
//!
//! let graph = ConnectionGraph::builder()
//!     .midpoint(DeviceControlInfo::new(2, 0))
//!     .connection(Connection::new(
//!         1,
//!         EndpointInfo::new(1, 0, 1),
//!         EndpointInfo::new(2, 0, 1),
//!         ConnectionType::VIDEO,
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let hop = graph.outgoing(EndpointInfo::new(1, 0, 1), ConnectionType::VIDEO);
//! assert_eq!(hop.map(|c| c.id.0), Some(1));
//! ```

mod connections;
mod error;

pub use connections::{ConnectionGraph, GraphBuilder};
pub use error::GraphError;
