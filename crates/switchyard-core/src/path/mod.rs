//! Multi-hop route search.
//!
//! A [`PathBuilderQuery`] names equivalent source endpoints, one or more
//! groups of equivalent destination endpoints, the requested flags and the
//! requesting room. The [`PathFinder`] answers it with one
//! [`ConnectionPath`] per reachable (destination group, flag) pair, or with
//! a plain existence check via [`PathFinder::has_paths`].
//!
//! Search runs over connections (edges), not devices (nodes): whether a hop
//! is usable depends on the physical link taken, so two links into the same
//! switcher can differ in availability.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard_core::{
//!     Connection, ConnectionGraph, ConnectionType, ConnectionUsages, DeviceControlInfo,
//!     EndpointInfo, PathBuilder, PathFinder,
//! };
//!
//! let ep = |d, a| EndpointInfo::new(d, 0, a);
//! let graph = ConnectionGraph::builder()
//!     .midpoint(DeviceControlInfo::new(2, 0))
//!     .connection(Connection::new(1, ep(1, 1), ep(2, 1), ConnectionType::VIDEO))
//!     .connection(Connection::new(2, ep(2, 4), ep(3, 1), ConnectionType::VIDEO))
//!     .build()
//!     .unwrap();
//! let finder = PathFinder::new(Arc::new(graph), Arc::new(ConnectionUsages::new()));
//!
//! let query = PathBuilder::new()
//!     .source(ep(1, 1))
//!     .destination(ep(3, 1))
//!     .of_type(ConnectionType::VIDEO)
//!     .build();
//! let paths = finder.find_paths([&query]);
//! assert_eq!(paths[0].len(), 2);
//! assert_eq!(paths[0].route_operations()[0].output, 4);
//! ```

mod connection_path;
mod finder;
mod query;

pub use connection_path::{ConnectionPath, PathError, RouteOperation};
pub use finder::PathFinder;
pub use query::{PathBuilder, PathBuilderQuery};
