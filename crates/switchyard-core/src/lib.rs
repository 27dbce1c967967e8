//! Switchyard Core - routing-graph engine for AV signal matrices
//!
//! This crate models a building's audio/video/USB cabling as a directed graph
//! of connections between device connectors, tracks what each switching
//! device is currently doing, arbitrates shared use of connections between
//! rooms, and finds multi-hop routes from sources to destinations.
//!
//! # Core Abstractions
//!
//! ## Addressing
//!
//! - [`ConnectionType`] - Bitflag set of signal types (audio, video, USB)
//! - [`EndpointInfo`] - One connector: device, control, address
//! - [`DeviceControlInfo`] - The switchable unit of a device
//! - [`ConnectorInfo`] - An address on a control and the flags it carries
//!
//! ## Connection Graph
//!
//! - [`Connection`] - A physical link with availability rules
//! - [`ConnectionGraph`] - Validated, indexed, read-only set of connections
//! - [`GraphBuilder`] - Collects connections and midpoints, then validates
//!
//! ## Runtime State
//!
//! - [`SwitcherCache`] - Per-switcher route, detection and transmission state
//! - [`SwitcherEvent`] - Transitions published to observers
//! - [`ConnectionUsages`] - Per-connection claims by source and room
//!
//! ## Routing
//!
//! - [`PathBuilder`] / [`PathBuilderQuery`] - Route requests
//! - [`PathFinder`] - Breadth-first search honouring availability and claims
//! - [`ConnectionPath`] - One hop sequence and its [`RouteOperation`]s
//! - [`PathRouter`] - Sends route operations to a [`RouteDriver`] and claims
//!
//! # Features
//!
//! - `tracing` - Emit `tracing` events for graph builds, claims, searches and
//!   routes. Off by default.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard_core::{
//!     CacheDriver, Connection, ConnectionGraph, ConnectionType, ConnectionUsages, ConnectorInfo,
//!     DeviceControlInfo, EndpointInfo, PathBuilder, PathFinder, PathRouter, RoomId, SwitcherCache,
//! };
//!
//! let ep = |d, a| EndpointInfo::new(d, 0, a);
//! let matrix = DeviceControlInfo::new(2, 0);
//! let graph = Arc::new(
//!     ConnectionGraph::builder()
//!         .midpoint(matrix)
//!         .connection(Connection::new(1, ep(1, 1), ep(2, 1), ConnectionType::VIDEO))
//!         .connection(Connection::new(2, ep(2, 3), ep(3, 1), ConnectionType::VIDEO))
//!         .build()
//!         .unwrap(),
//! );
//! let usages = Arc::new(ConnectionUsages::new());
//!
//! let io = |n| ConnectorInfo::new(n, ConnectionType::VIDEO);
//! let cache = Arc::new(SwitcherCache::new((1..=4).map(io), (1..=4).map(io), false));
//! let router = PathRouter::new(
//!     Arc::clone(&usages),
//!     CacheDriver::new().with_switcher(matrix, Arc::clone(&cache)),
//! );
//!
//! let query = PathBuilder::new()
//!     .source(ep(1, 1))
//!     .destination(ep(3, 1))
//!     .of_type(ConnectionType::VIDEO)
//!     .in_room(RoomId(1))
//!     .build();
//! let finder = PathFinder::new(graph, Arc::clone(&usages));
//! for path in finder.find_paths([&query]) {
//!     router.route(&path, RoomId(1)).unwrap();
//! }
//!
//! assert_eq!(cache.input_for_output(3, ConnectionType::VIDEO).unwrap(), Some(1));
//! ```

pub mod connection;
pub mod connection_type;
pub mod endpoint;
pub mod graph;
pub mod path;
pub mod router;
pub mod switcher;
pub mod usage;

pub use connection::{Availability, Connection, ConnectionId, RoomId};
pub use connection_type::{ConnectionType, ConnectionTypeError};
pub use endpoint::{ConnectorInfo, DeviceControlInfo, EndpointInfo, ParseEndpointError};
pub use graph::{ConnectionGraph, GraphBuilder, GraphError};
pub use path::{ConnectionPath, PathBuilder, PathBuilderQuery, PathError, PathFinder, RouteOperation};
pub use router::{CacheDriver, DriverError, PathRouter, RouteDriver, RouteError};
pub use switcher::{CacheError, Observer, SubscriptionId, SwitcherCache, SwitcherEvent};
pub use usage::{ClaimReceipt, ConnectionUsageInfo, ConnectionUsages};
