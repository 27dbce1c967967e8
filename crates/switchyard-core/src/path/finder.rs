//! Breadth-first path search over connection edges.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::connection::{Connection, ConnectionId, RoomId};
use crate::connection_type::ConnectionType;
use crate::endpoint::EndpointInfo;
use crate::graph::ConnectionGraph;
use crate::usage::ConnectionUsages;

use super::connection_path::ConnectionPath;
use super::query::PathBuilderQuery;

/// Finds routes through the connection graph.
///
/// Stateless apart from the injected graph and ledger. Searches read the
/// ledger one connection at a time and hold no lock across a traversal.
///
/// # Search
///
/// Each query is split per destination group and per flag. For one flag:
///
/// 1. Each source endpoint has at most one outgoing connection for the flag.
/// 2. If that connection already lands on a member of the destination group,
///    it is returned as a one-hop path. This check does not apply the
///    availability or ledger filters.
/// 3. Otherwise the connection must land on a midpoint and pass the filters;
///    the search then expands breadth-first over connections leaving the
///    device control each hop lands on. An edge is traversed only if it is
///    available to the original source device and to the requesting room,
///    and the ledger lets the room route the source over it.
/// 4. The first edge that lands on the destination group ends the search,
///    so the path is shortest by hop count. Ties go to the graph's
///    configuration order.
pub struct PathFinder {
    graph: Arc<ConnectionGraph>,
    usages: Arc<ConnectionUsages>,
}

impl PathFinder {
    /// Creates a finder over a graph snapshot and a ledger.
    pub fn new(graph: Arc<ConnectionGraph>, usages: Arc<ConnectionUsages>) -> Self {
        Self { graph, usages }
    }

    /// The graph this finder searches.
    pub fn graph(&self) -> &Arc<ConnectionGraph> {
        &self.graph
    }

    /// The ledger this finder consults.
    pub fn usages(&self) -> &Arc<ConnectionUsages> {
        &self.usages
    }

    /// Finds one path per (query, destination group, flag).
    ///
    /// Results follow query order, then group order, then flag bit order.
    /// Groups with no path for a flag are omitted.
    pub fn find_paths<'q>(&self, queries: impl IntoIterator<Item = &'q PathBuilderQuery>) -> Vec<ConnectionPath> {
        let mut paths = Vec::new();
        for query in queries {
            for group in &query.destinations {
                for flag in query.connection_type.singles() {
                    if let Some(path) = self.find_path(&query.sources, group, flag, query.room) {
                        paths.push(path);
                    }
                }
            }
        }
        paths
    }

    /// Returns true if every (query, destination group, flag) has a path.
    ///
    /// Stops at the first failure. A query with no requested flags, or with
    /// an empty destination group, is unsatisfiable.
    pub fn has_paths<'q>(&self, queries: impl IntoIterator<Item = &'q PathBuilderQuery>) -> bool {
        queries.into_iter().all(|query| {
            !query.connection_type.is_empty()
                && query.destinations.iter().all(|group| {
                    query
                        .connection_type
                        .singles()
                        .all(|flag| self.find_path(&query.sources, group, flag, query.room).is_some())
                })
        })
    }

    /// Shortest path for one destination group and one flag, trying sources
    /// in order.
    pub fn find_path(
        &self,
        sources: &[EndpointInfo],
        group: &[EndpointInfo],
        flag: ConnectionType,
        room: RoomId,
    ) -> Option<ConnectionPath> {
        if !flag.is_single() {
            return None;
        }
        let targets: HashSet<ConnectionId> = group
            .iter()
            .filter_map(|&member| self.graph.incoming(member, flag))
            .map(|c| c.id)
            .collect();
        if targets.is_empty() {
            return None;
        }

        let found = sources.iter().find_map(|&source| {
            let first = self.graph.outgoing(source, flag)?;
            if targets.contains(&first.id) {
                return Some(ConnectionPath::from_parts(vec![first.clone()], flag));
            }
            if !self.graph.is_midpoint(first.destination.device_control())
                || !self.is_usable(first, source, room, flag)
            {
                return None;
            }
            self.search(first, source, &targets, room, flag)
        });

        #[cfg(feature = "tracing")]
        match &found {
            Some(path) => tracing::debug!(%path, "path_search: found"),
            None => tracing::debug!(?sources, ?group, %flag, %room, "path_search: no path"),
        }
        found
    }

    /// Breadth-first search from a validated first hop.
    fn search(
        &self,
        first: &Connection,
        source: EndpointInfo,
        targets: &HashSet<ConnectionId>,
        room: RoomId,
        flag: ConnectionType,
    ) -> Option<ConnectionPath> {
        let mut parents: HashMap<ConnectionId, &Connection> = HashMap::new();
        let mut visited: HashSet<ConnectionId> = HashSet::from([first.id]);
        let mut queue = VecDeque::from([first]);

        while let Some(current) = queue.pop_front() {
            let node = current.destination.device_control();
            if !self.graph.is_midpoint(node) {
                continue;
            }
            for next in self.graph.connections_from_control(node, flag) {
                if visited.contains(&next.id) || !self.is_usable(next, source, room, flag) {
                    continue;
                }
                visited.insert(next.id);
                parents.insert(next.id, current);
                if targets.contains(&next.id) {
                    return Some(Self::unwind(next, &parents, flag));
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Walks parent links back from the final hop.
    fn unwind(last: &Connection, parents: &HashMap<ConnectionId, &Connection>, flag: ConnectionType) -> ConnectionPath {
        let mut hops = vec![last.clone()];
        let mut cursor = last.id;
        while let Some(parent) = parents.get(&cursor) {
            hops.push((*parent).clone());
            cursor = parent.id;
        }
        hops.reverse();
        ConnectionPath::from_parts(hops, flag)
    }

    fn is_usable(&self, connection: &Connection, source: EndpointInfo, room: RoomId, flag: ConnectionType) -> bool {
        connection.is_available_to_source_device(source.device)
            && connection.is_available_to_room(room)
            && self.usages.can_route(connection.id, source, room, flag)
    }
}
