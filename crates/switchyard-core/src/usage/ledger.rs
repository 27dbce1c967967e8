//! Claim ledger across every connection in the graph.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::connection::{ConnectionId, RoomId};
use crate::connection_type::ConnectionType;
use crate::endpoint::EndpointInfo;
use crate::graph::ConnectionGraph;

use super::info::ConnectionUsageInfo;

/// Collection of [`ConnectionUsageInfo`] entries keyed by connection id.
///
/// Entries are created lazily on first claim. The map lock is only held to
/// find or insert an entry; claim state is guarded by each entry's own lock,
/// so unrelated connections never contend. A multi-connection reservation is
/// not atomic as a whole: callers claim hop by hop and roll back themselves
/// (see [`PathRouter`](crate::PathRouter)).
#[derive(Debug, Default)]
pub struct ConnectionUsages {
    entries: RwLock<HashMap<ConnectionId, Arc<ConnectionUsageInfo>>>,
}

impl ConnectionUsages {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `connection`, creating it if needed.
    pub fn entry(&self, connection: ConnectionId) -> Arc<ConnectionUsageInfo> {
        if let Some(entry) = self.entries.read().get(&connection) {
            return Arc::clone(entry);
        }
        Arc::clone(
            self.entries
                .write()
                .entry(connection)
                .or_insert_with(|| Arc::new(ConnectionUsageInfo::new(connection))),
        )
    }

    /// Returns the entry for `connection` if one exists.
    pub fn get(&self, connection: ConnectionId) -> Option<Arc<ConnectionUsageInfo>> {
        self.entries.read().get(&connection).cloned()
    }

    /// See [`ConnectionUsageInfo::claim`].
    pub fn claim(&self, connection: ConnectionId, source: EndpointInfo, room: RoomId, flags: ConnectionType) {
        self.entry(connection).claim(source, room, flags);
        #[cfg(feature = "tracing")]
        tracing::debug!(%connection, %source, %room, %flags, "usage_claim");
    }

    /// See [`ConnectionUsageInfo::try_claim`].
    pub fn try_claim(
        &self,
        connection: ConnectionId,
        source: EndpointInfo,
        room: RoomId,
        flags: ConnectionType,
    ) -> bool {
        self.entry(connection).try_claim(source, room, flags)
    }

    /// See [`ConnectionUsageInfo::can_route`]. A connection nobody has
    /// claimed is routable.
    pub fn can_route(
        &self,
        connection: ConnectionId,
        source: EndpointInfo,
        room: RoomId,
        flags: ConnectionType,
    ) -> bool {
        self.get(connection)
            .is_none_or(|entry| entry.can_route(source, room, flags))
    }

    /// Drops every claim on `connection` for `flags`.
    pub fn clear(&self, connection: ConnectionId, flags: ConnectionType) {
        if let Some(entry) = self.get(connection) {
            entry.clear(flags);
        }
    }

    /// Removes `room` from `connection`'s claim sets.
    pub fn release_room(&self, connection: ConnectionId, room: RoomId, flags: ConnectionType) -> bool {
        self.get(connection)
            .is_some_and(|entry| entry.release_room(room, flags))
    }

    /// Removes `room` from every entry. Returns the number of entries changed.
    pub fn release_room_everywhere(&self, room: RoomId, flags: ConnectionType) -> usize {
        self.snapshot_entries()
            .iter()
            .filter(|entry| entry.release_room(room, flags))
            .count()
    }

    /// Drops entries whose connection is not in `graph`.
    ///
    /// Run after a configuration reload. Returns the number of entries dropped.
    pub fn remove_invalid(&self, graph: &ConnectionGraph) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|id, _| graph.contains(*id));
        let removed = before - entries.len();
        #[cfg(feature = "tracing")]
        if removed > 0 {
            tracing::debug!(removed, "usage_sweep: dropped entries for removed connections");
        }
        removed
    }

    /// Number of entries, claimed or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Ids of every entry, sorted.
    pub fn connections(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.entries.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn snapshot_entries(&self) -> Vec<Arc<ConnectionUsageInfo>> {
        self.entries.read().values().cloned().collect()
    }
}
