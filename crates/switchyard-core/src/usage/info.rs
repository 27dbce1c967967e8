//! Claim state for a single connection.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use crate::connection::{ConnectionId, RoomId};
use crate::connection_type::{ConnectionType, ConnectionTypeError};
use crate::endpoint::EndpointInfo;

/// Who is using a connection for one flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FlagUsage {
    /// Source currently fed through the connection.
    source: Option<EndpointInfo>,
    /// Rooms relying on that source.
    rooms: BTreeSet<RoomId>,
}

impl FlagUsage {
    fn admits(&self, source: EndpointInfo, room: RoomId) -> bool {
        self.source == Some(source)
            || self.rooms.is_empty()
            || (self.rooms.len() == 1 && self.rooms.contains(&room))
    }
}

/// What one claim changed for a single flag.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClaimChange {
    /// The room joined a set that already carried the source.
    JoinedRoom,
    /// The claim recorded its source over the previous usage.
    Replaced(Option<FlagUsage>),
}

/// Record of the changes made by [`ConnectionUsageInfo::reserve`].
///
/// Passing it to [`ConnectionUsageInfo::undo`] reverts only those changes,
/// leaving claims other callers made afterwards in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    source: EndpointInfo,
    room: RoomId,
    changes: Vec<(ConnectionType, ClaimChange)>,
}

impl ClaimReceipt {
    /// Returns true if the claim changed nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Claims on one connection, per single flag.
///
/// Several rooms may share a connection as long as it keeps carrying the
/// same source. Claiming with a different source evicts every room that
/// relied on the old one. All operations take the entry's own lock; there is
/// no consistency across entries.
#[derive(Debug)]
pub struct ConnectionUsageInfo {
    connection: ConnectionId,
    usages: Mutex<BTreeMap<ConnectionType, FlagUsage>>,
}

impl ConnectionUsageInfo {
    /// Creates an unclaimed entry for `connection`.
    pub fn new(connection: ConnectionId) -> Self {
        Self {
            connection,
            usages: Mutex::new(BTreeMap::new()),
        }
    }

    /// The connection this entry tracks.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Records that `room` uses the connection to carry `source`.
    ///
    /// For each flag whose recorded source differs, prior room claims are
    /// dropped before the new source is recorded. [`RoomId::UNSCOPED`]
    /// records the source without joining any room set. Claims always
    /// succeed; see [`try_claim`](Self::try_claim) for an arbitrated claim.
    pub fn claim(&self, source: EndpointInfo, room: RoomId, flags: ConnectionType) {
        let mut usages = self.usages.lock();
        self.claim_locked(&mut usages, source, room, flags);
    }

    /// Claims only if [`can_route`](Self::can_route) holds, atomically.
    pub fn try_claim(&self, source: EndpointInfo, room: RoomId, flags: ConnectionType) -> bool {
        self.reserve(source, room, flags).is_some()
    }

    /// Like [`try_claim`](Self::try_claim), but returns a receipt of the
    /// changes so they can be reverted with [`undo`](Self::undo).
    pub fn reserve(&self, source: EndpointInfo, room: RoomId, flags: ConnectionType) -> Option<ClaimReceipt> {
        let mut usages = self.usages.lock();
        if !flags.singles().all(|flag| {
            usages
                .get(&flag)
                .is_none_or(|usage| usage.admits(source, room))
        }) {
            return None;
        }
        let changes = flags
            .singles()
            .filter_map(|flag| {
                let previous = usages.get(&flag);
                if previous.is_some_and(|usage| usage.source == Some(source)) {
                    let joined = !room.is_unscoped()
                        && previous.is_some_and(|usage| !usage.rooms.contains(&room));
                    joined.then_some((flag, ClaimChange::JoinedRoom))
                } else {
                    Some((flag, ClaimChange::Replaced(previous.cloned())))
                }
            })
            .collect();
        self.claim_locked(&mut usages, source, room, flags);
        Some(ClaimReceipt {
            source,
            room,
            changes,
        })
    }

    /// Reverts the changes recorded in `receipt`.
    ///
    /// A flag whose source was replaced gets its previous usage back only if
    /// nobody claimed it since; otherwise just the receipt's room is dropped.
    /// Flags that moved to another source in the meantime are left alone.
    /// Returns true if anything changed.
    pub fn undo(&self, receipt: ClaimReceipt) -> bool {
        let ClaimReceipt {
            source,
            room,
            changes,
        } = receipt;
        let left_behind = FlagUsage {
            source: Some(source),
            rooms: if room.is_unscoped() {
                BTreeSet::new()
            } else {
                BTreeSet::from([room])
            },
        };

        let mut usages = self.usages.lock();
        let mut changed = false;
        for (flag, change) in changes {
            let Some(usage) = usages.get_mut(&flag) else {
                continue;
            };
            if usage.source != Some(source) {
                continue;
            }
            match change {
                ClaimChange::Replaced(previous) if *usage == left_behind => {
                    match previous {
                        Some(previous) => *usage = previous,
                        None => {
                            usages.remove(&flag);
                        }
                    }
                    changed = true;
                }
                ClaimChange::Replaced(_) | ClaimChange::JoinedRoom => {
                    changed |= usage.rooms.remove(&room);
                }
            }
        }
        changed
    }

    /// Returns true if `room` may route `source` over the connection.
    ///
    /// Holds when, for every flag, the connection already carries `source`,
    /// or no room relies on it, or `room` is its only user. An empty `flags`
    /// is vacuously routable.
    pub fn can_route(&self, source: EndpointInfo, room: RoomId, flags: ConnectionType) -> bool {
        let usages = self.usages.lock();
        flags.singles().all(|flag| {
            usages
                .get(&flag)
                .is_none_or(|usage| usage.admits(source, room))
        })
    }

    /// Drops every claim for the given flags.
    pub fn clear(&self, flags: ConnectionType) {
        let mut usages = self.usages.lock();
        for flag in flags.singles() {
            usages.remove(&flag);
        }
    }

    /// Removes `room` from the claim sets for `flags`.
    ///
    /// Once no room is left for a flag, its recorded source is forgotten.
    /// Releasing [`RoomId::UNSCOPED`] forgets sources that no room relies on.
    /// Returns true if anything changed.
    pub fn release_room(&self, room: RoomId, flags: ConnectionType) -> bool {
        let mut usages = self.usages.lock();
        let mut changed = false;
        for flag in flags.singles() {
            let Some(usage) = usages.get_mut(&flag) else {
                continue;
            };
            let removed = usage.rooms.remove(&room);
            if usage.rooms.is_empty() && (removed || room.is_unscoped()) {
                usages.remove(&flag);
                changed = true;
            } else {
                changed |= removed;
            }
        }
        changed
    }

    /// Source recorded for a single flag.
    pub fn source(&self, flag: ConnectionType) -> Result<Option<EndpointInfo>, ConnectionTypeError> {
        let flag = flag.require_single()?;
        Ok(self.usages.lock().get(&flag).and_then(|u| u.source))
    }

    /// Rooms claiming a single flag, in id order.
    pub fn rooms(&self, flag: ConnectionType) -> Result<Vec<RoomId>, ConnectionTypeError> {
        let flag = flag.require_single()?;
        Ok(self
            .usages
            .lock()
            .get(&flag)
            .map(|u| u.rooms.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Returns true if no flag has a recorded source.
    pub fn is_empty(&self) -> bool {
        self.usages.lock().is_empty()
    }

    fn claim_locked(
        &self,
        usages: &mut BTreeMap<ConnectionType, FlagUsage>,
        source: EndpointInfo,
        room: RoomId,
        flags: ConnectionType,
    ) {
        for flag in flags.singles() {
            let usage = usages.entry(flag).or_default();
            if usage.source != Some(source) {
                #[cfg(feature = "tracing")]
                if !usage.rooms.is_empty() {
                    tracing::debug!(
                        connection = %self.connection,
                        %flag,
                        evicted = ?usage.rooms,
                        "usage_claim: source changed, evicting rooms"
                    );
                }
                usage.rooms.clear();
                usage.source = Some(source);
            }
            if !room.is_unscoped() {
                usage.rooms.insert(room);
            }
        }
    }
}
