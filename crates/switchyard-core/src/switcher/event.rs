//! Switcher change events and observer registration.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::connection_type::ConnectionType;

/// A state transition in a [`SwitcherCache`](super::SwitcherCache).
///
/// Events are always raised for a single flag and only for real
/// transitions. Setting a value to what it already is raises nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitcherEvent {
    /// The input feeding `output` changed.
    RouteChanged {
        /// Output address.
        output: u32,
        /// Input routed before the change, if any.
        old_input: Option<u32>,
        /// Input routed after the change, if any.
        new_input: Option<u32>,
        /// Flag the route applies to.
        flag: ConnectionType,
    },
    /// Signal detection on an input changed.
    SourceDetectionChanged {
        /// Input address.
        input: u32,
        /// Flag the detection applies to.
        flag: ConnectionType,
        /// New detection state.
        detected: bool,
    },
    /// An input started or stopped feeding at least one output.
    ActiveInputChanged {
        /// Input address.
        input: u32,
        /// Flag the activity applies to.
        flag: ConnectionType,
        /// True while any output routes the input.
        active: bool,
    },
    /// An output started or stopped transmitting.
    ActiveTransmissionChanged {
        /// Output address.
        output: u32,
        /// Flag the transmission applies to.
        flag: ConnectionType,
        /// New transmission state.
        transmitting: bool,
    },
}

impl SwitcherEvent {
    /// The single flag this event applies to.
    pub fn flag(&self) -> ConnectionType {
        match *self {
            SwitcherEvent::RouteChanged { flag, .. }
            | SwitcherEvent::SourceDetectionChanged { flag, .. }
            | SwitcherEvent::ActiveInputChanged { flag, .. }
            | SwitcherEvent::ActiveTransmissionChanged { flag, .. } => flag,
        }
    }
}

/// Handle returned by [`subscribe`](super::SwitcherCache::subscribe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked for every event.
pub type Observer = Arc<dyn Fn(&SwitcherEvent) + Send + Sync>;

/// Observers registered on one cache. Read-only consumers of its events.
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriptionId, Observer)>>,
}

impl ObserverList {
    pub fn subscribe(&self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, observer));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Delivers `events` in order to every observer.
    ///
    /// The list is copied first so callbacks may subscribe or unsubscribe.
    pub fn notify(&self, events: &[SwitcherEvent]) {
        if events.is_empty() {
            return;
        }
        let observers: Vec<Observer> = self
            .entries
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for event in events {
            for observer in &observers {
                observer(event);
            }
        }
    }
}
