//! Per-switcher runtime state cache.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use parking_lot::{Mutex, ReentrantMutex};

use crate::connection_type::ConnectionType;
use crate::endpoint::ConnectorInfo;

use super::error::CacheError;
use super::event::{Observer, ObserverList, SubscriptionId, SwitcherEvent};

/// Mutable routing and detection state, keyed per single flag.
#[derive(Debug, Default)]
struct CacheState {
    /// (output, flag) -> routed input.
    routes: HashMap<(u32, ConnectionType), u32>,
    /// (input, flag) -> outputs it currently feeds.
    routed_outputs: HashMap<(u32, ConnectionType), BTreeSet<u32>>,
    detected: HashSet<(u32, ConnectionType)>,
    active_inputs: HashSet<(u32, ConnectionType)>,
    transmitting: HashSet<(u32, ConnectionType)>,
}

/// Runtime state of one switching device control.
///
/// Device drivers push raw feedback in through the setters; the cache keeps
/// only real transitions and republishes them as [`SwitcherEvent`]s. All
/// state is stored per single flag. Multi-flag calls fan out over
/// [`ConnectionType::singles`].
///
/// # Thread Safety
///
/// State sits behind one mutex per cache. A second, reentrant dispatch lock
/// is held from the start of a mutation until its events have been
/// delivered, so concurrent writers are serialized and observers see events
/// in the order the transitions were applied. Observers run after the state
/// lock is released and may read the cache from inside the callback.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{ConnectionType, ConnectorInfo, SwitcherCache};
///
/// let io = |n| ConnectorInfo::new(n, ConnectionType::VIDEO);
/// let cache = SwitcherCache::new(vec![io(1), io(2)], vec![io(1)], true);
///
/// assert!(cache.set_input_for_output(1, Some(2), ConnectionType::VIDEO).unwrap());
/// assert_eq!(cache.input_for_output(1, ConnectionType::VIDEO).unwrap(), Some(2));
/// assert!(cache.is_input_active(2, ConnectionType::VIDEO).unwrap());
/// ```
pub struct SwitcherCache {
    inputs: BTreeMap<u32, ConnectorInfo>,
    outputs: BTreeMap<u32, ConnectorInfo>,
    supports_source_detection: bool,
    state: Mutex<CacheState>,
    dispatch: ReentrantMutex<()>,
    observers: ObserverList,
}

impl SwitcherCache {
    /// Creates a cache for a control with the given connectors.
    ///
    /// When the device cannot report signal detection, every input is seeded
    /// as detected for each flag it supports.
    pub fn new(
        inputs: impl IntoIterator<Item = ConnectorInfo>,
        outputs: impl IntoIterator<Item = ConnectorInfo>,
        supports_source_detection: bool,
    ) -> Self {
        let inputs: BTreeMap<u32, ConnectorInfo> =
            inputs.into_iter().map(|c| (c.address, c)).collect();
        let outputs = outputs.into_iter().map(|c| (c.address, c)).collect();
        let mut state = CacheState::default();
        if !supports_source_detection {
            state.detected = Self::all_detected(&inputs);
        }
        Self {
            inputs,
            outputs,
            supports_source_detection,
            state: Mutex::new(state),
            dispatch: ReentrantMutex::new(()),
            observers: ObserverList::default(),
        }
    }

    /// Returns true if the device reports real signal detection.
    pub fn supports_source_detection(&self) -> bool {
        self.supports_source_detection
    }

    /// Input connectors, ordered by address.
    pub fn inputs(&self) -> impl Iterator<Item = ConnectorInfo> + '_ {
        self.inputs.values().copied()
    }

    /// Output connectors, ordered by address.
    pub fn outputs(&self) -> impl Iterator<Item = ConnectorInfo> + '_ {
        self.outputs.values().copied()
    }

    /// Registers an observer for every future event.
    pub fn subscribe(&self, observer: impl Fn(&SwitcherEvent) + Send + Sync + 'static) -> SubscriptionId {
        let observer: Observer = std::sync::Arc::new(observer);
        self.observers.subscribe(observer)
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // --- Mutations ---

    /// Routes `input` (or nothing) to `output` for each flag in `flags`.
    ///
    /// For each flag whose routed input actually changes, raises
    /// [`SwitcherEvent::RouteChanged`], then [`SwitcherEvent::ActiveInputChanged`]
    /// for the previous input if it no longer feeds any output, then for the
    /// new input if it was idle. Returns true if anything changed.
    pub fn set_input_for_output(
        &self,
        output: u32,
        input: Option<u32>,
        flags: ConnectionType,
    ) -> Result<bool, CacheError> {
        supports(self.check_output(output)?, flags)?;
        if let Some(input) = input {
            supports(self.check_input(input)?, flags)?;
        }
        Ok(self.mutate(|state, events| {
            for flag in flags.singles() {
                let old = state.routes.get(&(output, flag)).copied();
                if old == input {
                    continue;
                }
                match input {
                    Some(new) => state.routes.insert((output, flag), new),
                    None => state.routes.remove(&(output, flag)),
                };
                events.push(SwitcherEvent::RouteChanged {
                    output,
                    old_input: old,
                    new_input: input,
                    flag,
                });
                if let Some(old) = old {
                    state.unlink(old, output, flag, events);
                }
                if let Some(new) = input {
                    state.link(new, output, flag, events);
                }
            }
        }))
    }

    /// Sets the signal-detected state of `input` for each flag in `flags`.
    pub fn set_source_detected_state(
        &self,
        input: u32,
        flags: ConnectionType,
        detected: bool,
    ) -> Result<bool, CacheError> {
        supports(self.check_input(input)?, flags)?;
        Ok(self.mutate(|state, events| {
            for flag in flags.singles() {
                if set_membership(&mut state.detected, (input, flag), detected) {
                    events.push(SwitcherEvent::SourceDetectionChanged {
                        input,
                        flag,
                        detected,
                    });
                }
            }
        }))
    }

    /// Sets the transmission state of `output` for each flag in `flags`.
    pub fn set_active_transmission_state(
        &self,
        output: u32,
        flags: ConnectionType,
        transmitting: bool,
    ) -> Result<bool, CacheError> {
        supports(self.check_output(output)?, flags)?;
        Ok(self.mutate(|state, events| {
            for flag in flags.singles() {
                if set_membership(&mut state.transmitting, (output, flag), transmitting) {
                    events.push(SwitcherEvent::ActiveTransmissionChanged {
                        output,
                        flag,
                        transmitting,
                    });
                }
            }
        }))
    }

    /// Empties every map, raising an event for each transition it causes.
    ///
    /// Used when the cache is rebuilt, e.g. after the device reconnects. A
    /// device without detection support is immediately reseeded to "all
    /// detected"; inputs already detected raise no event in that case.
    pub fn clear(&self) {
        let reseed = if self.supports_source_detection {
            HashSet::new()
        } else {
            Self::all_detected(&self.inputs)
        };
        self.mutate(|state, events| {
            let mut routes: Vec<_> = state.routes.drain().collect();
            routes.sort_unstable();
            for ((output, flag), input) in routes {
                events.push(SwitcherEvent::RouteChanged {
                    output,
                    old_input: Some(input),
                    new_input: None,
                    flag,
                });
            }
            state.routed_outputs.clear();

            for (input, flag) in sorted(state.active_inputs.drain()) {
                events.push(SwitcherEvent::ActiveInputChanged {
                    input,
                    flag,
                    active: false,
                });
            }

            let previous = std::mem::take(&mut state.detected);
            for (input, flag) in sorted(previous.difference(&reseed).copied()) {
                events.push(SwitcherEvent::SourceDetectionChanged {
                    input,
                    flag,
                    detected: false,
                });
            }
            for (input, flag) in sorted(reseed.difference(&previous).copied()) {
                events.push(SwitcherEvent::SourceDetectionChanged {
                    input,
                    flag,
                    detected: true,
                });
            }
            state.detected = reseed;

            for (output, flag) in sorted(state.transmitting.drain()) {
                events.push(SwitcherEvent::ActiveTransmissionChanged {
                    output,
                    flag,
                    transmitting: false,
                });
            }
        });

        #[cfg(feature = "tracing")]
        tracing::debug!("switcher_clear: cache reset");
    }

    // --- Queries ---

    /// The input routed to `output` for a single flag.
    pub fn input_for_output(&self, output: u32, flag: ConnectionType) -> Result<Option<u32>, CacheError> {
        self.check_output(output)?;
        let flag = flag.require_single()?;
        Ok(self.state.lock().routes.get(&(output, flag)).copied())
    }

    /// The input routed to `output` across `flags`.
    ///
    /// Flags with nothing routed are ignored. Returns the common input with
    /// the flags it is routed for, `None` if nothing is routed, or
    /// [`CacheError::Ambiguous`] if the flags route different inputs.
    pub fn input_connector_for_output(
        &self,
        output: u32,
        flags: ConnectionType,
    ) -> Result<Option<ConnectorInfo>, CacheError> {
        self.check_output(output)?;
        let state = self.state.lock();
        let mut found: Option<ConnectorInfo> = None;
        for flag in flags.singles() {
            let Some(&input) = state.routes.get(&(output, flag)) else {
                continue;
            };
            match &mut found {
                None => found = Some(ConnectorInfo::new(input, flag)),
                Some(info) if info.address == input => info.connection_type |= flag,
                Some(_) => return Err(CacheError::Ambiguous { output, flags }),
            }
        }
        Ok(found)
    }

    /// Outputs currently fed by `input` for any flag in `flags`.
    ///
    /// Each output appears once, carrying the subset of `flags` it is fed
    /// for, in address order. The iterator walks a snapshot taken at call
    /// time.
    pub fn outputs_for_input(
        &self,
        input: u32,
        flags: ConnectionType,
    ) -> Result<impl Iterator<Item = ConnectorInfo> + use<>, CacheError> {
        self.check_input(input)?;
        let mut merged: BTreeMap<u32, ConnectionType> = BTreeMap::new();
        {
            let state = self.state.lock();
            for flag in flags.singles() {
                for &output in state.routed_outputs.get(&(input, flag)).into_iter().flatten() {
                    *merged.entry(output).or_default() |= flag;
                }
            }
        }
        Ok(merged
            .into_iter()
            .map(|(address, connection_type)| ConnectorInfo::new(address, connection_type)))
    }

    /// Signal-detected state of `input` for a single flag.
    pub fn is_source_detected(&self, input: u32, flag: ConnectionType) -> Result<bool, CacheError> {
        self.check_input(input)?;
        let flag = flag.require_single()?;
        Ok(self.state.lock().detected.contains(&(input, flag)))
    }

    /// True while any output routes `input` for a single flag.
    pub fn is_input_active(&self, input: u32, flag: ConnectionType) -> Result<bool, CacheError> {
        self.check_input(input)?;
        let flag = flag.require_single()?;
        Ok(self.state.lock().active_inputs.contains(&(input, flag)))
    }

    /// Transmission state of `output` for a single flag.
    pub fn is_transmitting(&self, output: u32, flag: ConnectionType) -> Result<bool, CacheError> {
        self.check_output(output)?;
        let flag = flag.require_single()?;
        Ok(self.state.lock().transmitting.contains(&(output, flag)))
    }

    // --- Internal ---

    /// Applies `f` under the state lock, then delivers the collected events.
    fn mutate(&self, f: impl FnOnce(&mut CacheState, &mut Vec<SwitcherEvent>)) -> bool {
        let _dispatch = self.dispatch.lock();
        let mut events = Vec::new();
        {
            let mut state = self.state.lock();
            f(&mut state, &mut events);
        }
        #[cfg(feature = "tracing")]
        for event in &events {
            tracing::debug!(?event, "switcher_event");
        }
        self.observers.notify(&events);
        !events.is_empty()
    }

    fn check_input(&self, input: u32) -> Result<&ConnectorInfo, CacheError> {
        self.inputs.get(&input).ok_or(CacheError::UnknownInput(input))
    }

    fn check_output(&self, output: u32) -> Result<&ConnectorInfo, CacheError> {
        self.outputs.get(&output).ok_or(CacheError::UnknownOutput(output))
    }

    fn all_detected(inputs: &BTreeMap<u32, ConnectorInfo>) -> HashSet<(u32, ConnectionType)> {
        inputs
            .values()
            .flat_map(|c| c.connection_type.singles().map(move |flag| (c.address, flag)))
            .collect()
    }
}

impl CacheState {
    fn link(&mut self, input: u32, output: u32, flag: ConnectionType, events: &mut Vec<SwitcherEvent>) {
        let outputs = self.routed_outputs.entry((input, flag)).or_default();
        outputs.insert(output);
        if self.active_inputs.insert((input, flag)) {
            events.push(SwitcherEvent::ActiveInputChanged {
                input,
                flag,
                active: true,
            });
        }
    }

    fn unlink(&mut self, input: u32, output: u32, flag: ConnectionType, events: &mut Vec<SwitcherEvent>) {
        let now_idle = match self.routed_outputs.get_mut(&(input, flag)) {
            Some(outputs) => {
                outputs.remove(&output);
                outputs.is_empty()
            }
            None => true,
        };
        if now_idle {
            self.routed_outputs.remove(&(input, flag));
            if self.active_inputs.remove(&(input, flag)) {
                events.push(SwitcherEvent::ActiveInputChanged {
                    input,
                    flag,
                    active: false,
                });
            }
        }
    }
}

/// Inserts or removes `key`; returns true if membership changed.
fn set_membership<K: Eq + std::hash::Hash>(set: &mut HashSet<K>, key: K, member: bool) -> bool {
    if member { set.insert(key) } else { set.remove(&key) }
}

fn sorted<T: Ord>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_unstable();
    items
}

fn supports(connector: &ConnectorInfo, flags: ConnectionType) -> Result<(), CacheError> {
    if connector.connection_type.contains(flags) {
        Ok(())
    } else {
        Err(CacheError::UnsupportedFlags {
            address: connector.address,
            flags,
        })
    }
}
