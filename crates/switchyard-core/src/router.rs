//! Executing a found path: switch every hop, then claim every connection.
//!
//! The usage ledger has no multi-connection transaction. [`PathRouter`]
//! supplies the caller-side sequence: check the ledger, send each
//! [`RouteOperation`] to the owning device's driver, then claim hop by hop
//! and undo this call's earlier claims if a later one loses a race. Drivers are never
//! retried; their result is the only feedback acted on.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::connection::{ConnectionId, RoomId};
use crate::endpoint::DeviceControlInfo;
use crate::path::{ConnectionPath, RouteOperation};
use crate::switcher::SwitcherCache;
use crate::usage::{ClaimReceipt, ConnectionUsageInfo, ConnectionUsages};

/// Failure reported by a device driver for one route operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("driver for {control} failed: {message}")]
pub struct DriverError {
    /// Device control the operation was sent to.
    pub control: DeviceControlInfo,
    /// Driver-supplied reason.
    pub message: String,
}

impl DriverError {
    /// Creates a driver error.
    pub fn new(control: DeviceControlInfo, message: impl Into<String>) -> Self {
        Self {
            control,
            message: message.into(),
        }
    }
}

/// Errors from [`PathRouter::route`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Another room relies on a connection for a different source.
    #[error("connection {0} is in use by another room")]
    Contended(ConnectionId),

    /// A device rejected a route operation.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// The device-driver side of a route command.
pub trait RouteDriver: Send + Sync {
    /// Routes `operation.input` to `operation.output` on `operation.control`.
    fn route(&self, operation: &RouteOperation) -> Result<(), DriverError>;
}

impl<T: RouteDriver + ?Sized> RouteDriver for Arc<T> {
    fn route(&self, operation: &RouteOperation) -> Result<(), DriverError> {
        (**self).route(operation)
    }
}

/// Driver that applies route operations straight to switcher caches.
///
/// Stands in for hardware in simulations and tests: a route command becomes
/// the feedback a real device would report.
#[derive(Default)]
pub struct CacheDriver {
    switchers: HashMap<DeviceControlInfo, Arc<SwitcherCache>>,
}

impl CacheDriver {
    /// Creates a driver with no switchers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the cache for a device control.
    pub fn with_switcher(mut self, control: DeviceControlInfo, cache: Arc<SwitcherCache>) -> Self {
        self.switchers.insert(control, cache);
        self
    }

    /// The cache registered for `control`.
    pub fn switcher(&self, control: DeviceControlInfo) -> Option<&Arc<SwitcherCache>> {
        self.switchers.get(&control)
    }
}

impl RouteDriver for CacheDriver {
    fn route(&self, operation: &RouteOperation) -> Result<(), DriverError> {
        let cache = self
            .switchers
            .get(&operation.control)
            .ok_or_else(|| DriverError::new(operation.control, "no switcher registered"))?;
        cache
            .set_input_for_output(operation.output, Some(operation.input), operation.connection_type)
            .map(|_| ())
            .map_err(|e| DriverError::new(operation.control, e.to_string()))
    }
}

/// Routes paths through a driver and records claims in the ledger.
pub struct PathRouter<D> {
    usages: Arc<ConnectionUsages>,
    driver: D,
}

impl<D: RouteDriver> PathRouter<D> {
    /// Creates a router over a ledger and a driver.
    pub fn new(usages: Arc<ConnectionUsages>, driver: D) -> Self {
        Self { usages, driver }
    }

    /// The driver route operations are sent to.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The ledger claims are recorded in.
    pub fn usages(&self) -> &Arc<ConnectionUsages> {
        &self.usages
    }

    /// Switches every midpoint on `path` and claims each connection for `room`.
    ///
    /// Nothing is sent to a driver if any connection is contended. A driver
    /// failure stops the sequence; switches already made are left in place
    /// and nothing is claimed. If a claim loses a race after switching, the
    /// claims made by this call are undone and [`RouteError::Contended`] is
    /// returned. Claims other callers added in the meantime are kept.
    pub fn route(&self, path: &ConnectionPath, room: RoomId) -> Result<(), RouteError> {
        let source = path.source();
        let flag = path.connection_type();

        if let Some(blocked) = path
            .connection_ids()
            .find(|&id| !self.usages.can_route(id, source, room, flag))
        {
            #[cfg(feature = "tracing")]
            tracing::warn!(connection = %blocked, %room, "path_route: contended before switching");
            return Err(RouteError::Contended(blocked));
        }

        for operation in path.route_operations() {
            if let Err(e) = self.driver.route(&operation) {
                #[cfg(feature = "tracing")]
                tracing::warn!(%operation, error = %e, "path_route: driver failed");
                return Err(e.into());
            }
        }

        let mut claimed: Vec<(Arc<ConnectionUsageInfo>, ClaimReceipt)> = Vec::with_capacity(path.len());
        for id in path.connection_ids() {
            let entry = self.usages.entry(id);
            let Some(receipt) = entry.reserve(source, room, flag) else {
                #[cfg(feature = "tracing")]
                tracing::warn!(connection = %id, %room, rolled_back = claimed.len(), "path_route: lost claim race");
                for (entry, receipt) in claimed.into_iter().rev() {
                    entry.undo(receipt);
                }
                return Err(RouteError::Contended(id));
            };
            claimed.push((entry, receipt));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%path, %room, "path_route: routed");
        Ok(())
    }

    /// Releases `room`'s claims on every connection of `path`.
    ///
    /// Returns the number of connections whose claims changed. The switches
    /// themselves are left as they are.
    pub fn release(&self, path: &ConnectionPath, room: RoomId) -> usize {
        let flag = path.connection_type();
        path.connection_ids()
            .filter(|&id| self.usages.release_room(id, room, flag))
            .count()
    }
}
