//! Endpoint identity types.
//!
//! An [`EndpointInfo`] names one physical connector: the device, the control
//! on that device, and the connector address on the control. Two endpoints on
//! the same device control share a [`DeviceControlInfo`], which is the node a
//! switcher lives at.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::connection_type::ConnectionType;

/// A device control: the routing node that owns a set of connectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceControlInfo {
    /// Device identifier.
    pub device: u32,
    /// Control identifier on the device.
    pub control: u32,
}

impl DeviceControlInfo {
    /// Creates a device control identity.
    #[inline]
    pub const fn new(device: u32, control: u32) -> Self {
        Self { device, control }
    }

    /// Returns the endpoint at `address` on this control.
    #[inline]
    pub const fn endpoint(self, address: u32) -> EndpointInfo {
        EndpointInfo::new(self.device, self.control, address)
    }
}

/// One addressable connector on a device control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointInfo {
    /// Device identifier.
    pub device: u32,
    /// Control identifier on the device.
    pub control: u32,
    /// Connector address on the control.
    pub address: u32,
}

impl EndpointInfo {
    /// Creates an endpoint identity.
    #[inline]
    pub const fn new(device: u32, control: u32, address: u32) -> Self {
        Self {
            device,
            control,
            address,
        }
    }

    /// The device control this endpoint belongs to.
    #[inline]
    pub const fn device_control(self) -> DeviceControlInfo {
        DeviceControlInfo::new(self.device, self.control)
    }
}

/// An input or output connector on a switcher, with the signal types it supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectorInfo {
    /// Connector address.
    pub address: u32,
    /// Signal types available on the connector.
    pub connection_type: ConnectionType,
}

impl ConnectorInfo {
    /// Creates a connector description.
    #[inline]
    pub const fn new(address: u32, connection_type: ConnectionType) -> Self {
        Self {
            address,
            connection_type,
        }
    }
}

/// Error parsing an endpoint or device control from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid endpoint '{input}': expected {expected}")]
pub struct ParseEndpointError {
    input: String,
    expected: &'static str,
}

fn parse_parts<const N: usize>(s: &str, expected: &'static str) -> Result<[u32; N], ParseEndpointError> {
    let err = || ParseEndpointError {
        input: s.to_string(),
        expected,
    };
    let mut out = [0u32; N];
    let mut parts = s.trim().split('.');
    for slot in &mut out {
        *slot = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(err)?;
    }
    if parts.next().is_some() {
        return Err(err());
    }
    Ok(out)
}

impl FromStr for EndpointInfo {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [device, control, address] = parse_parts::<3>(s, "device.control.address")?;
        Ok(Self::new(device, control, address))
    }
}

impl FromStr for DeviceControlInfo {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [device, control] = parse_parts::<2>(s, "device.control")?;
        Ok(Self::new(device, control))
    }
}

impl fmt::Display for EndpointInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.device, self.control, self.address)
    }
}

impl fmt::Display for DeviceControlInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.device, self.control)
    }
}
