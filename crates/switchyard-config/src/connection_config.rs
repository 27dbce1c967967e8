//! Connection and midpoint configuration types.

use serde::{Deserialize, Serialize};
use switchyard_core::{Availability, Connection, DeviceControlInfo};

/// A routing-capable device control (matrix switcher, distribution
/// amplifier, extender).
///
/// # Example
///
/// ```rust
/// use switchyard_config::DeviceControlConfig;
///
/// let config = DeviceControlConfig::new(20).with_name("Main matrix");
/// assert_eq!(config.control, 0);
/// assert_eq!(config.device_control().to_string(), "20.0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceControlConfig {
    /// Device id.
    pub device: u32,

    /// Control index on the device (defaults to 0).
    #[serde(default)]
    pub control: u32,

    /// Optional label shown by tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DeviceControlConfig {
    /// Create a midpoint entry for control 0 of `device`.
    pub fn new(device: u32) -> Self {
        Self {
            device,
            control: 0,
            name: None,
        }
    }

    /// Set the control index.
    pub fn with_control(mut self, control: u32) -> Self {
        self.control = control;
        self
    }

    /// Set the label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The device control this entry names.
    pub fn device_control(&self) -> DeviceControlInfo {
        DeviceControlInfo::new(self.device, self.control)
    }
}

impl From<DeviceControlInfo> for DeviceControlConfig {
    fn from(control: DeviceControlInfo) -> Self {
        Self::new(control.device).with_control(control.control)
    }
}

/// How an availability list is applied.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityMode {
    /// Every id is admitted; `ids` is ignored.
    #[default]
    All,
    /// Only the listed ids are admitted.
    Only,
    /// Every id except the listed ones is admitted.
    Except,
}

/// Availability restriction on a connection, by source device or by room.
///
/// Written inline in TOML:
///
/// ```toml
/// rooms = { mode = "only", ids = [1, 2] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityConfig {
    /// How `ids` is applied.
    #[serde(default)]
    pub mode: AvailabilityMode,

    /// Device or room ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u32>,
}

impl AvailabilityConfig {
    /// Admit only `ids`.
    pub fn only(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            mode: AvailabilityMode::Only,
            ids: ids.into_iter().collect(),
        }
    }

    /// Admit everything except `ids`.
    pub fn except(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            mode: AvailabilityMode::Except,
            ids: ids.into_iter().collect(),
        }
    }

    /// True for the unrestricted default.
    pub fn is_all(&self) -> bool {
        self.mode == AvailabilityMode::All
    }

    /// Convert to the runtime representation.
    pub fn to_availability(&self) -> Availability {
        match self.mode {
            AvailabilityMode::All => Availability::All,
            AvailabilityMode::Only => Availability::only(self.ids.iter().copied()),
            AvailabilityMode::Except => Availability::except(self.ids.iter().copied()),
        }
    }
}

impl From<&Availability> for AvailabilityConfig {
    fn from(availability: &Availability) -> Self {
        match availability {
            Availability::All => Self::default(),
            Availability::Only(ids) => Self::only(ids.iter().copied()),
            Availability::Except(ids) => Self::except(ids.iter().copied()),
        }
    }
}

/// Configuration for a single physical connection.
///
/// Endpoints are written as `device.control.address`; types as a list of
/// names (`audio`, `video`, `usb`).
///
/// # Example
///
/// ```rust
/// use switchyard_config::{AvailabilityConfig, ConnectionConfig};
///
/// let config = ConnectionConfig::new(3, "20.0.1", "30.0.1")
///     .with_type("video")
///     .with_rooms(AvailabilityConfig::only([1]));
///
/// assert_eq!(config.types, vec!["video"]);
/// assert!(config.source_devices.is_all());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Unique connection id.
    pub id: u32,

    /// Upstream endpoint, `device.control.address`.
    pub source: String,

    /// Downstream endpoint, `device.control.address`.
    pub destination: String,

    /// Signal type names carried by the link.
    #[serde(default)]
    pub types: Vec<String>,

    /// Source devices whose signal may use the link.
    #[serde(default, skip_serializing_if = "AvailabilityConfig::is_all")]
    pub source_devices: AvailabilityConfig,

    /// Rooms that may use the link.
    #[serde(default, skip_serializing_if = "AvailabilityConfig::is_all")]
    pub rooms: AvailabilityConfig,
}

impl ConnectionConfig {
    /// Create an unrestricted connection with no types.
    pub fn new(id: u32, source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            destination: destination.into(),
            types: Vec::new(),
            source_devices: AvailabilityConfig::default(),
            rooms: AvailabilityConfig::default(),
        }
    }

    /// Add a signal type name.
    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.types.push(name.into());
        self
    }

    /// Restrict source devices.
    pub fn with_source_devices(mut self, availability: AvailabilityConfig) -> Self {
        self.source_devices = availability;
        self
    }

    /// Restrict rooms.
    pub fn with_rooms(mut self, availability: AvailabilityConfig) -> Self {
        self.rooms = availability;
        self
    }
}

impl From<&Connection> for ConnectionConfig {
    fn from(connection: &Connection) -> Self {
        Self {
            id: connection.id.0,
            source: connection.source.to_string(),
            destination: connection.destination.to_string(),
            types: connection
                .connection_type
                .singles()
                .filter_map(|flag| flag.flag_name())
                .map(str::to_ascii_lowercase)
                .collect(),
            source_devices: AvailabilityConfig::from(&connection.source_devices),
            rooms: AvailabilityConfig::from(&connection.rooms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{ConnectionType, EndpointInfo};

    #[test]
    fn availability_conversion() {
        assert_eq!(AvailabilityConfig::default().to_availability(), Availability::All);
        assert_eq!(
            AvailabilityConfig::only([2, 1]).to_availability(),
            Availability::only([1, 2])
        );
        assert_eq!(
            AvailabilityConfig::except([4]).to_availability(),
            Availability::except([4])
        );
    }

    #[test]
    fn all_mode_ignores_ids() {
        let config = AvailabilityConfig {
            mode: AvailabilityMode::All,
            ids: vec![1, 2],
        };
        assert_eq!(config.to_availability(), Availability::All);
    }

    #[test]
    fn from_connection() {
        let connection = Connection::new(
            7,
            EndpointInfo::new(1, 0, 2),
            EndpointInfo::new(3, 1, 4),
            ConnectionType::AUDIO | ConnectionType::USB,
        )
        .with_source_devices(Availability::except([9]));

        let config = ConnectionConfig::from(&connection);
        assert_eq!(config.id, 7);
        assert_eq!(config.source, "1.0.2");
        assert_eq!(config.destination, "3.1.4");
        assert_eq!(config.types, vec!["audio", "usb"]);
        assert_eq!(config.source_devices, AvailabilityConfig::except([9]));
        assert!(config.rooms.is_all());
    }

    #[test]
    fn midpoint_defaults_control_zero() {
        let config: DeviceControlConfig = toml::from_str("device = 20").unwrap();
        assert_eq!(config.device_control(), DeviceControlInfo::new(20, 0));
        assert!(config.name.is_none());
    }
}
