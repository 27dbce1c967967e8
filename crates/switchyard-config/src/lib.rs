//! Routing configuration for switchyard.
//!
//! This crate loads a site's signal-matrix description from TOML, validates
//! it, and builds the [`ConnectionGraph`](switchyard_core::ConnectionGraph)
//! the path finder searches.
//!
//! # Features
//!
//! - **Routing files**: Load and save [`RoutingConfig`] TOML files
//! - **Validation**: Report every structural problem at once
//! - **Graph building**: Convert a validated configuration into core types
//!
//! # Example
//!
//! ```rust,no_run
//! use switchyard_config::{AvailabilityConfig, ConnectionConfig, DeviceControlConfig, RoutingConfig};
//!
//! // Load a configuration from file
//! let config = RoutingConfig::load("site.toml").unwrap();
//! let graph = config.build_graph().unwrap();
//!
//! // Create a configuration programmatically
//! let config = RoutingConfig::new("Building A")
//!     .with_midpoint(DeviceControlConfig::new(20).with_name("Main matrix"))
//!     .with_connection(ConnectionConfig::new(1, "10.0.1", "20.0.1").with_type("video"))
//!     .with_connection(
//!         ConnectionConfig::new(2, "20.0.1", "30.0.1")
//!             .with_type("video")
//!             .with_rooms(AvailabilityConfig::only([1])),
//!     );
//! config.save("site.toml").unwrap();
//! ```

mod connection_config;
mod error;
mod routing;

/// Routing configuration validation.
pub mod validation;

pub use connection_config::{
    AvailabilityConfig, AvailabilityMode, ConnectionConfig, DeviceControlConfig,
};
pub use error::ConfigError;
pub use routing::RoutingConfig;
pub use validation::{
    ResolvedConfig, ValidationError, ValidationResult, resolve_config, validate_config,
};
