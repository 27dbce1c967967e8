//! Switcher cache errors.

use thiserror::Error;

use crate::connection_type::{ConnectionType, ConnectionTypeError};

/// Errors returned by [`SwitcherCache`](super::SwitcherCache) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The input address is not one of the switcher's inputs.
    #[error("unknown input address {0}")]
    UnknownInput(u32),

    /// The output address is not one of the switcher's outputs.
    #[error("unknown output address {0}")]
    UnknownOutput(u32),

    /// The connector does not carry every requested flag.
    #[error("connector {address} does not carry {flags}")]
    UnsupportedFlags {
        /// Input or output address.
        address: u32,
        /// Flags requested.
        flags: ConnectionType,
    },

    /// A single flag was required.
    #[error(transparent)]
    ConnectionType(#[from] ConnectionTypeError),

    /// The requested flags route different inputs to the output.
    #[error("output {output} routes different inputs for {flags}")]
    Ambiguous {
        /// Output address queried.
        output: u32,
        /// Flags that disagree.
        flags: ConnectionType,
    },
}
