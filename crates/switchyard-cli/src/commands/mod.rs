//! CLI command implementations.

pub mod common;
pub mod connections;
pub mod paths;
pub mod validate;
