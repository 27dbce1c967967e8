//! Shared-resource claim ledger.
//!
//! A physical connection may feed several rooms at once (one distribution
//! amplifier, many displays) but only while it keeps carrying the same
//! source. [`ConnectionUsages`] records, per connection and per flag, the
//! source in use and the rooms relying on it, and answers whether a new
//! route may take the connection over.
//!
//! # Arbitration
//!
//! `can_route(source, room, flag)` holds when any of:
//!
//! - the connection already carries `source` (shared use)
//! - no room has claimed it
//! - `room` is its only claimant
//!
//! A claim with a different source evicts every previous room for that flag.

mod info;
mod ledger;

pub use info::{ClaimReceipt, ConnectionUsageInfo};
pub use ledger::ConnectionUsages;
