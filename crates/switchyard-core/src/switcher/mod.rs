//! Runtime state of switching devices.
//!
//! One [`SwitcherCache`] exists per routing-capable device control. Device
//! drivers push feedback into it (routed input per output, signal detection,
//! transmission); the cache drops no-op updates and republishes real
//! transitions as [`SwitcherEvent`]s to registered observers. The cache
//! performs no I/O of its own.

mod cache;
mod error;
mod event;

pub use cache::SwitcherCache;
pub use error::CacheError;
pub use event::{Observer, SubscriptionId, SwitcherEvent};
