//! Device location: one-shot fetches, continuous watches and persistence
//! of the last known fix.
//!
//! - [`types`] - `Location` and the `LocationError` taxonomy
//! - [`host`] - `GeolocationHost`, the platform capability this crate consumes
//! - [`storage`] - `KeyValueStore` plus in-memory and file backends
//! - [`watch`] - `WatchSubscription`, a channel over host watch callbacks
//! - [`provider`] - `LocationProvider`, the stateful owner of all of the above

pub mod host;
pub mod provider;
pub mod storage;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod fake;

pub use host::{GeolocationHost, PositionCallback, PositionUpdate, WatchId};
pub use provider::{LocationProvider, PositionFetch};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::{Location, LocationError};
pub use watch::WatchSubscription;
