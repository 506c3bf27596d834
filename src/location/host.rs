//! Host location capability.
//!
//! The platform (browser, mobile shell, GPS daemon) implements
//! [`GeolocationHost`]; the crate never talks to devices itself.

use async_trait::async_trait;

use crate::core::config::LocationOptions;
use crate::location::types::{Location, LocationError};

/// Identifier returned by [`GeolocationHost::watch_position`]
pub type WatchId = u64;

/// Outcome of a single position update
pub type PositionUpdate = std::result::Result<Location, LocationError>;

/// Callback fired by the host for every watch update, possibly from another thread
pub type PositionCallback = Box<dyn Fn(PositionUpdate) + Send + Sync>;

#[async_trait]
pub trait GeolocationHost: Send + Sync {
    /// One-shot position fetch
    async fn get_current_position(&self, options: &LocationOptions) -> PositionUpdate;

    /// Registers `callback` for continuous updates until [`Self::clear_watch`]
    fn watch_position(
        &self,
        options: &LocationOptions,
        callback: PositionCallback,
    ) -> std::result::Result<WatchId, LocationError>;

    /// Deregisters a watch. Unknown ids are ignored.
    fn clear_watch(&self, id: WatchId);
}
