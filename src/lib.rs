//! # eventmap
//!
//! Geospatial state for interactive event and community maps.
//!
//! The crate tracks the user's live location, keeps the geo-tagged entities
//! (events, tribes, users, venues) shown on the map, filters them by viewport
//! and text, and groups nearby ones into clusters. Everything is composed
//! into a [`MapController`] that a rendering layer reads from and drives with
//! user gestures. No rendering or network I/O happens here.

pub mod core;
pub mod location;
pub mod markers;
pub mod prelude;
pub mod spatial;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    builder::MapControllerBuilder,
    config::{ClusterProfile, ClusteringConfig, LocationOptions, MapConfig, ViewportConfig},
    events::MapEvent,
    geo::{haversine_km, LatLng, MapBounds},
    map::MapController,
    viewport::{MapViewport, Viewport},
};

pub use crate::location::{
    FileStore, GeolocationHost, KeyValueStore, Location, LocationError, LocationProvider,
    MemoryStore, PositionFetch, WatchSubscription,
};

pub use crate::markers::{MapMarker, MarkerPayload, MarkerStore, MarkerType, Popup};

pub use crate::spatial::{get_clustered_markers, Cluster, ClusterEngine, SpatialFilter};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = MapError;
