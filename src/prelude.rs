//! Prelude module for common eventmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use eventmap::prelude::*;`

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
    MemoryStore, PositionCallback, PositionFetch, PositionUpdate, WatchId, WatchSubscription,
};

pub use crate::markers::{
    EventInfo, MapMarker, MarkerPayload, MarkerStore, MarkerType, Popup, TribeInfo, UserInfo,
    VenueInfo,
};

pub use crate::spatial::{get_clustered_markers, Cluster, ClusterEngine, SpatialFilter};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
