//! Core constants for the map engine.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

use crate::core::geo::LatLng;

/// Mean earth radius used by the Haversine distance, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Lowest zoom the viewport accepts by default.
pub const DEFAULT_MIN_ZOOM: i32 = 3;

/// Highest zoom the viewport accepts by default.
pub const DEFAULT_MAX_ZOOM: i32 = 18;

/// Zoom used when the map is first shown.
pub const DEFAULT_ZOOM: i32 = 13;

/// Selecting a marker flies to at least this zoom.
pub const SELECTION_MIN_ZOOM: i32 = 15;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: i32 = 1;

/// Map center used until a location fix arrives (Madrid).
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 40.4168,
    lng: -3.7038,
};

/// Markers closer than this (km) to a cluster seed join its cluster.
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 1.0;

/// Durable storage key holding the last known location.
pub const LOCATION_STORAGE_KEY: &str = "eventmap.user_location";

/// Location fetch timeout.
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;

/// Maximum age of a cached device fix the host may hand back.
pub const DEFAULT_LOCATION_MAX_AGE_MS: u64 = 60_000;

/// Events kept for the rendering layer before the oldest are dropped.
pub const MAX_QUEUED_EVENTS: usize = 512;
