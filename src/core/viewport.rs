use serde::{Deserialize, Serialize};

use crate::core::config::ViewportConfig;
use crate::core::constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_DELTA};
use crate::core::geo::{LatLng, MapBounds};

/// Snapshot of the visible map region as seen by the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center: LatLng,
    pub zoom: i32,
    /// Explicit bounds set through `fit_bounds`, stored verbatim
    pub bounds: Option<MapBounds>,
}

/// Manages the current view of the map: center, zoom and optional bounds.
///
/// `zoom` is always within `[min_zoom, max_zoom]`; out-of-range requests are
/// clamped, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    state: MapViewport,
    /// The minimum allowed zoom level
    pub min_zoom: i32,
    /// The maximum allowed zoom level
    pub max_zoom: i32,
    /// Step used by `zoom_in`/`zoom_out`
    pub zoom_delta: i32,
}

impl Viewport {
    /// Creates a new viewport with the default zoom limits
    pub fn new(center: LatLng, zoom: i32) -> Self {
        Self {
            state: MapViewport {
                center,
                zoom: zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM),
                bounds: None,
            },
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_delta: DEFAULT_ZOOM_DELTA,
        }
    }

    pub fn from_config(config: &ViewportConfig) -> Self {
        let mut viewport = Self::new(config.default_center, config.default_zoom);
        viewport.zoom_delta = config.zoom_delta;
        viewport.set_zoom_limits(config.min_zoom, config.max_zoom);
        viewport.state.zoom = config.default_zoom.clamp(viewport.min_zoom, viewport.max_zoom);
        viewport
    }

    /// Current viewport record
    pub fn state(&self) -> &MapViewport {
        &self.state
    }

    pub fn center(&self) -> LatLng {
        self.state.center
    }

    pub fn zoom(&self) -> i32 {
        self.state.zoom
    }

    pub fn bounds(&self) -> Option<&MapBounds> {
        self.state.bounds.as_ref()
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        log::debug!("viewport center -> ({:.5}, {:.5})", center.lat, center.lng);
        self.state.center = center;
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: i32) {
        self.state.zoom = self.clamp_zoom(zoom);
        log::debug!("viewport zoom {} (requested {})", self.state.zoom, zoom);
    }

    /// Sets the zoom limits, re-clamping the current zoom
    pub fn set_zoom_limits(&mut self, min_zoom: i32, max_zoom: i32) {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.state.zoom = self.state.zoom.clamp(min_zoom, max_zoom);
    }

    /// Stores `bounds` as-is; center and zoom are left for the renderer to derive
    pub fn fit_bounds(&mut self, bounds: MapBounds) {
        log::debug!("viewport fit to {:?}", bounds);
        self.state.bounds = Some(bounds);
    }

    /// Moves center and (optionally) zoom in one state transition
    pub fn fly_to(&mut self, center: LatLng, zoom: Option<i32>) {
        let zoom = zoom.map_or(self.state.zoom, |z| self.clamp_zoom(z));
        self.state = MapViewport {
            center,
            zoom,
            ..self.state
        };
        log::debug!(
            "viewport flew to ({:.5}, {:.5}) @ {}",
            center.lat,
            center.lng,
            zoom
        );
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.state.zoom.saturating_add(self.zoom_delta));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.state.zoom.saturating_sub(self.zoom_delta));
    }

    fn clamp_zoom(&self, zoom: i32) -> i32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&ViewportConfig::default())
    }
}
