use std::collections::VecDeque;
use std::sync::Arc;

use crate::{
    core::{
        config::{ClusteringConfig, MapConfig},
        constants::MAX_QUEUED_EVENTS,
        events::MapEvent,
        geo::{LatLng, MapBounds},
        viewport::{MapViewport, Viewport},
    },
    location::{
        GeolocationHost, KeyValueStore, Location, LocationError, LocationProvider, PositionFetch,
        PositionUpdate,
    },
    markers::{MapMarker, MarkerStore, MarkerType},
    spatial::{Cluster, ClusterEngine, SpatialFilter},
    Result,
};

/// The single stateful object behind an interactive map.
///
/// Owns the viewport, the marker store, the location provider and the
/// clustering engine, and exposes their operations to the rendering layer.
/// Each instance is independent; several maps can coexist.
pub struct MapController {
    config: MapConfig,
    viewport: Viewport,
    markers: MarkerStore,
    location: LocationProvider,
    clustering: ClusterEngine,
    /// Whether the camera has already been moved to the first location fix
    centered_on_location: bool,
    /// Oldest first, capped at [`MAX_QUEUED_EVENTS`]
    events: VecDeque<MapEvent>,
}

impl MapController {
    pub fn new(
        config: MapConfig,
        host: Option<Arc<dyn GeolocationHost>>,
        storage: Box<dyn KeyValueStore>,
    ) -> Self {
        let viewport = Viewport::from_config(&config.viewport);
        let location = LocationProvider::new(host, storage, config.location.clone())
            .with_storage_key(config.storage_key.clone());
        let clustering = ClusterEngine::new(config.clustering.clone());

        Self {
            config,
            viewport,
            markers: MarkerStore::new(),
            location,
            clustering,
            centered_on_location: false,
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    // --- observable state ---------------------------------------------------------------------

    pub fn viewport(&self) -> &MapViewport {
        self.viewport.state()
    }

    pub fn viewport_manager(&self) -> &Viewport {
        &self.viewport
    }

    pub fn markers(&self) -> &[MapMarker] {
        self.markers.markers()
    }

    pub fn marker_store(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn selected_marker(&self) -> Option<&MapMarker> {
        self.markers.selected_marker()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.location()
    }

    pub fn location_provider(&self) -> &LocationProvider {
        &self.location
    }

    pub fn is_loading(&self) -> bool {
        self.location.is_loading()
    }

    pub fn error(&self) -> Option<&LocationError> {
        self.location.error()
    }

    /// Takes every event recorded since the last call, oldest first.
    ///
    /// Draining is optional; past [`MAX_QUEUED_EVENTS`] the oldest entries are dropped.
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }

    fn record(&mut self, event: MapEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    // --- location -----------------------------------------------------------------------------

    /// Restores or fetches the user location and centers the map on it
    pub async fn start(&mut self) -> Option<Location> {
        let error_before = self.location.error().cloned();
        let cached = self.location.load_cached();
        self.after_location_change(None, error_before);

        if cached.is_none() && !self.location.is_loading() {
            self.refresh_location().await;
        }
        self.location.location().copied()
    }

    /// Fetches a fresh position. Failures are reported through [`Self::error`].
    pub async fn refresh_location(&mut self) -> Option<Location> {
        let fetch = self.begin_location_fetch()?;
        let result = fetch.resolve().await;
        self.complete_location_fetch(result)
    }

    /// Starts a fetch the caller awaits without holding the controller.
    ///
    /// [`Self::is_loading`] reads true until [`Self::complete_location_fetch`].
    pub fn begin_location_fetch(&mut self) -> Option<PositionFetch> {
        let fetch = self.location.begin_fetch();
        if fetch.is_none() {
            self.after_location_change(self.location.location().copied(), None);
        }
        fetch
    }

    pub fn complete_location_fetch(&mut self, result: PositionUpdate) -> Option<Location> {
        let before = self.location.location().copied();
        let fix = self.location.complete_fetch(result);
        self.after_location_change(before, None);
        fix
    }

    /// Starts continuous location updates; returns whether a watch is active
    pub fn watch_location(&mut self) -> bool {
        let before = self.location.error().cloned();
        let watching = self.location.watch_position();
        if !watching {
            self.after_location_change(self.location.location().copied(), before);
        }
        watching
    }

    /// Applies pending watch updates in the order the host delivered them
    pub fn process_location_updates(&mut self) -> usize {
        let before = self.location.location().copied();
        let applied = self.location.process_watch_updates();
        if applied > 0 {
            self.after_location_change(before, None);
        }
        applied
    }

    pub fn stop_watching_location(&mut self) {
        self.location.clear_watch();
    }

    /// Moves the camera to the current location, if there is one
    pub fn center_on_location(&mut self) -> bool {
        match self.location.location() {
            Some(location) => {
                let center = location.position();
                self.set_center(center);
                true
            }
            None => false,
        }
    }

    fn after_location_change(&mut self, before: Option<Location>, error_before: Option<LocationError>) {
        let current = self.location.location().copied();
        if let Some(location) = current {
            if current != before {
                self.record(MapEvent::LocationUpdated { location });
            }
            if !self.centered_on_location {
                self.centered_on_location = true;
                self.set_center(location.position());
            }
        }
        if let Some(error) = self.location.error().cloned() {
            if Some(&error) != error_before.as_ref() {
                self.record(MapEvent::LocationFailed { error });
            }
        }
    }

    // --- camera -------------------------------------------------------------------------------

    pub fn set_center(&mut self, center: LatLng) {
        self.viewport.set_center(center);
        self.push_view_changed();
    }

    /// Sets the zoom, clamped to the configured limits
    pub fn set_zoom(&mut self, zoom: i32) {
        self.viewport.set_zoom(zoom);
        self.push_view_changed();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.push_view_changed();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.push_view_changed();
    }

    pub fn fit_bounds(&mut self, bounds: MapBounds) {
        self.viewport.fit_bounds(bounds);
        self.record(MapEvent::BoundsChanged { bounds });
    }

    pub fn fly_to(&mut self, center: LatLng, zoom: Option<i32>) {
        self.viewport.fly_to(center, zoom);
        self.push_view_changed();
    }

    fn push_view_changed(&mut self) {
        self.record(MapEvent::ViewChanged {
            center: self.viewport.center(),
            zoom: self.viewport.zoom(),
        });
    }

    // --- markers ------------------------------------------------------------------------------

    pub fn add_marker(&mut self, marker: MapMarker) {
        let id = marker.id.clone();
        let event = if self.markers.add_marker(marker) {
            MapEvent::MarkerUpdated { id }
        } else {
            MapEvent::MarkerAdded { id }
        };
        self.record(event);
    }

    pub fn add_markers(&mut self, markers: impl IntoIterator<Item = MapMarker>) {
        for marker in markers {
            self.add_marker(marker);
        }
    }

    pub fn remove_marker(&mut self, id: &str) {
        let was_selected = self.markers.selected_marker().is_some_and(|m| m.id == id);
        if self.markers.remove_marker(id).is_some() {
            self.record(MapEvent::MarkerRemoved { id: id.to_string() });
            if was_selected {
                self.record(MapEvent::SelectionChanged { id: None });
            }
        }
    }

    /// Selects a marker and flies to it at `max(zoom, selection_zoom)`.
    ///
    /// `None` clears the selection; an unknown id changes nothing.
    pub fn select_marker(&mut self, id: Option<&str>) {
        let previous = self.markers.selected_marker().map(|m| m.id.clone());

        let target = match id {
            None => {
                self.markers.select_marker(None);
                None
            }
            Some(id) => match self.markers.select_marker(Some(id)) {
                Some(marker) => Some(marker.position),
                None => return,
            },
        };

        let current = self.markers.selected_marker().map(|m| m.id.clone());
        if current != previous {
            self.record(MapEvent::SelectionChanged { id: current });
        }

        if let Some(position) = target {
            let zoom = self.viewport.zoom().max(self.config.viewport.selection_zoom);
            self.fly_to(position, Some(zoom));
        }
    }

    pub fn clear_markers(&mut self) {
        let had_selection = self.markers.selected_marker().is_some();
        self.markers.clear_markers();
        self.record(MapEvent::MarkersCleared);
        if had_selection {
            self.record(MapEvent::SelectionChanged { id: None });
        }
    }

    pub fn get_markers_by_type(&self, kind: MarkerType) -> Vec<&MapMarker> {
        self.markers.markers_by_type(kind)
    }

    // --- spatial queries ----------------------------------------------------------------------

    pub fn filter_by_bounds(&self, bounds: Option<&MapBounds>) -> Vec<&MapMarker> {
        SpatialFilter::filter_by_bounds(self.markers.markers(), bounds)
    }

    /// Markers inside the viewport's explicit bounds, or all markers when none are set
    pub fn get_markers_in_viewport(&self) -> Vec<&MapMarker> {
        self.filter_by_bounds(self.viewport.bounds())
    }

    pub fn search_markers(&self, query: &str) -> Vec<&MapMarker> {
        SpatialFilter::search(self.markers.markers(), query)
    }

    /// Markers within `radius_km` of the current location, nearest first
    pub fn markers_near_location(&self, radius_km: f64) -> Vec<(&MapMarker, f64)> {
        let Some(origin) = self.location.location().map(Location::position) else {
            return Vec::new();
        };
        let near = SpatialFilter::within_radius(self.markers.markers(), &origin, radius_km);
        SpatialFilter::sort_by_distance(near, &origin)
    }

    // --- clustering ---------------------------------------------------------------------------

    /// Clusters the markers inside `bounds` (all markers for `None`)
    pub fn get_clustered_markers(&self, bounds: Option<&MapBounds>) -> Vec<Cluster> {
        self.clustering.cluster(self.filter_by_bounds(bounds))
    }

    pub fn get_clustered_markers_in_viewport(&self) -> Vec<Cluster> {
        self.get_clustered_markers(self.viewport.bounds())
    }

    pub fn clustering(&self) -> &ClusteringConfig {
        self.clustering.config()
    }

    /// Replaces the clustering settings; a negative or NaN radius is rejected
    pub fn set_clustering(&mut self, config: ClusteringConfig) -> Result<()> {
        config.validate()?;
        self.config.clustering = config.clone();
        self.clustering.set_config(config);
        Ok(())
    }

    pub fn set_clustering_enabled(&mut self, enabled: bool) {
        self.config.clustering.enabled = enabled;
        self.clustering.set_enabled(enabled);
    }

    /// Changes the cluster radius; a negative or NaN radius is rejected
    pub fn set_cluster_radius_km(&mut self, radius_km: f64) -> Result<()> {
        ClusteringConfig {
            radius_km,
            ..self.config.clustering.clone()
        }
        .validate()?;
        self.config.clustering.radius_km = radius_km;
        self.clustering.set_radius_km(radius_km);
        Ok(())
    }
}

impl std::fmt::Debug for MapController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapController")
            .field("viewport", self.viewport.state())
            .field("markers", &self.markers.len())
            .field("selected", &self.markers.selected_marker().map(|m| &m.id))
            .field("location", &self.location)
            .field("clustering", self.clustering.config())
            .finish()
    }
}
