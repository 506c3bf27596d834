//! Controller builder for fluent API configuration
//!
//! This module provides a MapControllerBuilder that assembles a
//! [`MapController`] from configuration, cluster presets, a geolocation host,
//! a storage backend and an initial set of markers.

use std::path::Path;
use std::sync::Arc;

use crate::{
    core::{
        config::{ClusterProfile, ClusteringConfig, LocationOptions, MapConfig},
        geo::LatLng,
        map::MapController,
    },
    location::{GeolocationHost, KeyValueStore, MemoryStore},
    markers::MapMarker,
    Result,
};

/// Builder for creating and configuring MapController instances
pub struct MapControllerBuilder {
    config: MapConfig,
    host: Option<Arc<dyn GeolocationHost>>,
    storage: Option<Box<dyn KeyValueStore>>,
    markers: Vec<MapMarker>,
}

impl MapControllerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
            host: None,
            storage: None,
            markers: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a JSON file
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = MapConfig::from_file(path)?;
        Ok(self)
    }

    /// Set the initial center and zoom level
    pub fn with_center_and_zoom(mut self, center: LatLng, zoom: i32) -> Self {
        self.config.viewport.default_center = center;
        self.config.viewport.default_zoom = zoom;
        self
    }

    /// Set zoom limits
    pub fn with_zoom_limits(mut self, min_zoom: i32, max_zoom: i32) -> Self {
        self.config.viewport.min_zoom = min_zoom;
        self.config.viewport.max_zoom = max_zoom;
        self
    }

    pub fn with_clustering(mut self, clustering: ClusteringConfig) -> Self {
        self.config.clustering = clustering;
        self
    }

    /// Set the clustering preset
    pub fn with_cluster_profile(mut self, profile: ClusterProfile) -> Self {
        self.config.clustering = profile.resolve();
        self
    }

    pub fn with_location_options(mut self, options: LocationOptions) -> Self {
        self.config.location = options;
        self
    }

    /// Host location capability; without one, location requests fail as unsupported
    pub fn with_geolocation(mut self, host: Arc<dyn GeolocationHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Durable storage for the last known location (in-memory by default)
    pub fn with_storage(mut self, storage: Box<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_markers(mut self, markers: impl IntoIterator<Item = MapMarker>) -> Self {
        self.markers.extend(markers);
        self
    }

    /// Validate the configuration and build the controller
    pub fn build(self) -> Result<MapController> {
        self.config.validate()?;

        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStore::new()));
        let mut controller = MapController::new(self.config, self.host, storage);
        controller.add_markers(self.markers);
        controller.drain_events();

        Ok(controller)
    }
}

impl Default for MapControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
