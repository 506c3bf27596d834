//! Configuration system for viewport, clustering and location behavior
//!
//! Every section deserializes with defaults filled in, so a JSON document only
//! needs to name the values it overrides. Clustering can also be picked from
//! a small set of presets through [`ClusterProfile`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{constants, geo::LatLng};
use crate::{MapError, Result};

/// Top-level configuration for a [`crate::MapController`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub viewport: ViewportConfig,
    pub clustering: ClusteringConfig,
    pub location: LocationOptions,
    /// Durable storage key for the last known location
    pub storage_key: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            clustering: ClusteringConfig::default(),
            location: LocationOptions::default(),
            storage_key: constants::LOCATION_STORAGE_KEY.to_string(),
        }
    }
}

impl MapConfig {
    /// Parses and validates a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let viewport = &self.viewport;
        if viewport.min_zoom > viewport.max_zoom {
            return Err(MapError::Config(format!(
                "min_zoom {} exceeds max_zoom {}",
                viewport.min_zoom, viewport.max_zoom
            )));
        }
        if !viewport.default_center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "default center {:?}",
                viewport.default_center
            )));
        }
        self.clustering.validate()?;
        if self.storage_key.is_empty() {
            return Err(MapError::Config("storage key must not be empty".into()));
        }
        Ok(())
    }

    pub fn with_cluster_profile(mut self, profile: ClusterProfile) -> Self {
        self.clustering = profile.resolve();
        self
    }
}

/// Initial camera and zoom limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub default_center: LatLng,
    pub default_zoom: i32,
    pub min_zoom: i32,
    pub max_zoom: i32,
    /// Zoom floor applied when flying to a selected marker
    pub selection_zoom: i32,
    pub zoom_delta: i32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            default_center: constants::DEFAULT_CENTER,
            default_zoom: constants::DEFAULT_ZOOM,
            min_zoom: constants::DEFAULT_MIN_ZOOM,
            max_zoom: constants::DEFAULT_MAX_ZOOM,
            selection_zoom: constants::SELECTION_MIN_ZOOM,
            zoom_delta: constants::DEFAULT_ZOOM_DELTA,
        }
    }
}

/// Configuration for clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// When false every marker is rendered as its own cluster
    pub enabled: bool,
    /// Maximum distance from a cluster seed, in kilometres
    pub radius_km: f64,
}

impl ClusteringConfig {
    /// Rejects a negative or NaN radius
    pub fn validate(&self) -> Result<()> {
        let radius = self.radius_km;
        if radius.is_nan() || radius < 0.0 {
            return Err(MapError::Config(format!(
                "cluster radius must be non-negative, got {radius}"
            )));
        }
        Ok(())
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_km: constants::DEFAULT_CLUSTER_RADIUS_KM,
        }
    }
}

/// Preset clustering behaviors
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ClusterProfile {
    /// Merge aggressively, for city-wide views with many events
    Dense,
    #[default]
    Balanced,
    /// Only merge markers that practically overlap
    Sparse,
    /// No clustering at all
    Off,
    Custom(ClusteringConfig),
}

impl ClusterProfile {
    pub fn resolve(&self) -> ClusteringConfig {
        match self {
            Self::Dense => ClusteringConfig {
                enabled: true,
                radius_km: 5.0,
            },
            Self::Balanced => ClusteringConfig::default(),
            Self::Sparse => ClusteringConfig {
                enabled: true,
                radius_km: 0.1,
            },
            Self::Off => ClusteringConfig {
                enabled: false,
                ..ClusteringConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

/// Options handed to the host location capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    /// How old a cached device fix may be and still be returned
    pub maximum_age_ms: u64,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: constants::DEFAULT_LOCATION_TIMEOUT_MS,
            maximum_age_ms: constants::DEFAULT_LOCATION_MAX_AGE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults() {
        let config = MapConfig::default();

        assert_eq!(config.viewport.min_zoom, 3);
        assert_eq!(config.viewport.max_zoom, 18);
        assert!(config.location.enable_high_accuracy);
        assert_eq!(config.location.timeout_ms, 10_000);
        assert_eq!(config.location.maximum_age_ms, 60_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MapConfig::from_json_str(
            r#"{ "clustering": { "radius_km": 2.5 }, "viewport": { "max_zoom": 16 } }"#,
        )
        .unwrap();

        assert_eq!(config.clustering.radius_km, 2.5);
        assert!(config.clustering.enabled);
        assert_eq!(config.viewport.max_zoom, 16);
        assert_eq!(config.viewport.min_zoom, 3);
        assert_eq!(config.storage_key, constants::LOCATION_STORAGE_KEY);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert_matches!(
            MapConfig::from_json_str(r#"{ "viewport": { "min_zoom": 12, "max_zoom": 4 } }"#),
            Err(MapError::Config(_))
        );
        assert_matches!(
            MapConfig::from_json_str(r#"{ "clustering": { "radius_km": -1.0 } }"#),
            Err(MapError::Config(_))
        );
        assert_matches!(
            MapConfig::from_json_str("{ nope"),
            Err(MapError::Serialization(_))
        );
    }

    #[test]
    fn test_cluster_profiles() {
        assert!(!ClusterProfile::Off.resolve().enabled);
        assert!(ClusterProfile::Dense.resolve().radius_km > ClusterProfile::Sparse.resolve().radius_km);

        let config = MapConfig::default().with_cluster_profile(ClusterProfile::Sparse);
        assert_eq!(config.clustering.radius_km, 0.1);
    }
}
