use serde::{Deserialize, Serialize};

use crate::core::constants::EARTH_RADIUS_KM;

/// Kilometres per degree of latitude on the spherical earth model
const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Great-circle distance to another coordinate in kilometres (Haversine)
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        haversine_km(self, other)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<LatLng> for geo_types::Point<f64> {
    fn from(value: LatLng) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

impl From<geo_types::Point<f64>> for LatLng {
    fn from(value: geo_types::Point<f64>) -> Self {
        Self::new(value.y(), value.x())
    }
}

/// Great-circle distance between two points in kilometres.
///
/// Uses the Haversine formula on a sphere of radius [`EARTH_RADIUS_KM`]. The
/// result is symmetric and zero for identical points. Longitude differences
/// are used as-is; `sin(Δλ/2)²` already handles the antimeridian.
pub fn haversine_km(p1: &LatLng, p2: &LatLng) -> f64 {
    let lat1_rad = p1.lat.to_radians();
    let lat2_rad = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A north/south/east/west rectangle in degrees.
///
/// Membership is inclusive on all four edges. Boxes crossing the antimeridian
/// (`west > east`) are not special-cased and match nothing in longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl MapBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Degenerate bounds covering a single point
    pub fn from_point(point: &LatLng) -> Self {
        Self::new(point.lat, point.lat, point.lng, point.lng)
    }

    /// Smallest bounds containing every point, or `None` for an empty input
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_point(first);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Approximate box of `radius_km` around `center`.
    ///
    /// Longitude span widens with latitude; near the poles it saturates to the
    /// full [-180, 180] range.
    pub fn around(center: &LatLng, radius_km: f64) -> Self {
        let dlat = radius_km / KM_PER_DEGREE;
        let cos_lat = center.lat.to_radians().cos();
        let dlng = if cos_lat.abs() < 1e-9 {
            180.0
        } else {
            (radius_km / (KM_PER_DEGREE * cos_lat.abs())).min(180.0)
        };

        Self::new(
            (center.lat + dlat).min(90.0),
            (center.lat - dlat).max(-90.0),
            (center.lng + dlng).min(180.0),
            (center.lng - dlng).max(-180.0),
        )
    }

    /// Checks if the bounds contain a point, edges included
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south = self.south.min(point.lat);
        self.west = self.west.min(point.lng);
        self.north = self.north.max(point.lat);
        self.east = self.east.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

impl From<MapBounds> for geo_types::Rect<f64> {
    fn from(value: MapBounds) -> Self {
        geo_types::Rect::new(
            geo_types::coord! { x: value.west, y: value.south },
            geo_types::coord! { x: value.east, y: value.north },
        )
    }
}
