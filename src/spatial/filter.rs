use crate::core::geo::{LatLng, MapBounds};
use crate::markers::marker::MapMarker;

/// Viewport membership and text search over markers.
///
/// Every function preserves the input order of the markers it keeps.
pub struct SpatialFilter;

impl SpatialFilter {
    /// Markers inside `bounds`, edges included. `None` keeps everything.
    ///
    /// Bounds crossing the antimeridian (`west > east`) are not unwrapped.
    pub fn filter_by_bounds<'a>(
        markers: impl IntoIterator<Item = &'a MapMarker>,
        bounds: Option<&MapBounds>,
    ) -> Vec<&'a MapMarker> {
        match bounds {
            Some(bounds) => markers
                .into_iter()
                .filter(|m| bounds.contains(&m.position))
                .collect(),
            None => markers.into_iter().collect(),
        }
    }

    /// Case-insensitive substring search over title/name, description,
    /// category and tags. A blank query keeps everything.
    pub fn search<'a>(
        markers: impl IntoIterator<Item = &'a MapMarker>,
        query: &str,
    ) -> Vec<&'a MapMarker> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return markers.into_iter().collect();
        }
        markers
            .into_iter()
            .filter(|m| m.searchable_text().contains(&needle))
            .collect()
    }

    /// Markers whose great-circle distance to `center` is at most `radius_km`
    pub fn within_radius<'a>(
        markers: impl IntoIterator<Item = &'a MapMarker>,
        center: &LatLng,
        radius_km: f64,
    ) -> Vec<&'a MapMarker> {
        markers
            .into_iter()
            .filter(|m| center.distance_km(&m.position) <= radius_km)
            .collect()
    }

    /// Markers paired with their distance from `origin`, nearest first.
    /// Ties keep input order.
    pub fn sort_by_distance<'a>(
        markers: impl IntoIterator<Item = &'a MapMarker>,
        origin: &LatLng,
    ) -> Vec<(&'a MapMarker, f64)> {
        let mut ranked: Vec<_> = markers
            .into_iter()
            .map(|m| (m, origin.distance_km(&m.position)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked
    }
}
