use crate::core::{
    config::ClusteringConfig,
    geo::{LatLng, MapBounds},
};
use crate::markers::marker::MapMarker;

/// Represents a cluster of markers
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// `cluster_<seed id>`; stable while the seed stays first in store order
    pub id: String,
    /// Centroid of the member positions
    pub center: LatLng,
    /// Geographic bounds of the members
    pub bounds: MapBounds,
    /// Members, seed first, then in store order
    pub markers: Vec<MapMarker>,
}

impl Cluster {
    fn from_seed(seed: &MapMarker) -> Self {
        Self {
            id: format!("cluster_{}", seed.id),
            center: seed.position,
            bounds: MapBounds::from_point(&seed.position),
            markers: vec![seed.clone()],
        }
    }

    /// Add a marker to this cluster
    fn add_marker(&mut self, marker: &MapMarker) {
        self.markers.push(marker.clone());
        self.bounds.extend(&marker.position);
        let n = self.markers.len() as f64;
        let (lat, lng) = self
            .markers
            .iter()
            .fold((0.0, 0.0), |(lat, lng), m| (lat + m.position.lat, lng + m.position.lng));
        self.center = LatLng::new(lat / n, lng / n);
    }

    /// The marker that started this cluster
    pub fn seed(&self) -> &MapMarker {
        &self.markers[0]
    }

    /// Get the number of markers in the cluster
    pub fn count(&self) -> usize {
        self.markers.len()
    }

    /// Check if this is a single-marker cluster
    pub fn is_single(&self) -> bool {
        self.markers.len() == 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.markers.iter().any(|m| m.id == id)
    }
}

/// Greedy proximity clustering.
///
/// Markers are visited in input order. Each unassigned marker seeds a new
/// cluster that absorbs every later unassigned marker within `radius_km` of
/// the seed. Grouping therefore depends on input order, and two markers that
/// are close to each other but far from any shared seed may land in different
/// clusters. Cost is O(n²) distance checks per pass.
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    config: ClusteringConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Update the clustering configuration
    pub fn set_config(&mut self, config: ClusteringConfig) {
        self.config = config;
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_radius_km(&mut self, radius_km: f64) {
        self.config.radius_km = radius_km;
    }

    /// Clusters `markers` with the configured radius and enabled flag
    pub fn cluster<'a>(&self, markers: impl IntoIterator<Item = &'a MapMarker>) -> Vec<Cluster> {
        get_clustered_markers(markers, self.config.radius_km, self.config.enabled)
    }
}

/// Groups markers into clusters; see [`ClusterEngine`] for the algorithm.
///
/// With `enabled == false` every marker becomes its own cluster. Every marker
/// ends up in exactly one cluster.
pub fn get_clustered_markers<'a>(
    markers: impl IntoIterator<Item = &'a MapMarker>,
    cluster_radius_km: f64,
    enabled: bool,
) -> Vec<Cluster> {
    let markers: Vec<&MapMarker> = markers.into_iter().collect();

    if !enabled {
        return markers.into_iter().map(Cluster::from_seed).collect();
    }

    let mut assigned = vec![false; markers.len()];
    let mut clusters = Vec::new();

    for (i, seed) in markers.iter().enumerate() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut cluster = Cluster::from_seed(seed);

        for (j, other) in markers.iter().enumerate().skip(i + 1) {
            if !assigned[j] && seed.position.distance_km(&other.position) <= cluster_radius_km {
                cluster.add_marker(other);
                assigned[j] = true;
            }
        }

        clusters.push(cluster);
    }

    log::debug!(
        "clustered {} markers into {} clusters (radius {} km)",
        markers.len(),
        clusters.len(),
        cluster_radius_km
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::marker::EventInfo;

    fn marker(id: &str, lat: f64, lng: f64) -> MapMarker {
        MapMarker::event(id, LatLng::new(lat, lng), EventInfo::default())
    }

    /// Two markers roughly 0.5 km apart along a meridian
    fn pair() -> Vec<MapMarker> {
        vec![marker("a", 40.4168, -3.7038), marker("b", 40.4213, -3.7038)]
    }

    #[test]
    fn test_disabled_is_passthrough() {
        let markers = pair();
        let clusters = get_clustered_markers(&markers, 100.0, false);

        assert_eq!(clusters.len(), markers.len());
        assert!(clusters.iter().all(Cluster::is_single));
    }

    #[test]
    fn test_close_pair_merges() {
        let markers = pair();
        let d = markers[0].position.distance_km(&markers[1].position);
        assert!((d - 0.5).abs() < 0.01, "pair distance {d}");

        let clusters = get_clustered_markers(&markers, 1.0, true);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count(), 2);
        assert_eq!(clusters[0].id, "cluster_a");
        assert_eq!(clusters[0].seed().id, "a");
    }

    #[test]
    fn test_small_radius_splits() {
        let markers = pair();
        let clusters = get_clustered_markers(&markers, 0.1, true);

        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(Cluster::is_single));
    }

    #[test]
    fn test_seed_order_decides_grouping() {
        // a--b--c spaced ~0.8 km apart: b reaches both, a and c are ~1.6 km apart
        let a = marker("a", 40.0, -3.0);
        let b = marker("b", 40.0072, -3.0);
        let c = marker("c", 40.0144, -3.0);

        let from_a = get_clustered_markers([&a, &b, &c], 1.0, true);
        assert_eq!(from_a.len(), 2);
        assert!(from_a[0].contains("a") && from_a[0].contains("b"));
        assert!(from_a[1].is_single() && from_a[1].contains("c"));

        let from_b = get_clustered_markers([&b, &a, &c], 1.0, true);
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_b[0].count(), 3);
    }

    #[test]
    fn test_every_marker_in_exactly_one_cluster() {
        let markers: Vec<_> = (0..40)
            .map(|i| marker(&format!("m{i}"), 40.0 + (i % 7) as f64 * 0.004, -3.0 + (i / 7) as f64 * 0.006))
            .collect();

        let clusters = ClusterEngine::new(ClusteringConfig {
            enabled: true,
            radius_km: 0.6,
        })
        .cluster(&markers);

        let total: usize = clusters.iter().map(Cluster::count).sum();
        assert_eq!(total, markers.len());
        for m in &markers {
            assert_eq!(clusters.iter().filter(|c| c.contains(&m.id)).count(), 1);
        }
    }

    #[test]
    fn test_cluster_center_and_bounds() {
        let markers = vec![marker("a", 40.0, -3.0), marker("b", 40.002, -3.002)];
        let clusters = get_clustered_markers(&markers, 1.0, true);
        let cluster = &clusters[0];

        assert!((cluster.center.lat - 40.001).abs() < 1e-9);
        assert!((cluster.center.lng + 3.001).abs() < 1e-9);
        assert_eq!(cluster.bounds, MapBounds::new(40.002, 40.0, -3.0, -3.002));
    }

    #[test]
    fn test_empty_input() {
        assert!(ClusterEngine::default().cluster(&Vec::new()).is_empty());
    }
}
