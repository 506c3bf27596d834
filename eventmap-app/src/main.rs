use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use async_trait::async_trait;
use eventmap::{
    location::{PositionCallback, PositionUpdate, WatchId},
    ClusterProfile, FileStore, GeolocationHost, LatLng, Location, LocationError, LocationOptions,
    MapConfig, MapControllerBuilder, MapMarker,
};

/// Host that reports a fixed position, standing in for a device GPS
struct FixedHost {
    position: Option<Location>,
}

#[async_trait]
impl GeolocationHost for FixedHost {
    async fn get_current_position(&self, _options: &LocationOptions) -> PositionUpdate {
        self.get_position()
    }

    fn watch_position(
        &self,
        _options: &LocationOptions,
        callback: PositionCallback,
    ) -> Result<WatchId, LocationError> {
        callback(self.get_position());
        Ok(1)
    }

    fn clear_watch(&self, _id: WatchId) {}
}

impl FixedHost {
    fn get_position(&self) -> PositionUpdate {
        self.position.ok_or(LocationError::PositionUnavailable)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Profile {
    /// Large radius, aggressive grouping for crowded cities
    Dense,
    /// Default 1 km radius
    Balanced,
    /// Small radius, only near-duplicates merge
    Sparse,
    /// Every marker stands alone
    Off,
}

impl From<Profile> for ClusterProfile {
    fn from(value: Profile) -> Self {
        match value {
            Profile::Dense => ClusterProfile::Dense,
            Profile::Balanced => ClusterProfile::Balanced,
            Profile::Sparse => ClusterProfile::Sparse,
            Profile::Off => ClusterProfile::Off,
        }
    }
}

#[derive(Parser)]
#[command(name = "eventmap-app")]
#[command(about = "Print viewport, cluster and search state for a set of map markers", long_about = None)]
struct Args {
    /// JSON array of markers
    markers: PathBuf,

    /// Map configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// File used to persist the last known location
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Device position as LAT,LNG
    #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
    at: Option<LatLng>,

    /// Case-insensitive text search over the markers
    #[arg(long)]
    search: Option<String>,

    /// Clustering preset, overriding the config file
    #[arg(long, value_enum)]
    profile: Option<Profile>,
}

fn parse_lat_lng(raw: &str) -> Result<LatLng, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got {raw:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    let position = LatLng::new(lat, lng);
    if !position.is_valid() {
        return Err(format!("coordinates out of range: {raw}"));
    }
    Ok(position)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MapConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MapConfig::default(),
    };
    if let Some(profile) = args.profile {
        config = config.with_cluster_profile(profile.into());
    }

    let raw = std::fs::read_to_string(&args.markers)
        .with_context(|| format!("reading {}", args.markers.display()))?;
    let markers: Vec<MapMarker> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.markers.display()))?;
    log::info!("loaded {} markers from {}", markers.len(), args.markers.display());

    let host = Arc::new(FixedHost {
        position: args.at.map(|p| Location::new(p.lat, p.lng)),
    });
    let mut builder = MapControllerBuilder::new()
        .with_config(config)
        .with_geolocation(host)
        .with_markers(markers);
    if let Some(path) = &args.storage {
        let store =
            FileStore::open(path).with_context(|| format!("opening {}", path.display()))?;
        builder = builder.with_storage(Box::new(store));
    }
    let mut map = builder.build()?;

    match map.start().await {
        Some(location) => println!(
            "location: {:.5}, {:.5}",
            location.latitude, location.longitude
        ),
        None => match map.error() {
            Some(error) => println!("location: unavailable ({})", error.code()),
            None => println!("location: unavailable"),
        },
    }

    let view = *map.viewport();
    println!(
        "viewport: center {:.5}, {:.5} zoom {}",
        view.center.lat, view.center.lng, view.zoom
    );

    let visible = map.get_markers_in_viewport();
    println!("markers in viewport: {}", visible.len());

    let clusters = map.get_clustered_markers_in_viewport();
    println!(
        "clusters: {} (radius {} km, enabled {})",
        clusters.len(),
        map.clustering().radius_km,
        map.clustering().enabled
    );
    for cluster in &clusters {
        println!(
            "  {} x{} at {:.5}, {:.5}",
            cluster.id,
            cluster.count(),
            cluster.center.lat,
            cluster.center.lng
        );
    }

    if map.location().is_some() {
        for (marker, km) in map.markers_near_location(5.0) {
            println!("  near: {} ({}) {:.2} km", marker.id, marker.payload.label(), km);
        }
    }

    if let Some(query) = &args.search {
        let hits = map.search_markers(query);
        println!("search {:?}: {} hits", query, hits.len());
        for marker in hits {
            println!("  {} [{}] {}", marker.id, marker.kind(), marker.payload.label());
        }
    }

    for event in map.drain_events() {
        log::debug!("{event:?}");
    }

    Ok(())
}
