use crate::core::geo::{LatLng, MapBounds};
use crate::location::types::{Location, LocationError};

/// State changes recorded by the controller for the rendering layer.
///
/// View events always carry center and zoom together, so a consumer never
/// observes one without the other.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Center and/or zoom changed
    ViewChanged { center: LatLng, zoom: i32 },
    /// Explicit bounds were set through `fit_bounds`
    BoundsChanged { bounds: MapBounds },
    MarkerAdded { id: String },
    /// An existing id was upserted with new content
    MarkerUpdated { id: String },
    MarkerRemoved { id: String },
    MarkersCleared,
    SelectionChanged { id: Option<String> },
    LocationUpdated { location: Location },
    LocationFailed { error: LocationError },
}

impl MapEvent {
    /// Whether the event affects what the camera shows
    pub fn is_view_event(&self) -> bool {
        matches!(self, Self::ViewChanged { .. } | Self::BoundsChanged { .. })
    }
}
