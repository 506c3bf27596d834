//! Geo-tagged entities shown on the map and the store that owns them.

pub mod marker;
pub mod store;

pub use marker::{
    EventInfo, MapMarker, MarkerPayload, MarkerType, Popup, TribeInfo, UserInfo, VenueInfo,
};
pub use store::MarkerStore;
