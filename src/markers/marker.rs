use serde::{Deserialize, Serialize};

use crate::core::geo::LatLng;

/// Kind of entity a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    Event,
    Tribe,
    User,
    Venue,
}

impl MarkerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Tribe => "tribe",
            Self::User => "user",
            Self::Venue => "venue",
        }
    }
}

impl std::fmt::Display for MarkerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventInfo {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// RFC 3339 start time as sent by the events API
    pub starts_at: Option<String>,
    pub attendee_count: Option<u32>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TribeInfo {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub member_count: Option<u32>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub name: String,
    #[serde(alias = "bio")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueInfo {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub address: Option<String>,
}

/// Entity-specific marker data, keyed by marker type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum MarkerPayload {
    Event(EventInfo),
    Tribe(TribeInfo),
    User(UserInfo),
    Venue(VenueInfo),
}

impl MarkerPayload {
    pub fn kind(&self) -> MarkerType {
        match self {
            Self::Event(_) => MarkerType::Event,
            Self::Tribe(_) => MarkerType::Tribe,
            Self::User(_) => MarkerType::User,
            Self::Venue(_) => MarkerType::Venue,
        }
    }

    /// Events have a title, everything else a name
    pub fn label(&self) -> &str {
        match self {
            Self::Event(info) => &info.title,
            Self::Tribe(info) => &info.name,
            Self::User(info) => &info.name,
            Self::Venue(info) => &info.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Event(info) => info.description.as_deref(),
            Self::Tribe(info) => info.description.as_deref(),
            Self::User(info) => info.description.as_deref(),
            Self::Venue(info) => info.description.as_deref(),
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Event(info) => info.category.as_deref(),
            Self::Tribe(info) => info.category.as_deref(),
            Self::Venue(info) => info.category.as_deref(),
            Self::User(_) => None,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Self::Event(info) => &info.tags,
            Self::Tribe(info) => &info.tags,
            Self::User(info) => &info.tags,
            Self::Venue(info) => &info.tags,
        }
    }
}

/// Popup shown when a marker is tapped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Popup {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A geo-tagged entity placed on the map. `id` is unique within a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub position: LatLng,
    #[serde(flatten)]
    pub payload: MarkerPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup: Option<Popup>,
}

impl MapMarker {
    pub fn new(id: impl Into<String>, position: LatLng, payload: MarkerPayload) -> Self {
        Self {
            id: id.into(),
            position,
            payload,
            popup: None,
        }
    }

    pub fn event(id: impl Into<String>, position: LatLng, info: EventInfo) -> Self {
        Self::new(id, position, MarkerPayload::Event(info))
    }

    pub fn tribe(id: impl Into<String>, position: LatLng, info: TribeInfo) -> Self {
        Self::new(id, position, MarkerPayload::Tribe(info))
    }

    pub fn user(id: impl Into<String>, position: LatLng, info: UserInfo) -> Self {
        Self::new(id, position, MarkerPayload::User(info))
    }

    pub fn venue(id: impl Into<String>, position: LatLng, info: VenueInfo) -> Self {
        Self::new(id, position, MarkerPayload::Venue(info))
    }

    pub fn with_popup(mut self, popup: Popup) -> Self {
        self.popup = Some(popup);
        self
    }

    pub fn kind(&self) -> MarkerType {
        self.payload.kind()
    }

    /// Lower-cased title/name, description, category and tags joined by spaces.
    /// Missing fields contribute an empty string.
    pub fn searchable_text(&self) -> String {
        let payload = &self.payload;
        let tags = payload.tags().join(" ");
        let fields = [
            payload.label(),
            payload.description().unwrap_or_default(),
            payload.category().unwrap_or_default(),
            tags.as_str(),
        ];
        fields.join(" ").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jazz_night() -> MapMarker {
        MapMarker::event(
            "e1",
            LatLng::new(40.42, -3.70),
            EventInfo {
                title: "Jazz Night".into(),
                category: Some("Music".into()),
                tags: vec!["live".into(), "Saxophone".into()],
                ..EventInfo::default()
            },
        )
    }

    #[test]
    fn test_marker_kind_and_label() {
        let marker = jazz_night();

        assert_eq!(marker.kind(), MarkerType::Event);
        assert_eq!(marker.payload.label(), "Jazz Night");
        assert_eq!(marker.kind().to_string(), "event");
    }

    #[test]
    fn test_searchable_text() {
        let text = jazz_night().searchable_text();

        assert!(text.contains("jazz night"));
        assert!(text.contains("music"));
        assert!(text.contains("saxophone"));
    }

    #[test]
    fn test_marker_json_uses_type_and_data() {
        let json = r#"{
            "id": "t7",
            "position": { "lat": 41.39, "lng": 2.17 },
            "type": "tribe",
            "data": { "name": "Runners BCN", "member_count": 42 },
            "popup": { "title": "Runners BCN", "content": "Weekly runs" }
        }"#;

        let marker: MapMarker = serde_json::from_str(json).unwrap();

        assert_eq!(marker.id, "t7");
        assert_eq!(marker.kind(), MarkerType::Tribe);
        assert_eq!(marker.payload.label(), "Runners BCN");
        assert_eq!(marker.popup.as_ref().map(|p| p.content.as_str()), Some("Weekly runs"));
        match &marker.payload {
            MarkerPayload::Tribe(info) => assert_eq!(info.member_count, Some(42)),
            other => panic!("unexpected payload {other:?}"),
        }

        let value = serde_json::to_value(&marker).unwrap();
        assert_eq!(value["type"], "tribe");
        assert_eq!(value["data"]["name"], "Runners BCN");
    }

    #[test]
    fn test_user_bio_alias() {
        let marker: MapMarker = serde_json::from_str(
            r#"{ "id": "u1", "position": { "lat": 0.0, "lng": 0.0 },
                 "type": "user", "data": { "name": "Ana", "bio": "Loves salsa" } }"#,
        )
        .unwrap();

        assert_eq!(marker.payload.description(), Some("Loves salsa"));
        assert!(marker.payload.category().is_none());
    }
}
