//! Core location types.
//!
//! - [`Location`] - a single position fix, immutable once created
//! - [`LocationError`] - stable failure taxonomy for location acquisition

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::geo::LatLng;

/// A device position fix.
///
/// Later fixes supersede earlier ones; a `Location` is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in metres, when the host reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp: None,
        }
    }

    /// A fix stamped with the current wall-clock time
    pub fn now(latitude: f64, longitude: f64, accuracy: Option<f64>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok());

        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Age of the fix relative to `now_ms`, if it carries a timestamp
    pub fn age_ms(&self, now_ms: i64) -> Option<i64> {
        self.timestamp.map(|ts| now_ms.saturating_sub(ts))
    }
}

impl From<Location> for LatLng {
    fn from(value: Location) -> Self {
        value.position()
    }
}

/// Why a location could not be obtained.
///
/// These are recorded in provider state; they never cross the public API as
/// returned errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("location services are not supported on this host")]
    Unsupported,

    #[error("persisted location is corrupt: {0}")]
    StorageParse(String),
}

impl LocationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::PositionUnavailable => "POSITION_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::Unsupported => "UNSUPPORTED",
            Self::StorageParse(_) => "STORAGE_PARSE_ERROR",
        }
    }

    /// Maps the numeric codes used by browser-style geolocation hosts
    /// (1 = denied, 2 = unavailable, 3 = timeout).
    pub fn from_host_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }
}
