//! Location fix value type.

use crate::Coordinate;
use serde::{Deserialize, Serialize};

/// A single geolocation sample.
///
/// Fixes are immutable snapshots: latitude and longitude in degrees, the
/// horizontal accuracy radius in meters (0 when the platform did not report
/// one), and the sample time in milliseconds since the Unix epoch.
///
/// Timestamps are non-decreasing within a tracking session by source
/// contract; that contract is not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
    /// Horizontal accuracy radius in meters; 0 when unknown.
    pub accuracy: f64,
    /// Sample time in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl LocationFix {
    /// Creates a new fix. Negative accuracy values are clamped to 0.
    #[inline]
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: accuracy.max(0.0),
            timestamp_ms,
        }
    }

    /// The fix position as a plain coordinate.
    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Returns true if the fix position and accuracy have valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.coordinate().is_valid() && self.accuracy >= 0.0
    }
}
