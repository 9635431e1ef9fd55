//! Geospatial math for the Voyage travel companion.
//!
//! This crate provides:
//! - Haversine great-circle distance between location fixes
//! - Accuracy-circle polygon generation for horizontal uncertainty
//! - The coordinate and fix value types shared across the workspace
//!
//! # Example
//!
//! ```
//! use voyage_geo::{distance_between, LocationFix};
//!
//! let berlin = LocationFix::new(52.5200, 13.4050, 12.0, 0);
//! let paris = LocationFix::new(48.8566, 2.3522, 12.0, 60_000);
//!
//! let distance = distance_between(&berlin, &paris);
//! assert!((distance.kilometers - 878.0).abs() < 10.0);
//! ```

mod circle;
mod error;
mod fix;
mod haversine;

pub use circle::{accuracy_circle, DEFAULT_CIRCLE_POINTS, METERS_PER_DEGREE_LAT};
pub use error::{GeoError, GeoErrorCode, Result};
pub use fix::LocationFix;
pub use haversine::{
    distance_between, haversine_distance_meters, DistanceResult, EARTH_RADIUS_M,
};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}
