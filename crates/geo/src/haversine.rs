//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::{Coordinate, LocationFix};
use serde::{Deserialize, Serialize};

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two fixes, rounded for display.
///
/// `meters` is rounded to the nearest integer; `kilometers` is the rounded
/// meter value divided by 1000, rounded to two decimal places. Derived from
/// fixes on demand and never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Distance in whole meters.
    pub meters: u64,
    /// Distance in kilometers, two decimal places.
    pub kilometers: f64,
}

impl DistanceResult {
    /// Zero distance.
    pub const ZERO: Self = Self {
        meters: 0,
        kilometers: 0.0,
    };

    /// Rounds a raw meter value into a display result.
    #[inline]
    pub fn from_meters(meters: f64) -> Self {
        let meters = meters.max(0.0).round() as u64;
        let kilometers = (meters as f64 / 1000.0 * 100.0).round() / 100.0;
        Self { meters, kilometers }
    }
}

/// Calculates the great-circle distance between two fixes.
///
/// Uses the Haversine formula with a spherical Earth. The result is symmetric
/// and zero for identical coordinates.
///
/// # Arguments
/// * `a` - Starting fix
/// * `b` - Ending fix
///
/// # Example
/// ```
/// use voyage_geo::{distance_between, LocationFix};
///
/// let origin = LocationFix::new(0.0, 0.0, 10.0, 0);
/// let east = LocationFix::new(0.0, 1.0, 10.0, 1_000);
///
/// // One degree of longitude at the equator: 2π·R / 360
/// let distance = distance_between(&origin, &east);
/// assert!((distance.meters as i64 - 111_195).abs() < 50);
/// ```
#[inline]
pub fn distance_between(a: &LocationFix, b: &LocationFix) -> DistanceResult {
    DistanceResult::from_meters(haversine_distance_meters(&a.coordinate(), &b.coordinate()))
}

/// Calculates the great-circle distance between two coordinates in meters.
///
/// # Arguments
/// * `from` - Starting coordinate
/// * `to` - Ending coordinate
///
/// # Returns
/// Distance in meters
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
