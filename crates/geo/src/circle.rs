//! Accuracy-circle polygon generation.
//!
//! Approximates the horizontal uncertainty radius reported with a fix as an
//! ordered polygon of latitude/longitude points, suitable for rendering as a
//! map overlay.

use crate::error::{GeoError, Result};
use crate::{Coordinate, LocationFix};

/// Default polygon cardinality for accuracy circles.
pub const DEFAULT_CIRCLE_POINTS: usize = 32;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

// Longitude scaling divides by cos(latitude); below this the center is
// effectively on a pole and the scale factor is meaningless.
const POLAR_COS_EPSILON: f64 = 1e-9;

/// Generates a polygon approximating the accuracy radius around a fix.
///
/// Point `i` of `point_count` sits at angle `i/point_count * 2π`, offset from
/// the center by the fix accuracy converted to degrees. The conversion uses
/// the local meters-per-degree scale, so the approximation degrades for very
/// large radii and at high latitudes.
///
/// # Arguments
/// * `center` - The fix whose accuracy radius is drawn
/// * `point_count` - Polygon cardinality; at least 3 makes a meaningful
///   polygon, 0 yields an empty sequence
///
/// # Errors
/// * [`GeoError::InvalidCoordinate`] when the center is out of range
/// * [`GeoError::PolarLatitude`] when the center is on a pole, where the
///   longitude scale degenerates
///
/// # Example
/// ```
/// use voyage_geo::{accuracy_circle, LocationFix, DEFAULT_CIRCLE_POINTS};
///
/// let fix = LocationFix::new(52.52, 13.405, 25.0, 0);
/// let circle = accuracy_circle(&fix, DEFAULT_CIRCLE_POINTS).unwrap();
/// assert_eq!(circle.len(), 32);
/// ```
pub fn accuracy_circle(center: &LocationFix, point_count: usize) -> Result<Vec<Coordinate>> {
    if point_count == 0 {
        return Ok(Vec::new());
    }
    if !center.is_valid() {
        return Err(GeoError::InvalidCoordinate(format!(
            "({}, {})",
            center.latitude, center.longitude
        )));
    }

    let lat_cos = center.latitude.to_radians().cos();
    if lat_cos.abs() < POLAR_COS_EPSILON {
        return Err(GeoError::PolarLatitude(center.latitude));
    }

    let radius = center.accuracy;
    let lat_scale = radius / METERS_PER_DEGREE_LAT;
    let lng_scale = radius / (METERS_PER_DEGREE_LAT * lat_cos);

    let mut points = Vec::with_capacity(point_count);
    for i in 0..point_count {
        let angle = (i as f64 / point_count as f64) * std::f64::consts::TAU;
        points.push(Coordinate::new(
            center.latitude + lat_scale * angle.cos(),
            center.longitude + lng_scale * angle.sin(),
        ));
    }
    Ok(points)
}
