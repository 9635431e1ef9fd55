//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Clone, Error)]
pub enum GeoError {
    /// Coordinate outside the valid latitude/longitude ranges
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Circle center on a pole, where the longitude scale degenerates
    #[error("Latitude {0}° is too close to a pole for accuracy-circle generation")]
    PolarLatitude(f64),
}

/// Error code for integration with workspace error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate values
    InvalidCoordinate = 10001,
    /// Polar circle center
    PolarLatitude = 10002,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::PolarLatitude(_) => GeoErrorCode::PolarLatitude,
        }
    }
}
