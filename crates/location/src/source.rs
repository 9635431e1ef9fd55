//! Position source contract and raw sample normalization.

use crate::error::Result;
use crate::options::PositionOptions;
use crate::stream::{PositionStream, WatchHandle};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use voyage_geo::LocationFix;

/// Raw sample as reported by a platform geolocation provider.
///
/// Providers differ in what they report: accuracy and timestamps are both
/// optional here and filled in by [`normalize`].
///
/// [`normalize`]: RawPosition::normalize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
    /// Reported horizontal accuracy in meters, when available.
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Sample time in epoch milliseconds, when available.
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
}

impl RawPosition {
    /// Creates a raw sample with no accuracy or timestamp metadata.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp_ms: None,
        }
    }

    /// Attach a reported accuracy in meters.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Attach a sample timestamp in epoch milliseconds.
    #[must_use]
    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// Normalize into an immutable [`LocationFix`].
    ///
    /// Missing accuracy becomes 0 (unknown); a missing timestamp is stamped
    /// with the current wall clock.
    pub fn normalize(&self) -> LocationFix {
        LocationFix::new(
            self.latitude,
            self.longitude,
            self.accuracy.unwrap_or(0.0),
            self.timestamp_ms
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        )
    }
}

/// Contract a [`LocationTracker`] relies on from a platform geolocation
/// provider.
///
/// Permission denial and timeout are the two failure modes the core
/// surfaces; it resolves neither. Implementations bridge to a real platform
/// API; [`ReplaySource`] is the in-repo scripted implementation.
///
/// [`LocationTracker`]: crate::LocationTracker
/// [`ReplaySource`]: crate::ReplaySource
#[async_trait]
pub trait PositionSource: Send + Sync + 'static {
    /// Fetch a single fix.
    ///
    /// Fails with [`PermissionDenied`] when the platform denies access and
    /// [`PositionUnavailable`] when the provider cannot produce a position.
    ///
    /// [`PermissionDenied`]: crate::LocationError::PermissionDenied
    /// [`PositionUnavailable`]: crate::LocationError::PositionUnavailable
    async fn fetch_once(&self, options: &PositionOptions) -> Result<LocationFix>;

    /// Open a continuous subscription.
    ///
    /// Returns the fix stream and its cancellation handle separately. The
    /// stream yields every raw sample until cancelled, and yields an error
    /// at most once, after which the subscription is terminated and must be
    /// restarted by a fresh `subscribe` call.
    async fn subscribe(&self, options: &PositionOptions)
        -> Result<(PositionStream, WatchHandle)>;
}
