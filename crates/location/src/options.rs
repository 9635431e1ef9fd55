//! Position request options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for one-shot fetches and watch establishment.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);

/// Options for one-shot fetches and watch establishment.
///
/// Mirrors the platform geolocation option surface. The timeout guards the
/// initial response only; an established watch runs without a deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOptions {
    /// Request the most precise fix available (may cost battery).
    pub high_accuracy: bool,
    /// Timeout for one-shot fetches and watch establishment.
    pub timeout: Duration,
    /// Maximum acceptable age of a cached fix before a fresh one is required.
    pub maximum_age: Option<Duration>,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: DEFAULT_FETCH_TIMEOUT,
            maximum_age: None,
        }
    }
}

impl PositionOptions {
    /// Options requesting the most precise fix available.
    pub fn high_accuracy() -> Self {
        Self {
            high_accuracy: true,
            ..Self::default()
        }
    }

    /// Override the fetch/establishment timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept cached fixes up to this age.
    #[must_use]
    pub fn with_maximum_age(mut self, maximum_age: Duration) -> Self {
        self.maximum_age = Some(maximum_age);
        self
    }
}
