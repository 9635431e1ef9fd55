//! Error types for the location crate.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for location operations.
pub type Result<T> = std::result::Result<T, LocationError>;

/// Location subsystem errors.
///
/// One-shot fetch failures propagate to the caller directly. Continuous
/// subscription failures terminate the session and are surfaced on the
/// tracker's event channel. Nothing here is retried automatically.
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    /// The platform denied the location permission
    #[error("Location permission denied")]
    PermissionDenied,

    /// The provider could not produce a position
    #[error("Position unavailable: {reason}")]
    PositionUnavailable {
        /// Provider-reported reason
        reason: String,
    },

    /// A one-shot fetch or watch establishment timed out
    #[error("Position request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider reported an error on an active watch
    #[error("Position subscription terminated: {reason}")]
    SubscriptionTerminated {
        /// Provider-reported reason
        reason: String,
    },

    /// A tracking session is already active on this tracker
    #[error("Tracking already active - stop it or call restart_tracking")]
    AlreadyTracking,
}

impl LocationError {
    /// Create a position-unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::PositionUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a subscription-terminated error
    pub fn terminated(reason: impl Into<String>) -> Self {
        Self::SubscriptionTerminated {
            reason: reason.into(),
        }
    }

    /// Check if this error is a permission failure
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    /// Check if this error is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this error ends an active subscription
    #[must_use]
    pub fn is_subscription_terminated(&self) -> bool {
        matches!(self, Self::SubscriptionTerminated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(LocationError::PermissionDenied.is_permission_denied());
        assert!(LocationError::Timeout(Duration::from_secs(5)).is_timeout());
        assert!(LocationError::terminated("gps off").is_subscription_terminated());
        assert!(!LocationError::unavailable("no signal").is_timeout());
    }

    #[test]
    fn test_display() {
        let err = LocationError::unavailable("no satellites");
        assert_eq!(err.to_string(), "Position unavailable: no satellites");
    }
}
