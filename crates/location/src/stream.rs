//! Subscription stream and cancellation handle.
//!
//! A continuous position subscription is expressed as a stream of fixes plus
//! a separate cancellation handle, rather than a platform-specific watch
//! object. The stream is finite only by cancellation or a provider error;
//! restarting means creating a new subscription.

use crate::error::LocationError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use voyage_geo::LocationFix;

/// Buffer between a position source and its consumer. Human-scale GPS
/// sampling (~1 Hz) never fills this; a stalled consumer blocks the source.
pub(crate) const STREAM_BUFFER: usize = 16;

/// Cancellation handle for a position subscription.
///
/// Cancellation is cooperative and idempotent: calling [`cancel`] more than
/// once, or on a watch that never delivered a fix, is safe.
///
/// [`cancel`]: WatchHandle::cancel
#[derive(Debug, Clone)]
pub struct WatchHandle {
    token: CancellationToken,
}

impl WatchHandle {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Cancel the subscription. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token for source implementations to observe cancellation.
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Stream of fixes from a continuous subscription.
///
/// Yields `Ok(fix)` per raw sample with no deduplication or rate limiting.
/// Yields `Err` at most once; after that the subscription is terminated and
/// [`next`] returns `None` until a new subscription is created.
///
/// [`next`]: PositionStream::next
#[derive(Debug)]
pub struct PositionStream {
    rx: mpsc::Receiver<Result<LocationFix, LocationError>>,
    terminated: bool,
}

impl PositionStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<LocationFix, LocationError>>) -> Self {
        Self {
            rx,
            terminated: false,
        }
    }

    /// Channel pair for source implementations.
    pub(crate) fn channel() -> (
        mpsc::Sender<Result<LocationFix, LocationError>>,
        PositionStream,
    ) {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        (tx, PositionStream::new(rx))
    }

    /// Receive the next fix or the terminal error.
    ///
    /// Returns `None` once the subscription has been cancelled or has
    /// already terminated with an error.
    pub async fn next(&mut self) -> Option<Result<LocationFix, LocationError>> {
        if self.terminated {
            return None;
        }
        match self.rx.recv().await {
            Some(Ok(fix)) => Some(Ok(fix)),
            Some(Err(err)) => {
                self.terminated = true;
                Some(Err(err))
            }
            None => {
                self.terminated = true;
                None
            }
        }
    }
}
