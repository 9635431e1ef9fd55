//! Location tracking for the Voyage travel companion.
//!
//! This crate provides:
//! - [`PositionSource`] - the contract a platform geolocation provider must
//!   satisfy: one-shot fetches and cancellable continuous subscriptions
//! - [`LocationTracker`] - the tracking session state machine: fix history,
//!   derived origin distance and accuracy circle, broadcast events
//! - [`ReplaySource`] - a scripted source for tests and replay tooling
//!
//! Position data flows one way: a source emits raw samples, the tracker
//! normalizes and stores them, and consumers read immutable snapshots or
//! subscribe to [`TrackerEvent`]s. The tracker never retries on its own;
//! retry policy belongs to the caller.
//!
//! # Example
//!
//! ```
//! use voyage_location::{LocationTracker, PositionOptions, RawPosition, ReplaySource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = ReplaySource::from_fixes([
//!     RawPosition::new(0.0, 0.0),
//!     RawPosition::new(0.0, 0.001),
//! ]);
//! let tracker = LocationTracker::new(source);
//! let mut events = tracker.subscribe_events();
//!
//! tracker.start_tracking(&PositionOptions::default()).await.unwrap();
//! events.recv().await.unwrap();
//! events.recv().await.unwrap();
//! tracker.stop_tracking().await;
//!
//! let distance = tracker.distance_from_origin().unwrap();
//! assert_eq!(distance.meters, 111);
//! # }
//! ```

mod error;
mod options;
mod replay;
mod source;
mod stream;
mod tracker;

pub use error::{LocationError, Result};
pub use options::{PositionOptions, DEFAULT_FETCH_TIMEOUT};
pub use replay::{ReplaySource, ReplayStep};
pub use source::{PositionSource, RawPosition};
pub use stream::{PositionStream, WatchHandle};
pub use tracker::{LocationTracker, TrackerConfig, TrackerEvent};
