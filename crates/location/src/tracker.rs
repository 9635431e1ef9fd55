//! Location tracking session state machine.
//!
//! A [`LocationTracker`] owns one tracking session at a time: the watch
//! handle of its position subscription, the append-only fix history, and the
//! values derived from it (distance from the session origin, accuracy circle
//! of the latest fix). Consumers read immutable snapshots or subscribe to
//! the broadcast event channel.
//!
//! # Session lifecycle
//!
//! ```text
//! Idle --start_tracking--> Tracking --stop_tracking--> Idle
//!   ^                         |
//!   +--- subscription error --+
//! ```
//!
//! Start and stop transitions are serialized per tracker by a single-flight
//! guard, so a `stop_tracking` issued while `start_tracking` is still
//! establishing its subscription runs after establishment completes. History
//! survives `stop_tracking` and is cleared by the next start.
//!
//! # Teardown
//!
//! Owners must call [`stop_tracking`] exactly once when the tracker is no
//! longer needed; it releases the underlying subscription.
//!
//! [`stop_tracking`]: LocationTracker::stop_tracking

use crate::error::{LocationError, Result};
use crate::options::PositionOptions;
use crate::source::PositionSource;
use crate::stream::{PositionStream, WatchHandle};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, Mutex};
use tokio::time::timeout;
use voyage_geo::{accuracy_circle, distance_between, Coordinate, DistanceResult, LocationFix};

/// Configuration for a location tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Number of points in derived accuracy circles.
    pub circle_points: usize,
    /// Capacity of the tracker event channel.
    pub event_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            circle_points: voyage_geo::DEFAULT_CIRCLE_POINTS,
            event_capacity: 16,
        }
    }
}

/// Events broadcast by a tracker.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// A fix was recorded into the session history.
    Fix(LocationFix),
    /// The provider terminated the subscription; the session has ended and
    /// will not be restarted automatically.
    SubscriptionEnded(LocationError),
}

/// Session state owned by one tracker.
struct SessionState {
    watch: Option<WatchHandle>,
    history: Vec<LocationFix>,
    distance_from_origin: Option<DistanceResult>,
    accuracy_circle: Vec<Coordinate>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            watch: None,
            history: Vec::new(),
            distance_from_origin: None,
            accuracy_circle: Vec::new(),
        }
    }

    fn reset_history(&mut self) {
        self.history.clear();
        self.distance_from_origin = None;
        self.accuracy_circle.clear();
    }
}

/// Tracking session state machine over a [`PositionSource`].
///
/// Each tracker owns its session state, so independent trackers can coexist
/// (one per map view, one per test). All operations are async but never
/// parallel from the caller's perspective: transitions are serialized by a
/// per-instance guard, and fixes are applied by a single drain task.
pub struct LocationTracker<S> {
    source: S,
    config: TrackerConfig,
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<TrackerEvent>,
    // Single-flight guard serializing start/stop transitions.
    transition: Mutex<()>,
}

impl<S: PositionSource> LocationTracker<S> {
    /// Creates a tracker with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, TrackerConfig::default())
    }

    /// Creates a tracker with a specific configuration.
    pub fn with_config(source: S, config: TrackerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            source,
            config,
            state: Arc::new(RwLock::new(SessionState::new())),
            events,
            transition: Mutex::new(()),
        }
    }

    /// Start a tracking session.
    ///
    /// Fails with [`LocationError::AlreadyTracking`] when a session is
    /// active; use [`restart_tracking`] to explicitly discard it. Any
    /// history retained from a previous session is cleared. The tracker
    /// transitions to tracking only once the subscription is established;
    /// on failure it stays idle and the error is returned.
    ///
    /// [`restart_tracking`]: LocationTracker::restart_tracking
    pub async fn start_tracking(&self, options: &PositionOptions) -> Result<()> {
        let _guard = self.transition.lock().await;
        if self.state.read().unwrap().watch.is_some() {
            return Err(LocationError::AlreadyTracking);
        }
        self.begin_session(options).await
    }

    /// Tear down any active session and start a new one.
    ///
    /// The explicit form of stop-then-start: the prior session's
    /// subscription is cancelled and its history discarded before the new
    /// subscription is opened.
    pub async fn restart_tracking(&self, options: &PositionOptions) -> Result<()> {
        let _guard = self.transition.lock().await;
        self.teardown();
        self.begin_session(options).await
    }

    /// Stop the active session.
    ///
    /// Cancels the subscription (idempotent) and clears the watch handle.
    /// History is retained until the next start. A no-op when idle. Local
    /// state cleanup is unconditional; provider-side cancellation problems
    /// never block the transition.
    pub async fn stop_tracking(&self) {
        let _guard = self.transition.lock().await;
        let mut state = self.state.write().unwrap();
        if let Some(watch) = state.watch.take() {
            watch.cancel();
            tracing::debug!(fixes = state.history.len(), "tracking session stopped");
        }
    }

    /// Fetch a one-shot position, independent of tracking state.
    ///
    /// Does not touch the session history. The fetch is bounded by
    /// `options.timeout`.
    pub async fn current_position(&self, options: &PositionOptions) -> Result<LocationFix> {
        match timeout(options.timeout, self.source.fetch_once(options)).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout(options.timeout)),
        }
    }

    /// Whether a tracking session is active.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state.read().unwrap().watch.is_some()
    }

    /// The most recent fix of the current (or retained) history.
    #[must_use]
    pub fn latest_fix(&self) -> Option<LocationFix> {
        self.state.read().unwrap().history.last().copied()
    }

    /// Snapshot of the session history, in arrival order.
    #[must_use]
    pub fn history(&self) -> Vec<LocationFix> {
        self.state.read().unwrap().history.clone()
    }

    /// Distance between the session origin and the latest fix.
    ///
    /// `None` until the session has recorded at least two fixes.
    #[must_use]
    pub fn distance_from_origin(&self) -> Option<DistanceResult> {
        self.state.read().unwrap().distance_from_origin
    }

    /// Accuracy circle of the latest fix; empty when no fix has arrived or
    /// the circle was not derivable (polar fix).
    #[must_use]
    pub fn accuracy_circle(&self) -> Vec<Coordinate> {
        self.state.read().unwrap().accuracy_circle.clone()
    }

    /// Subscribe to tracker events.
    ///
    /// Subscription errors are surfaced here as
    /// [`TrackerEvent::SubscriptionEnded`]; the tracker never retries on its
    /// own.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    async fn begin_session(&self, options: &PositionOptions) -> Result<()> {
        self.state.write().unwrap().reset_history();

        let subscribe = self.source.subscribe(options);
        let (stream, watch) = match timeout(options.timeout, subscribe).await {
            Ok(result) => result?,
            Err(_) => return Err(LocationError::Timeout(options.timeout)),
        };

        self.state.write().unwrap().watch = Some(watch.clone());
        self.spawn_drain(stream, watch);
        tracing::debug!("tracking session started");
        Ok(())
    }

    // Caller must hold the transition guard.
    fn teardown(&self) {
        let mut state = self.state.write().unwrap();
        if let Some(watch) = state.watch.take() {
            watch.cancel();
        }
        state.reset_history();
    }

    fn spawn_drain(&self, mut stream: PositionStream, watch: WatchHandle) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let circle_points = self.config.circle_points;

        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(fix) => {
                        if record_fix(&state, &watch, fix, circle_points) {
                            let _ = events.send(TrackerEvent::Fix(fix));
                        }
                    }
                    Err(err) => {
                        let was_live = {
                            let mut s = state.write().unwrap();
                            if watch.is_cancelled() {
                                false
                            } else {
                                watch.cancel();
                                s.watch = None;
                                true
                            }
                        };
                        if was_live {
                            tracing::warn!(error = %err, "position subscription terminated");
                            let _ = events.send(TrackerEvent::SubscriptionEnded(err));
                        } else {
                            tracing::debug!(error = %err, "late subscription error after teardown");
                        }
                        return;
                    }
                }
            }
        });
    }
}

/// Apply a fix to the session under the state lock.
///
/// Returns false when the session was torn down while the fix was in
/// flight; the token check under the lock drops such stragglers.
fn record_fix(
    state: &RwLock<SessionState>,
    watch: &WatchHandle,
    fix: LocationFix,
    circle_points: usize,
) -> bool {
    let mut s = state.write().unwrap();
    if watch.is_cancelled() {
        return false;
    }

    s.history.push(fix);
    s.accuracy_circle = match accuracy_circle(&fix, circle_points) {
        Ok(points) => points,
        Err(err) => {
            tracing::warn!(error = %err, "accuracy circle unavailable for fix");
            Vec::new()
        }
    };
    if s.history.len() >= 2 {
        s.distance_from_origin = Some(distance_between(&s.history[0], &fix));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::{ReplaySource, ReplayStep};
    use crate::source::RawPosition;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// Source whose stream is fed by the test, one fix at a time, so
    /// assertions can run between deliveries.
    struct ManualSource {
        stream: std::sync::Mutex<Option<PositionStream>>,
    }

    impl ManualSource {
        fn new() -> (Self, mpsc::Sender<Result<LocationFix>>) {
            let (tx, stream) = PositionStream::channel();
            (
                Self {
                    stream: std::sync::Mutex::new(Some(stream)),
                },
                tx,
            )
        }
    }

    #[async_trait]
    impl PositionSource for ManualSource {
        async fn fetch_once(&self, _options: &PositionOptions) -> Result<LocationFix> {
            Err(LocationError::unavailable("manual source is subscribe-only"))
        }

        async fn subscribe(
            &self,
            _options: &PositionOptions,
        ) -> Result<(PositionStream, WatchHandle)> {
            let stream = self
                .stream
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| LocationError::unavailable("already subscribed"))?;
            Ok((stream, WatchHandle::new()))
        }
    }

    fn equator_walk(steps: usize) -> Vec<RawPosition> {
        (0..steps)
            .map(|i| {
                RawPosition::new(0.0, i as f64 * 0.001)
                    .with_accuracy(10.0)
                    .with_timestamp_ms(i as i64 * 1000)
            })
            .collect()
    }

    async fn recv_fixes(
        events: &mut broadcast::Receiver<TrackerEvent>,
        count: usize,
    ) -> Vec<LocationFix> {
        let mut fixes = Vec::new();
        while fixes.len() < count {
            match events.recv().await.unwrap() {
                TrackerEvent::Fix(fix) => fixes.push(fix),
                TrackerEvent::SubscriptionEnded(err) => {
                    panic!("subscription ended early: {err}")
                }
            }
        }
        fixes
    }

    #[tokio::test]
    async fn test_each_fix_grows_history_by_one() {
        let tracker = LocationTracker::new(ReplaySource::from_fixes(equator_walk(4)));
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        assert!(tracker.is_tracking());

        let fixes = recv_fixes(&mut events, 4).await;
        tracker.stop_tracking().await;

        // One history entry per delivered fix, in arrival order.
        assert_eq!(tracker.history(), fixes);
    }

    #[tokio::test]
    async fn test_distance_undefined_until_second_fix() {
        let (source, tx) = ManualSource::new();
        let tracker = LocationTracker::new(source);
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();

        tx.send(Ok(LocationFix::new(0.0, 0.0, 10.0, 0))).await.unwrap();
        recv_fixes(&mut events, 1).await;
        assert_eq!(tracker.history().len(), 1);
        assert!(tracker.distance_from_origin().is_none());

        tx.send(Ok(LocationFix::new(0.0, 0.001, 10.0, 1000))).await.unwrap();
        recv_fixes(&mut events, 1).await;
        let second = tracker.distance_from_origin().unwrap();
        assert_eq!(second.meters, 111);

        // Third fix: recomputed against the origin, not the previous fix.
        tx.send(Ok(LocationFix::new(0.0, 0.002, 10.0, 2000))).await.unwrap();
        recv_fixes(&mut events, 1).await;
        let third = tracker.distance_from_origin().unwrap();
        assert_eq!(third.meters, 223);

        tracker.stop_tracking().await;
    }

    #[tokio::test]
    async fn test_example_scenario_meters_and_kilometers() {
        let fixes = vec![
            RawPosition::new(0.0, 0.0).with_accuracy(10.0).with_timestamp_ms(0),
            RawPosition::new(0.0, 0.001).with_accuracy(10.0).with_timestamp_ms(1000),
        ];
        let tracker = LocationTracker::new(ReplaySource::from_fixes(fixes));
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        recv_fixes(&mut events, 2).await;
        tracker.stop_tracking().await;

        let distance = tracker.distance_from_origin().unwrap();
        assert_eq!(distance.meters, 111);
        assert_eq!(distance.kilometers, 0.11);
    }

    #[tokio::test]
    async fn test_accuracy_circle_follows_latest_fix() {
        let tracker = LocationTracker::new(ReplaySource::from_fixes(equator_walk(2)));
        let mut events = tracker.subscribe_events();

        assert!(tracker.accuracy_circle().is_empty());
        tracker.start_tracking(&PositionOptions::default()).await.unwrap();

        recv_fixes(&mut events, 2).await;
        let circle = tracker.accuracy_circle();
        assert_eq!(circle.len(), voyage_geo::DEFAULT_CIRCLE_POINTS);
        // Centered on the latest fix, not the origin.
        let latest = tracker.latest_fix().unwrap();
        let mean_lng: f64 =
            circle.iter().map(|c| c.longitude).sum::<f64>() / circle.len() as f64;
        assert!((mean_lng - latest.longitude).abs() < 1e-6);

        tracker.stop_tracking().await;
    }

    #[tokio::test]
    async fn test_start_while_tracking_fails() {
        let tracker = LocationTracker::new(ReplaySource::from_fixes(equator_walk(2)));
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        recv_fixes(&mut events, 2).await;

        let err = tracker
            .start_tracking(&PositionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::AlreadyTracking));
        // The running session is untouched.
        assert!(tracker.is_tracking());
        assert_eq!(tracker.history().len(), 2);

        tracker.stop_tracking().await;
    }

    #[tokio::test]
    async fn test_restart_discards_previous_history() {
        let tracker = LocationTracker::new(ReplaySource::from_fixes(equator_walk(3)));
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        recv_fixes(&mut events, 3).await;
        assert_eq!(tracker.history().len(), 3);

        let mut events = tracker.subscribe_events();
        tracker.restart_tracking(&PositionOptions::default()).await.unwrap();

        let replayed = recv_fixes(&mut events, 3).await;
        tracker.stop_tracking().await;

        // History restarted from zero: only the new session's fixes remain.
        assert_eq!(tracker.history(), replayed);
        assert_eq!(tracker.history().len(), 3);
    }

    #[tokio::test]
    async fn test_stop_when_never_started_is_noop() {
        let tracker = LocationTracker::new(ReplaySource::from_fixes(equator_walk(1)));
        tracker.stop_tracking().await;
        assert!(!tracker.is_tracking());
        assert!(tracker.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_survives_stop_and_clears_on_next_start() {
        let tracker = LocationTracker::new(ReplaySource::from_fixes(equator_walk(2)));
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        recv_fixes(&mut events, 2).await;
        tracker.stop_tracking().await;

        // Observable after stop.
        assert!(!tracker.is_tracking());
        assert_eq!(tracker.history().len(), 2);
        assert!(tracker.distance_from_origin().is_some());

        // Cleared by the next start: after the new session replays its two
        // fixes the history holds two entries, not four.
        let mut events = tracker.subscribe_events();
        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        recv_fixes(&mut events, 2).await;
        tracker.stop_tracking().await;
        assert_eq!(tracker.history().len(), 2);
    }

    #[tokio::test]
    async fn test_subscription_error_ends_session() {
        let source = ReplaySource::with_script(vec![
            ReplayStep::Fix(RawPosition::new(0.0, 0.0).with_accuracy(5.0)),
            ReplayStep::Fail("provider lost the device".into()),
        ]);
        let tracker = LocationTracker::new(source);
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();

        let mut saw_fix = false;
        loop {
            match events.recv().await.unwrap() {
                TrackerEvent::Fix(_) => saw_fix = true,
                TrackerEvent::SubscriptionEnded(err) => {
                    assert!(err.is_subscription_terminated());
                    break;
                }
            }
        }
        assert!(saw_fix);
        assert!(!tracker.is_tracking());
        // Partial history is retained for inspection.
        assert_eq!(tracker.history().len(), 1);

        // The tracker is idle again; a fresh start succeeds.
        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        tracker.stop_tracking().await;
    }

    #[tokio::test]
    async fn test_failed_subscribe_stays_idle() {
        let tracker = LocationTracker::new(ReplaySource::denying_permission());
        let err = tracker
            .start_tracking(&PositionOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert!(!tracker.is_tracking());
    }

    #[tokio::test]
    async fn test_current_position_ignores_session_state() {
        let tracker = LocationTracker::new(ReplaySource::from_fixes(equator_walk(2)));
        let options = PositionOptions::default();

        // Idle: works, history untouched.
        let fix = tracker.current_position(&options).await.unwrap();
        assert_eq!(fix.longitude, 0.0);
        assert!(tracker.history().is_empty());

        // Tracking: still works, history unaffected by the one-shot.
        let mut events = tracker.subscribe_events();
        tracker.start_tracking(&options).await.unwrap();
        recv_fixes(&mut events, 2).await;
        let len_before = tracker.history().len();
        tracker.current_position(&options).await.unwrap();
        assert_eq!(tracker.history().len(), len_before);

        tracker.stop_tracking().await;
    }

    #[tokio::test]
    async fn test_independent_trackers_do_not_share_state() {
        let a = LocationTracker::new(ReplaySource::from_fixes(equator_walk(2)));
        let b = LocationTracker::new(ReplaySource::from_fixes(equator_walk(1)));
        let mut events_a = a.subscribe_events();
        let mut events_b = b.subscribe_events();

        a.start_tracking(&PositionOptions::default()).await.unwrap();
        b.start_tracking(&PositionOptions::default()).await.unwrap();
        recv_fixes(&mut events_a, 2).await;
        recv_fixes(&mut events_b, 1).await;

        assert_eq!(a.history().len(), 2);
        assert_eq!(b.history().len(), 1);

        a.stop_tracking().await;
        b.stop_tracking().await;
    }

    #[tokio::test]
    async fn test_config_controls_circle_cardinality() {
        let config = TrackerConfig {
            circle_points: 8,
            ..TrackerConfig::default()
        };
        let tracker =
            LocationTracker::with_config(ReplaySource::from_fixes(equator_walk(1)), config);
        let mut events = tracker.subscribe_events();

        tracker.start_tracking(&PositionOptions::default()).await.unwrap();
        recv_fixes(&mut events, 1).await;
        assert_eq!(tracker.accuracy_circle().len(), 8);

        tracker.stop_tracking().await;
    }
}
