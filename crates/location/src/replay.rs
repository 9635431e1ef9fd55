//! Scripted position source for tests and replay tooling.

use crate::error::{LocationError, Result};
use crate::options::PositionOptions;
use crate::source::{PositionSource, RawPosition};
use crate::stream::{PositionStream, WatchHandle};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use voyage_geo::LocationFix;

/// A scripted step in a replay.
#[derive(Debug, Clone)]
pub enum ReplayStep {
    /// Emit a raw sample.
    Fix(RawPosition),
    /// Fail the subscription with a provider error and terminate.
    Fail(String),
}

/// Position source that replays a fixed script.
///
/// Serves as the crate's test double and drives the `voyage-track` replay
/// command. Fixes are emitted in script order, optionally spaced by an
/// interval; after the script is exhausted the watch stays open until
/// cancelled, like a real provider that has gone quiet.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    script: Vec<ReplayStep>,
    interval: Duration,
    deny_permission: bool,
}

impl ReplaySource {
    /// Source that replays the given script.
    pub fn with_script(script: Vec<ReplayStep>) -> Self {
        Self {
            script,
            interval: Duration::ZERO,
            deny_permission: false,
        }
    }

    /// Source that replays the given raw samples in order.
    pub fn from_fixes(fixes: impl IntoIterator<Item = RawPosition>) -> Self {
        Self::with_script(fixes.into_iter().map(ReplayStep::Fix).collect())
    }

    /// Source that denies the location permission on every request.
    pub fn denying_permission() -> Self {
        Self {
            script: Vec::new(),
            interval: Duration::ZERO,
            deny_permission: true,
        }
    }

    /// Space emitted fixes by this interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[async_trait]
impl PositionSource for ReplaySource {
    async fn fetch_once(&self, _options: &PositionOptions) -> Result<LocationFix> {
        if self.deny_permission {
            return Err(LocationError::PermissionDenied);
        }
        self.script
            .iter()
            .find_map(|step| match step {
                ReplayStep::Fix(raw) => Some(raw.normalize()),
                ReplayStep::Fail(_) => None,
            })
            .ok_or_else(|| LocationError::unavailable("replay script has no fixes"))
    }

    async fn subscribe(
        &self,
        _options: &PositionOptions,
    ) -> Result<(PositionStream, WatchHandle)> {
        if self.deny_permission {
            return Err(LocationError::PermissionDenied);
        }

        let (tx, stream) = PositionStream::channel();
        let handle = WatchHandle::new();
        let token = handle.token();
        let script = self.script.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            for step in script {
                if interval > Duration::ZERO {
                    tokio::select! {
                        _ = token.cancelled() => return,
                        _ = sleep(interval) => {}
                    }
                } else if token.is_cancelled() {
                    return;
                }

                match step {
                    ReplayStep::Fix(raw) => {
                        if tx.send(Ok(raw.normalize())).await.is_err() {
                            return;
                        }
                    }
                    ReplayStep::Fail(reason) => {
                        let _ = tx.send(Err(LocationError::terminated(reason))).await;
                        return;
                    }
                }
            }
            // Script exhausted: hold the watch open until cancelled.
            token.cancelled().await;
        });

        Ok((stream, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk() -> Vec<RawPosition> {
        vec![
            RawPosition::new(0.0, 0.0).with_accuracy(10.0).with_timestamp_ms(0),
            RawPosition::new(0.0, 0.001).with_accuracy(10.0).with_timestamp_ms(1000),
            RawPosition::new(0.0, 0.002).with_accuracy(10.0).with_timestamp_ms(2000),
        ]
    }

    #[test]
    fn test_fetch_once_returns_first_fix() {
        let source = ReplaySource::from_fixes(walk());
        let fix =
            tokio_test::block_on(source.fetch_once(&PositionOptions::default())).unwrap();
        assert_eq!(fix.longitude, 0.0);
        assert_eq!(fix.accuracy, 10.0);
    }

    #[tokio::test]
    async fn test_fetch_once_on_empty_script_is_unavailable() {
        let source = ReplaySource::from_fixes([]);
        let err = source.fetch_once(&PositionOptions::default()).await.unwrap_err();
        assert!(matches!(err, LocationError::PositionUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_denied_permission_fails_both_paths() {
        let source = ReplaySource::denying_permission();
        let options = PositionOptions::default();
        assert!(source.fetch_once(&options).await.unwrap_err().is_permission_denied());
        assert!(source.subscribe(&options).await.unwrap_err().is_permission_denied());
    }

    #[tokio::test]
    async fn test_subscribe_replays_in_order() {
        let source = ReplaySource::from_fixes(walk());
        let (mut stream, handle) = source.subscribe(&PositionOptions::default()).await.unwrap();

        for expected_lng in [0.0, 0.001, 0.002] {
            let fix = stream.next().await.unwrap().unwrap();
            assert_eq!(fix.longitude, expected_lng);
        }
        handle.cancel();
    }

    #[tokio::test]
    async fn test_fail_step_terminates_stream() {
        let source = ReplaySource::with_script(vec![
            ReplayStep::Fix(RawPosition::new(1.0, 1.0)),
            ReplayStep::Fail("provider crashed".into()),
        ]);
        let (mut stream, handle) = source.subscribe(&PositionOptions::default()).await.unwrap();

        assert!(matches!(stream.next().await, Some(Ok(_))));
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_subscription_terminated());
        assert!(stream.next().await.is_none());
        handle.cancel();
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let source = ReplaySource::from_fixes(walk()).with_interval(Duration::from_secs(60));
        let (mut stream, handle) = source.subscribe(&PositionOptions::default()).await.unwrap();

        // Cancel while the producer is still waiting out the first interval.
        handle.cancel();
        assert!(stream.next().await.is_none());
    }
}
