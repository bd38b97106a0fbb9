use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use super::aggregate::Aggregator;
use super::types::{LiveStats, Sample, TestResults};
use crate::error::MetricsError;

pub const LIVE_UPDATE_INTERVAL: Duration = Duration::from_millis(250);
const RPS_WINDOW: Duration = Duration::from_secs(1);

pub struct CollectorConfig {
    pub started: Instant,
    pub target: Duration,
    /// Workers currently running, maintained by the runner.
    pub active_users: Arc<AtomicU64>,
    pub live_tx: Option<watch::Sender<LiveStats>>,
}

/// Spawns the task that owns the aggregator. It returns the final results
/// once every sample sender has been dropped.
#[must_use]
pub fn spawn_collector(
    config: CollectorConfig,
    mut samples_rx: mpsc::Receiver<Sample>,
) -> JoinHandle<Result<TestResults, MetricsError>> {
    tokio::spawn(async move {
        let mut aggregator = Aggregator::new()?;
        let mut recent: VecDeque<Duration> = VecDeque::new();
        let mut live_tx = config.live_tx;
        let mut live_interval = tokio::time::interval(LIVE_UPDATE_INTERVAL);
        live_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_sample = samples_rx.recv() => {
                    let Some(sample) = maybe_sample else {
                        break;
                    };
                    if live_tx.is_some() {
                        recent.push_back(sample.offset);
                    }
                    aggregator.push(&sample)?;
                },
                _ = live_interval.tick(), if live_tx.is_some() => {
                    let elapsed = config.started.elapsed();
                    prune_window(&mut recent, elapsed);
                    let stats = LiveStats {
                        elapsed,
                        target: config.target,
                        active_users: config.active_users.load(Ordering::Relaxed),
                        requests: aggregator.total(),
                        rps: recent.len() as f64 / RPS_WINDOW.as_secs_f64(),
                        avg_response_ms: aggregator.avg_response_ms(),
                        error_rate: aggregator.error_rate(),
                    };
                    if live_tx.as_ref().is_some_and(|tx| tx.send(stats).is_err()) {
                        tracing::debug!("Live dashboard receiver dropped");
                        live_tx = None;
                    }
                }
            }
        }

        let elapsed = config.started.elapsed();
        tracing::debug!(
            "Collector finished: {} samples in {:.2}s",
            aggregator.total(),
            elapsed.as_secs_f64()
        );
        Ok(aggregator.finish(elapsed))
    })
}

fn prune_window(window: &mut VecDeque<Duration>, elapsed: Duration) {
    while window
        .front()
        .is_some_and(|offset| offset.saturating_add(RPS_WINDOW) < elapsed)
    {
        window.pop_front();
    }
}
