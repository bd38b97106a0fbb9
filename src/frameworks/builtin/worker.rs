use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use super::requests::RequestSpec;
use crate::metrics::Sample;
use crate::shutdown::ShutdownReceiver;

pub(super) struct WorkerContext {
    pub(super) client: Client,
    pub(super) request: Arc<RequestSpec>,
    pub(super) samples_tx: mpsc::Sender<Sample>,
    pub(super) active_users: Arc<AtomicU64>,
    pub(super) run_start: Instant,
    pub(super) deadline: Instant,
    pub(super) start_delay: Duration,
    pub(super) think_time: Duration,
}

/// Loops requests until the deadline, shutdown, or the collector going away.
pub(super) async fn run_worker(context: WorkerContext, mut shutdown_rx: ShutdownReceiver) {
    if !context.start_delay.is_zero() {
        let start_at = context
            .run_start
            .checked_add(context.start_delay)
            .unwrap_or(context.deadline)
            .min(context.deadline);
        tokio::select! {
            _ = shutdown_rx.recv() => return,
            () = sleep_until(start_at) => {}
        }
    }
    if Instant::now() >= context.deadline {
        return;
    }

    context.active_users.fetch_add(1, Ordering::Relaxed);
    loop {
        let sample = tokio::select! {
            _ = shutdown_rx.recv() => break,
            () = sleep_until(context.deadline) => break,
            sample = context.request.execute(&context.client, context.run_start) => sample,
        };
        if context.samples_tx.send(sample).await.is_err() {
            break;
        }

        if !context.think_time.is_zero() {
            let wake_at = Instant::now()
                .checked_add(context.think_time)
                .unwrap_or(context.deadline)
                .min(context.deadline);
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                () = sleep_until(wake_at) => {}
            }
        }
        if Instant::now() >= context.deadline {
            break;
        }
    }
    context.active_users.fetch_sub(1, Ordering::Relaxed);
}

/// Delay before worker `index` starts so that all `users` are running once
/// `rampup` has elapsed.
pub(super) fn ramp_delay(rampup: Duration, index: u64, users: u64) -> Duration {
    if users == 0 || rampup.is_zero() {
        return Duration::ZERO;
    }
    let total_ms = u64::try_from(rampup.as_millis()).unwrap_or(u64::MAX);
    let delay_ms = u128::from(total_ms)
        .saturating_mul(u128::from(index))
        .checked_div(u128::from(users))
        .unwrap_or(0);
    Duration::from_millis(u64::try_from(delay_ms).unwrap_or(u64::MAX))
}

const MIN_TELEGRAM_THINK_TIME: Duration = Duration::from_millis(10);
const DEFAULT_THINK_TIME: Duration = Duration::from_millis(100);

/// Pause between iterations of the advanced runner.
pub(super) fn think_time(telegram: bool, users: u64) -> Duration {
    if !telegram {
        return DEFAULT_THINK_TIME;
    }
    let per_user = Duration::from_secs(1)
        .checked_div(u32::try_from(users).unwrap_or(u32::MAX))
        .unwrap_or(Duration::ZERO);
    per_user.max(MIN_TELEGRAM_THINK_TIME)
}
