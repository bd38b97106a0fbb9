//! In-process runners built on `reqwest` and `tokio-tungstenite`.
mod requests;
mod worker;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::time::Instant;

use self::requests::RequestSpec;
use self::worker::{WorkerContext, ramp_delay, run_worker, think_time};
use super::traits::{LoadRunner, PreparedTest, RunContext};
use super::unsupported_test_type;
use crate::args::{DEFAULT_USER_AGENT, Framework, TestType};
use crate::config::TestPlan;
use crate::error::{AppError, AppResult, MetricsError, RunnerError};
use crate::metrics::{CollectorConfig, TestResults, spawn_collector};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SAMPLE_CHANNEL_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Simple,
    Advanced,
}

/// Runs workers inside this process. `Simple` hammers `GET url`; `Advanced`
/// ramps users up and shapes requests by test type.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRunner {
    mode: Mode,
}

impl BuiltinRunner {
    #[must_use]
    pub const fn simple() -> Self {
        Self { mode: Mode::Simple }
    }

    #[must_use]
    pub const fn advanced() -> Self {
        Self {
            mode: Mode::Advanced,
        }
    }

    fn request_spec(self, plan: &TestPlan) -> AppResult<RequestSpec> {
        match self.mode {
            Mode::Simple => RequestSpec::simple(plan),
            Mode::Advanced => RequestSpec::for_plan(plan),
        }
    }

    fn start_delay(self, plan: &TestPlan, index: u64) -> Duration {
        match self.mode {
            Mode::Simple => Duration::ZERO,
            Mode::Advanced => ramp_delay(plan.rampup, index, plan.users),
        }
    }

    fn think_time(self, plan: &TestPlan) -> Duration {
        match self.mode {
            Mode::Simple => Duration::ZERO,
            Mode::Advanced => think_time(plan.test_type == TestType::TelegramWebhook, plan.users),
        }
    }
}

#[async_trait]
impl LoadRunner for BuiltinRunner {
    fn framework(&self) -> Framework {
        match self.mode {
            Mode::Simple => Framework::Simple,
            Mode::Advanced => Framework::Advanced,
        }
    }

    async fn prepare(&self, plan: &TestPlan) -> AppResult<PreparedTest> {
        if let Some(err) = unsupported_test_type(self.framework(), plan.test_type) {
            return Err(AppError::validation(err));
        }
        // Header params are checked here so a bad one fails before any worker starts.
        self.request_spec(plan)?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|err| AppError::runner(RunnerError::BuildClientFailed { source: err }))?;
        Ok(PreparedTest::Builtin { client })
    }

    async fn execute(
        &self,
        prepared: &PreparedTest,
        plan: &TestPlan,
        context: RunContext,
    ) -> AppResult<TestResults> {
        let PreparedTest::Builtin { client } = prepared else {
            return Err(AppError::runner(RunnerError::PreparedMismatch {
                framework: self.framework().as_str(),
            }));
        };
        let request = Arc::new(self.request_spec(plan)?);
        let run_start = Instant::now();
        let deadline = run_start
            .checked_add(plan.duration)
            .unwrap_or(run_start);
        let active_users = Arc::new(AtomicU64::new(0));
        let (samples_tx, samples_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);

        let collector = spawn_collector(
            CollectorConfig {
                started: run_start,
                target: plan.duration,
                active_users: Arc::clone(&active_users),
                live_tx: context.live_tx,
            },
            samples_rx,
        );

        tracing::info!(
            "Starting {} workers against {} for {}s",
            plan.users,
            plan.url,
            plan.duration.as_secs()
        );
        let think = self.think_time(plan);
        let workers: Vec<_> = (0..plan.users)
            .map(|index| {
                let worker_context = WorkerContext {
                    client: client.clone(),
                    request: Arc::clone(&request),
                    samples_tx: samples_tx.clone(),
                    active_users: Arc::clone(&active_users),
                    run_start,
                    deadline,
                    start_delay: self.start_delay(plan, index),
                    think_time: think,
                };
                tokio::spawn(run_worker(worker_context, context.shutdown_tx.subscribe()))
            })
            .collect();
        drop(samples_tx);

        for result in join_all(workers).await {
            if let Err(err) = result {
                tracing::error!("Worker task failed: {}", err);
            }
        }

        let results = collector
            .await
            .map_err(|err| {
                tracing::error!("Collector task failed: {}", err);
                AppError::metrics(MetricsError::CollectorStopped)
            })?
            .map_err(AppError::metrics)?;
        tracing::info!(
            "Built-in run finished: {} requests, {:.1} req/s",
            results.total_requests,
            results.requests_per_second
        );
        Ok(results)
    }
}
