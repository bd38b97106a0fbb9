use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One completed request (or connection attempt) as reported by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Completion time relative to the start of the run.
    pub offset: Duration,
    /// Zero when no response was received.
    pub latency: Duration,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(u16),
    Errored,
}

impl Sample {
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.error.is_some() {
            return Outcome::Errored;
        }
        match self.status {
            Some(code) if (100..400).contains(&code) => Outcome::Success,
            Some(code) => Outcome::Failed(code),
            None => Outcome::Errored,
        }
    }

    /// Error-map key: the status code for failures, the error kind otherwise.
    #[must_use]
    pub fn error_key(&self) -> Option<String> {
        match self.outcome() {
            Outcome::Success => None,
            Outcome::Failed(code) => Some(code.to_string()),
            Outcome::Errored => Some(
                self.error
                    .clone()
                    .unwrap_or_else(|| "no_response".to_owned()),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub second: u64,
    pub requests: u64,
    pub errors: u64,
    pub avg_response_time: f64,
}

/// Final statistics of a run. Times are milliseconds, sizes megabytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResults {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub requests_per_second: f64,
    pub avg_response_time: f64,
    pub median_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub error_rate: f64,
    pub errors: BTreeMap<String, u64>,
    pub data_sent_mb: f64,
    pub data_received_mb: f64,
    pub duration: f64,
    pub timeline: Vec<TimelinePoint>,
}

impl TestResults {
    /// Requests that neither succeeded nor got an HTTP error status.
    #[must_use]
    pub const fn errored_requests(&self) -> u64 {
        self.total_requests
            .saturating_sub(self.successful_requests)
            .saturating_sub(self.failed_requests)
    }

    #[must_use]
    pub const fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }
}

/// Snapshot published to the live dashboard while a run is in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveStats {
    pub elapsed: Duration,
    pub target: Duration,
    pub active_users: u64,
    pub requests: u64,
    pub rps: f64,
    pub avg_response_ms: f64,
    pub error_rate: f64,
}
