use std::collections::BTreeMap;
use std::time::Duration;

use super::histogram::LatencyHistogram;
use super::types::{Outcome, Sample, TestResults, TimelinePoint};
use crate::error::MetricsError;

pub(crate) const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    requests: u64,
    errors: u64,
    latency_sum_us: u128,
    latency_count: u64,
}

/// Folds samples into the counters that make up [`TestResults`].
#[derive(Debug)]
pub struct Aggregator {
    total: u64,
    successful: u64,
    failed: u64,
    errors: BTreeMap<String, u64>,
    bytes_sent: u64,
    bytes_received: u64,
    latency_sum_us: u128,
    latency_count: u64,
    min_latency_us: u64,
    max_latency_us: u64,
    histogram: LatencyHistogram,
    timeline: BTreeMap<u64, Bucket>,
}

impl Aggregator {
    /// # Errors
    ///
    /// Returns an error if the latency histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            total: 0,
            successful: 0,
            failed: 0,
            errors: BTreeMap::new(),
            bytes_sent: 0,
            bytes_received: 0,
            latency_sum_us: 0,
            latency_count: 0,
            min_latency_us: u64::MAX,
            max_latency_us: 0,
            histogram: LatencyHistogram::new()?,
            timeline: BTreeMap::new(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the latency cannot be recorded in the histogram.
    pub fn push(&mut self, sample: &Sample) -> Result<(), MetricsError> {
        self.total = self.total.saturating_add(1);
        let outcome = sample.outcome();
        match outcome {
            Outcome::Success => self.successful = self.successful.saturating_add(1),
            Outcome::Failed(_) => self.failed = self.failed.saturating_add(1),
            Outcome::Errored => {}
        }
        if let Some(key) = sample.error_key() {
            let count = self.errors.entry(key).or_insert(0);
            *count = count.saturating_add(1);
        }
        self.bytes_sent = self.bytes_sent.saturating_add(sample.bytes_sent);
        self.bytes_received = self.bytes_received.saturating_add(sample.bytes_received);

        let bucket = self.timeline.entry(sample.offset.as_secs()).or_default();
        bucket.requests = bucket.requests.saturating_add(1);
        if outcome != Outcome::Success {
            bucket.errors = bucket.errors.saturating_add(1);
        }

        if sample.latency.is_zero() {
            return Ok(());
        }
        let micros = u64::try_from(sample.latency.as_micros()).unwrap_or(u64::MAX);
        bucket.latency_sum_us = bucket.latency_sum_us.saturating_add(u128::from(micros));
        bucket.latency_count = bucket.latency_count.saturating_add(1);
        self.latency_sum_us = self.latency_sum_us.saturating_add(u128::from(micros));
        self.latency_count = self.latency_count.saturating_add(1);
        self.min_latency_us = self.min_latency_us.min(micros);
        self.max_latency_us = self.max_latency_us.max(micros);
        self.histogram.record(sample.latency)
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Failed plus errored requests.
    #[must_use]
    pub const fn unsuccessful(&self) -> u64 {
        self.total.saturating_sub(self.successful)
    }

    #[must_use]
    pub const fn avg_response_ms(&self) -> f64 {
        mean_ms(self.latency_sum_us, self.latency_count)
    }

    #[must_use]
    pub const fn error_rate(&self) -> f64 {
        percent(self.unsuccessful(), self.total)
    }

    #[must_use]
    pub fn finish(self, elapsed: Duration) -> TestResults {
        let seconds = elapsed.as_secs_f64();
        let mut results = TestResults {
            duration: seconds,
            ..TestResults::default()
        };
        if self.total == 0 {
            return results;
        }

        results.total_requests = self.total;
        results.successful_requests = self.successful;
        results.failed_requests = self.failed;
        results.requests_per_second = if seconds > 0.0 {
            self.total as f64 / seconds
        } else {
            0.0
        };
        results.error_rate = self.error_rate();
        results.avg_response_time = self.avg_response_ms();
        if self.latency_count > 0 {
            results.median_response_time = self.histogram.quantile_ms(0.5);
            results.p95_response_time = self.histogram.quantile_ms(0.95);
            results.p99_response_time = self.histogram.quantile_ms(0.99);
            results.min_response_time = self.min_latency_us as f64 / 1000.0;
            results.max_response_time = self.max_latency_us as f64 / 1000.0;
        }
        results.data_sent_mb = self.bytes_sent as f64 / BYTES_PER_MB;
        results.data_received_mb = self.bytes_received as f64 / BYTES_PER_MB;
        results.timeline = self
            .timeline
            .into_iter()
            .map(|(second, bucket)| TimelinePoint {
                second,
                requests: bucket.requests,
                errors: bucket.errors,
                avg_response_time: mean_ms(bucket.latency_sum_us, bucket.latency_count),
            })
            .collect();
        results.errors = self.errors;
        results
    }
}

const fn mean_ms(sum_us: u128, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum_us as f64 / count as f64 / 1000.0
}

pub(crate) const fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}
