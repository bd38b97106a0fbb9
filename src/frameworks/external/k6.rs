use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use super::{ExternalTool, OutputFiles};
use crate::args::Framework;
use crate::config::TestPlan;
use crate::metrics::{BYTES_PER_MB, TestResults, percent};

const SUMMARY_FILE: &str = "summary.json";
const SCRIPT_FILE: &str = "script.js";

#[derive(Debug, Clone, Copy, Default)]
pub struct K6;

impl ExternalTool for K6 {
    fn framework(&self) -> Framework {
        Framework::K6
    }

    fn script_name(&self) -> &'static str {
        SCRIPT_FILE
    }

    fn args(&self, _plan: &TestPlan) -> Vec<String> {
        [
            "run",
            "--quiet",
            "--no-color",
            "--summary-export",
            SUMMARY_FILE,
            "--summary-trend-stats",
            "avg,min,med,max,p(95),p(99)",
            SCRIPT_FILE,
        ]
        .into_iter()
        .map(str::to_owned)
        .collect()
    }

    fn run_length(&self, plan: &TestPlan) -> Duration {
        plan.duration.saturating_add(plan.rampup)
    }

    fn output_files(&self) -> &'static [&'static str] {
        &[SUMMARY_FILE]
    }

    fn parse_results(
        &self,
        outputs: &OutputFiles,
        elapsed: Duration,
    ) -> Result<TestResults, String> {
        parse_summary(outputs.require(SUMMARY_FILE)?, elapsed)
    }
}

fn metric(metrics: &Value, name: &str, field: &str) -> Option<f64> {
    metrics.get(name)?.get(field)?.as_f64()
}

fn count(metrics: &Value, name: &str, field: &str) -> u64 {
    metrics
        .get(name)
        .and_then(|value| value.get(field))
        .and_then(|value| value.as_u64().or_else(|| value.as_f64().map(|f| f as u64)))
        .unwrap_or(0)
}

/// Reads a `--summary-export` document.
pub(super) fn parse_summary(text: &str, elapsed: Duration) -> Result<TestResults, String> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| format!("invalid summary JSON: {err}"))?;
    let metrics = document
        .get("metrics")
        .ok_or_else(|| "summary has no metrics section".to_owned())?;

    let total = count(metrics, "http_reqs", "count");
    let failed = count(metrics, "http_req_failed", "passes").min(total);
    let duration = document
        .get("state")
        .and_then(|state| state.get("testRunDurationMs"))
        .and_then(Value::as_f64)
        .map_or_else(|| elapsed.as_secs_f64(), |ms| ms / 1000.0);
    let rps = metric(metrics, "http_reqs", "rate").unwrap_or_else(|| {
        if duration > 0.0 {
            total as f64 / duration
        } else {
            0.0
        }
    });

    let mut errors = BTreeMap::new();
    if failed > 0 {
        errors.insert("http_req_failed".to_owned(), failed);
    }
    let duration_stat =
        |field: &str| metric(metrics, "http_req_duration", field).unwrap_or(0.0);

    Ok(TestResults {
        total_requests: total,
        successful_requests: total.saturating_sub(failed),
        failed_requests: failed,
        requests_per_second: rps,
        avg_response_time: duration_stat("avg"),
        median_response_time: duration_stat("med"),
        p95_response_time: duration_stat("p(95)"),
        p99_response_time: duration_stat("p(99)"),
        min_response_time: duration_stat("min"),
        max_response_time: duration_stat("max"),
        error_rate: percent(failed, total),
        errors,
        data_sent_mb: count(metrics, "data_sent", "count") as f64 / BYTES_PER_MB,
        data_received_mb: count(metrics, "data_received", "count") as f64 / BYTES_PER_MB,
        duration,
        timeline: Vec::new(),
    })
}
