use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Map, Value};

use super::{ExternalTool, OutputFiles};
use crate::args::Framework;
use crate::config::TestPlan;
use crate::metrics::{BYTES_PER_MB, TestResults, percent};

const SCRIPT_FILE: &str = "script.yml";
const REPORT_FILE: &str = "report.json";
const CODE_PREFIX: &str = "http.codes.";
const ERROR_PREFIX: &str = "errors.";

#[derive(Debug, Clone, Copy, Default)]
pub struct Artillery;

impl ExternalTool for Artillery {
    fn framework(&self) -> Framework {
        Framework::Artillery
    }

    fn script_name(&self) -> &'static str {
        SCRIPT_FILE
    }

    fn args(&self, _plan: &TestPlan) -> Vec<String> {
        ["run", "--output", REPORT_FILE, SCRIPT_FILE]
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    fn run_length(&self, plan: &TestPlan) -> Duration {
        plan.duration.saturating_add(plan.rampup)
    }

    fn output_files(&self) -> &'static [&'static str] {
        &[REPORT_FILE]
    }

    fn parse_results(
        &self,
        outputs: &OutputFiles,
        elapsed: Duration,
    ) -> Result<TestResults, String> {
        parse_report(outputs.require(REPORT_FILE)?, elapsed)
    }
}

/// Reads the `aggregate` section of an `artillery run --output` report.
pub(super) fn parse_report(text: &str, elapsed: Duration) -> Result<TestResults, String> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| format!("invalid report JSON: {err}"))?;
    let aggregate = document
        .get("aggregate")
        .ok_or_else(|| "report has no aggregate section".to_owned())?;
    let empty = Map::new();
    let counters = aggregate
        .get("counters")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut successful: u64 = 0;
    let mut failed: u64 = 0;
    let mut errored: u64 = 0;
    let mut errors = BTreeMap::new();
    for (key, value) in counters {
        let value = value.as_u64().unwrap_or(0);
        if let Some(code) = key.strip_prefix(CODE_PREFIX) {
            match code.parse::<u16>() {
                Ok(status) if status < 400 => successful = successful.saturating_add(value),
                Ok(_) | Err(_) => {
                    failed = failed.saturating_add(value);
                    errors.insert(code.to_owned(), value);
                }
            }
        } else if let Some(kind) = key.strip_prefix(ERROR_PREFIX) {
            errored = errored.saturating_add(value);
            errors.insert(kind.to_owned(), value);
        }
    }

    let counted = successful.saturating_add(failed).saturating_add(errored);
    let total = counters
        .get("http.requests")
        .and_then(Value::as_u64)
        .unwrap_or(counted)
        .max(counted);

    let duration = match (
        aggregate.get("firstMetricAt").and_then(Value::as_f64),
        aggregate.get("lastMetricAt").and_then(Value::as_f64),
    ) {
        (Some(first), Some(last)) if last > first => (last - first) / 1000.0,
        _ => elapsed.as_secs_f64(),
    };
    let rps = aggregate
        .get("rates")
        .and_then(|rates| rates.get("http.request_rate"))
        .and_then(Value::as_f64)
        .unwrap_or_else(|| {
            if duration > 0.0 {
                total as f64 / duration
            } else {
                0.0
            }
        });

    let response_time = aggregate
        .get("summaries")
        .and_then(|summaries| summaries.get("http.response_time"));
    let stat = |field: &str| {
        response_time
            .and_then(|summary| summary.get(field))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    let downloaded = counters
        .get("http.downloaded_bytes")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(TestResults {
        total_requests: total,
        successful_requests: successful,
        failed_requests: failed,
        requests_per_second: rps,
        avg_response_time: stat("mean"),
        median_response_time: stat("median"),
        p95_response_time: stat("p95"),
        p99_response_time: stat("p99"),
        min_response_time: stat("min"),
        max_response_time: stat("max"),
        error_rate: percent(total.saturating_sub(successful), total),
        errors,
        data_sent_mb: 0.0,
        data_received_mb: downloaded as f64 / BYTES_PER_MB,
        duration,
        timeline: Vec::new(),
    })
}
