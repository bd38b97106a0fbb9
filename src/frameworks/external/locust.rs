use std::collections::BTreeMap;
use std::time::Duration;

use super::csv::Table;
use super::{ExternalTool, OutputFiles};
use crate::args::Framework;
use crate::config::TestPlan;
use crate::metrics::{BYTES_PER_MB, TestResults, percent};

const SCRIPT_FILE: &str = "locustfile.py";
const CSV_PREFIX: &str = "results";
const STATS_FILE: &str = "results_stats.csv";
const FAILURES_FILE: &str = "results_failures.csv";
const AGGREGATED_ROW: &str = "Aggregated";

#[derive(Debug, Clone, Copy, Default)]
pub struct Locust;

/// Users spawned per second so that everyone is running after `rampup`.
pub(super) const fn spawn_rate(users: u64, rampup: Duration) -> f64 {
    let seconds = rampup.as_secs_f64();
    if seconds <= 0.0 {
        return users as f64;
    }
    (users as f64 / seconds).max(1.0)
}

impl ExternalTool for Locust {
    fn framework(&self) -> Framework {
        Framework::Locust
    }

    fn script_name(&self) -> &'static str {
        SCRIPT_FILE
    }

    fn args(&self, plan: &TestPlan) -> Vec<String> {
        vec![
            "-f".to_owned(),
            SCRIPT_FILE.to_owned(),
            "--headless".to_owned(),
            "--host".to_owned(),
            plan.url.to_string(),
            "-u".to_owned(),
            plan.users.to_string(),
            "-t".to_owned(),
            format!("{}s", plan.duration.as_secs()),
            "--spawn-rate".to_owned(),
            spawn_rate(plan.users, plan.rampup).to_string(),
            "--csv".to_owned(),
            CSV_PREFIX.to_owned(),
            "--only-summary".to_owned(),
        ]
    }

    fn output_files(&self) -> &'static [&'static str] {
        &[STATS_FILE, FAILURES_FILE]
    }

    fn parse_results(
        &self,
        outputs: &OutputFiles,
        elapsed: Duration,
    ) -> Result<TestResults, String> {
        parse_stats(
            outputs.require(STATS_FILE)?,
            outputs.get(FAILURES_FILE),
            elapsed,
        )
    }
}

pub(super) fn parse_stats(
    stats: &str,
    failures: Option<&str>,
    elapsed: Duration,
) -> Result<TestResults, String> {
    let table = Table::parse(stats).ok_or_else(|| format!("{STATS_FILE} is empty"))?;
    let row = table
        .rows()
        .find(|row| row.get("Name") == Some(AGGREGATED_ROW))
        .ok_or_else(|| format!("{STATS_FILE} has no {AGGREGATED_ROW} row"))?;

    let total = row.count("Request Count");
    let failed = row.count("Failure Count").min(total);
    let median = match row.number("Median Response Time") {
        value if value > 0.0 => value,
        _ => row.number("50%"),
    };
    let received_bytes = row.number("Average Content Size") * total as f64;

    Ok(TestResults {
        total_requests: total,
        successful_requests: total.saturating_sub(failed),
        failed_requests: failed,
        requests_per_second: row.number("Requests/s"),
        avg_response_time: row.number("Average Response Time"),
        median_response_time: median,
        p95_response_time: row.number("95%"),
        p99_response_time: row.number("99%"),
        min_response_time: row.number("Min Response Time"),
        max_response_time: row.number("Max Response Time"),
        error_rate: percent(failed, total),
        errors: failures.map(parse_failures).unwrap_or_default(),
        data_sent_mb: 0.0,
        data_received_mb: received_bytes / BYTES_PER_MB,
        duration: elapsed.as_secs_f64(),
        timeline: Vec::new(),
    })
}

fn parse_failures(text: &str) -> BTreeMap<String, u64> {
    let mut errors = BTreeMap::new();
    let Some(table) = Table::parse(text) else {
        return errors;
    };
    for row in table.rows() {
        let Some(error) = row.get("Error").filter(|error| !error.is_empty()) else {
            continue;
        };
        let entry = errors.entry(error.to_owned()).or_insert(0_u64);
        *entry = entry.saturating_add(row.count("Occurrences"));
    }
    errors
}
