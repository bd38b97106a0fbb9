use std::time::Duration;

use super::csv::{Row, Table};
use super::{ExternalTool, OutputFiles};
use crate::args::Framework;
use crate::config::TestPlan;
use crate::metrics::{Aggregator, Sample, TestResults};

const SCRIPT_FILE: &str = "plan.jmx";
const RESULTS_FILE: &str = "results.jtl";
const ASSERTION_FAILED: &str = "assertion_failed";

#[derive(Debug, Clone, Copy, Default)]
pub struct JMeter;

impl ExternalTool for JMeter {
    fn framework(&self) -> Framework {
        Framework::JMeter
    }

    fn script_name(&self) -> &'static str {
        SCRIPT_FILE
    }

    fn args(&self, _plan: &TestPlan) -> Vec<String> {
        [
            "-n",
            "-t",
            SCRIPT_FILE,
            "-l",
            RESULTS_FILE,
            "-Jjmeter.save.saveservice.output_format=csv",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect()
    }

    fn output_files(&self) -> &'static [&'static str] {
        &[RESULTS_FILE]
    }

    fn parse_results(
        &self,
        outputs: &OutputFiles,
        elapsed: Duration,
    ) -> Result<TestResults, String> {
        parse_jtl(outputs.require(RESULTS_FILE)?, elapsed)
    }
}

/// Replays every JTL row through the shared aggregator.
pub(super) fn parse_jtl(text: &str, elapsed: Duration) -> Result<TestResults, String> {
    let Some(table) = Table::parse(text) else {
        return Ok(TestResults {
            duration: elapsed.as_secs_f64(),
            ..TestResults::default()
        });
    };
    for column in ["timeStamp", "elapsed", "responseCode", "success"] {
        if table.column(column).is_none() {
            return Err(format!("{RESULTS_FILE} has no {column} column"));
        }
    }

    let first_ms = table
        .rows()
        .map(|row| row.count("timeStamp"))
        .min()
        .unwrap_or(0);
    let mut last_ms = first_ms;
    let mut aggregator = Aggregator::new().map_err(|err| err.to_string())?;
    for row in table.rows() {
        let started_ms = row.count("timeStamp");
        let latency_ms = row.count("elapsed");
        let finished_ms = started_ms.saturating_add(latency_ms);
        last_ms = last_ms.max(finished_ms);
        let sample = row_sample(&row, finished_ms.saturating_sub(first_ms), latency_ms);
        aggregator.push(&sample).map_err(|err| err.to_string())?;
    }

    let span = Duration::from_millis(last_ms.saturating_sub(first_ms));
    let duration = if span.is_zero() { elapsed } else { span };
    Ok(aggregator.finish(duration))
}

fn row_sample(row: &Row<'_>, offset_ms: u64, latency_ms: u64) -> Sample {
    let status = row.get("responseCode").and_then(|code| code.parse::<u16>().ok());
    let passed = row
        .get("success")
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));
    let error = match (passed, status) {
        (true, _) => None,
        (false, Some(code)) if code >= 400 => None,
        (false, Some(_)) => Some(ASSERTION_FAILED.to_owned()),
        (false, None) => Some(
            row.get("responseMessage")
                .or_else(|| row.get("responseCode"))
                .filter(|message| !message.is_empty())
                .unwrap_or("request_error")
                .to_owned(),
        ),
    };
    Sample {
        offset: Duration::from_millis(offset_ms),
        latency: Duration::from_millis(latency_ms),
        status,
        error,
        bytes_sent: row.count("sentBytes"),
        bytes_received: row.count("bytes"),
    }
}
