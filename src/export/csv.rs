use crate::session::RunRecord;

/// Quotes a field when it contains a separator, quote or line break.
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn row(section: &str, metric: &str, value: &str) -> String {
    format!(
        "{},{},{}",
        csv_field(section),
        csv_field(metric),
        csv_field(value)
    )
}

/// `section,metric,value` rows followed by a blank line and the timeline.
#[must_use]
pub fn render_csv(record: &RunRecord) -> String {
    let settings = &record.settings;
    let results = &record.results;
    let mut lines = vec!["section,metric,value".to_owned()];

    lines.push(row("run", "id", &record.id.to_string()));
    lines.push(row("run", "started_at", &record.started_at.to_rfc3339()));
    lines.push(row("run", "finished_at", &record.finished_at.to_rfc3339()));

    let framework = settings.framework.map_or("", |framework| framework.as_str());
    lines.push(row("settings", "framework", framework));
    lines.push(row("settings", "test_type", settings.test_type.as_str()));
    lines.push(row(
        "settings",
        "url",
        settings.target_url.as_deref().unwrap_or_default(),
    ));
    lines.push(row("settings", "method", settings.method.as_str()));
    lines.push(row("settings", "users", &settings.users.to_string()));
    lines.push(row("settings", "duration", &settings.duration.to_string()));
    lines.push(row("settings", "rampup", &settings.rampup.to_string()));
    for (key, value) in &settings.custom_params {
        lines.push(row("settings", &format!("param.{key}"), value));
    }

    let summary = [
        ("total_requests", results.total_requests.to_string()),
        ("successful_requests", results.successful_requests.to_string()),
        ("failed_requests", results.failed_requests.to_string()),
        ("requests_per_second", format!("{:.2}", results.requests_per_second)),
        ("error_rate", format!("{:.2}", results.error_rate)),
        ("data_sent_mb", format!("{:.4}", results.data_sent_mb)),
        ("data_received_mb", format!("{:.4}", results.data_received_mb)),
        ("duration", format!("{:.2}", results.duration)),
    ];
    for (metric, value) in summary {
        lines.push(row("summary", metric, &value));
    }

    let response_times = [
        ("avg_ms", results.avg_response_time),
        ("median_ms", results.median_response_time),
        ("p95_ms", results.p95_response_time),
        ("p99_ms", results.p99_response_time),
        ("min_ms", results.min_response_time),
        ("max_ms", results.max_response_time),
    ];
    for (metric, value) in response_times {
        lines.push(row("response_times", metric, &format!("{value:.2}")));
    }

    for (kind, count) in &results.errors {
        lines.push(row("errors", kind, &count.to_string()));
    }

    lines.push(String::new());
    lines.push("second,requests,errors,avg_response_ms".to_owned());
    for point in &results.timeline {
        lines.push(format!(
            "{},{},{},{:.2}",
            point.second, point.requests, point.errors, point.avg_response_time
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
