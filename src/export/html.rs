use std::fmt::Write;

use crate::error::ExportError;
use crate::session::RunRecord;
use crate::ui::{Role, Theme};

pub(crate) fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn table(
    out: &mut String,
    title: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> std::fmt::Result {
    writeln!(out, "<h2>{}</h2>", escape_html(title))?;
    writeln!(out, "<table>")?;
    out.push_str("<tr>");
    for header in headers {
        write!(out, "<th>{}</th>", escape_html(header))?;
    }
    out.push_str("</tr>\n");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            write!(out, "<td>{}</td>", escape_html(cell))?;
        }
        out.push_str("</tr>\n");
    }
    writeln!(out, "</table>")
}

fn pairs(items: &[(&str, String)]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|(label, value)| vec![(*label).to_owned(), value.clone()])
        .collect()
}

/// Standalone page with inline CSS in the theme colours.
///
/// # Errors
///
/// Returns an error if formatting into the buffer fails.
pub fn render_html(record: &RunRecord, theme: Theme) -> Result<String, ExportError> {
    build(record, theme).map_err(|err| ExportError::Format { source: err })
}

fn build(record: &RunRecord, theme: Theme) -> Result<String, std::fmt::Error> {
    let settings = &record.settings;
    let results = &record.results;
    let mut out = String::with_capacity(8 * 1024);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>chakload run #{}</title>", record.id)?;
    writeln!(out, "<style>")?;
    writeln!(
        out,
        "body {{ background: {}; color: {}; font-family: -apple-system, 'Segoe UI', sans-serif; margin: 2rem; }}",
        theme.background_hex(),
        theme.hex(Role::Text)
    )?;
    writeln!(out, "h1, h2 {{ color: {}; }}", theme.hex(Role::Primary))?;
    writeln!(
        out,
        "table {{ border-collapse: collapse; margin-bottom: 1.5rem; min-width: 24rem; }}"
    )?;
    writeln!(
        out,
        "th, td {{ border: 1px solid {}; padding: 0.35rem 0.75rem; text-align: left; }}",
        theme.hex(Role::Primary)
    )?;
    writeln!(out, "th {{ color: {}; }}", theme.hex(Role::Info))?;
    writeln!(out, ".ok {{ color: {}; }}", theme.hex(Role::Success))?;
    writeln!(out, ".bad {{ color: {}; }}", theme.hex(Role::Error))?;
    writeln!(out, "</style>\n</head>\n<body>")?;

    writeln!(out, "<h1>chakload run #{}</h1>", record.id)?;
    let status_class = if results.error_rate > 0.0 { "bad" } else { "ok" };
    writeln!(
        out,
        "<p>Started {} &middot; finished {} &middot; <span class=\"{}\">error rate {:.2}%</span></p>",
        escape_html(&record.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        escape_html(&record.finished_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        status_class,
        results.error_rate
    )?;

    let mut settings_rows = vec![
        (
            "Framework",
            settings
                .framework
                .map_or_else(String::new, |framework| framework.to_string()),
        ),
        ("Test Type", settings.test_type.to_string()),
        (
            "URL",
            settings.target_url.clone().unwrap_or_default(),
        ),
        ("Method", settings.method.to_string()),
        ("Users", settings.users.to_string()),
        ("Duration", format!("{}s", settings.duration)),
        ("Ramp-up", format!("{}s", settings.rampup)),
    ];
    if let Some(payload) = settings.payload.as_ref() {
        settings_rows.push(("Payload", payload.clone()));
    }
    let mut settings_table = pairs(&settings_rows);
    settings_table.extend(
        settings
            .custom_params
            .iter()
            .map(|(key, value)| vec![format!("param {key}"), value.clone()]),
    );
    table(&mut out, "Settings", &["Setting", "Value"], &settings_table)?;

    let summary = pairs(&[
        ("Total Requests", results.total_requests.to_string()),
        ("Successful Requests", results.successful_requests.to_string()),
        ("Failed Requests", results.failed_requests.to_string()),
        ("Errored Requests", results.errored_requests().to_string()),
        ("Requests per Second", format!("{:.2}", results.requests_per_second)),
        ("Success Rate", format!("{:.2}%", results.success_rate())),
        ("Data Sent", format!("{:.2} MB", results.data_sent_mb)),
        ("Data Received", format!("{:.2} MB", results.data_received_mb)),
        ("Duration", format!("{:.2}s", results.duration)),
    ]);
    table(&mut out, "Summary", &["Metric", "Value"], &summary)?;

    let response_times = pairs(&[
        ("Average", format!("{:.2}", results.avg_response_time)),
        ("Median", format!("{:.2}", results.median_response_time)),
        ("Min", format!("{:.2}", results.min_response_time)),
        ("Max", format!("{:.2}", results.max_response_time)),
        ("95th Percentile", format!("{:.2}", results.p95_response_time)),
        ("99th Percentile", format!("{:.2}", results.p99_response_time)),
    ]);
    table(&mut out, "Response Times (ms)", &["Metric", "Value"], &response_times)?;

    if !results.errors.is_empty() {
        let errors: Vec<Vec<String>> = results
            .errors
            .iter()
            .map(|(kind, count)| vec![kind.clone(), count.to_string()])
            .collect();
        table(&mut out, "Errors", &["Error", "Count"], &errors)?;
    }

    if !results.timeline.is_empty() {
        let timeline: Vec<Vec<String>> = results
            .timeline
            .iter()
            .map(|point| {
                vec![
                    point.second.to_string(),
                    point.requests.to_string(),
                    point.errors.to_string(),
                    format!("{:.2}", point.avg_response_time),
                ]
            })
            .collect();
        table(
            &mut out,
            "Timeline",
            &["Second", "Requests", "Errors", "Avg Response (ms)"],
            &timeline,
        )?;
    }

    writeln!(
        out,
        "<p>Generated by chakload v{}</p>\n</body>\n</html>",
        env!("CARGO_PKG_VERSION")
    )?;
    Ok(out)
}
