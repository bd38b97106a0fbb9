use crate::metrics::{TestResults, percent};
use crate::session::RunRecord;

use super::menus::table_lines;
use super::theme::{Role, Theme};

/// `1234567` becomes `1,234,567`.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len().saturating_add(digits.len() / 3));
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len().saturating_sub(idx)) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn section(theme: Theme, title: &str, role: Role, rows: Vec<(&str, String)>) -> Vec<String> {
    let rows: Vec<Vec<(Role, String)>> = rows
        .into_iter()
        .map(|(label, value)| vec![(Role::Text, label.to_owned()), (role, value)])
        .collect();
    table_lines(theme, title, &["Metric", "Value"], &rows)
}

/// Final report printed after `/run` and by `/results`.
#[must_use]
pub fn results_lines(theme: Theme, record: &RunRecord) -> Vec<String> {
    let results = &record.results;
    let framework = record
        .settings
        .framework
        .map_or("unknown", |framework| framework.as_str());
    let mut lines = vec![
        theme.paint_bold(
            Role::Primary,
            &format!(
                "Run #{} | {} | {} | {}",
                record.id,
                framework,
                record.settings.test_type,
                record.settings.target_url.as_deref().unwrap_or("-")
            ),
        ),
        theme.paint(
            Role::Info,
            &format!(
                "Started {}  Finished {}",
                record.started_at.format("%Y-%m-%d %H:%M:%S"),
                record.finished_at.format("%H:%M:%S")
            ),
        ),
        String::new(),
    ];
    lines.extend(summary_section(theme, results));
    lines.push(String::new());
    lines.extend(section(
        theme,
        "Response Times (ms)",
        Role::Info,
        vec![
            ("Average", format!("{:.2}", results.avg_response_time)),
            ("Median", format!("{:.2}", results.median_response_time)),
            ("Min", format!("{:.2}", results.min_response_time)),
            ("Max", format!("{:.2}", results.max_response_time)),
            ("95th Percentile", format!("{:.2}", results.p95_response_time)),
            ("99th Percentile", format!("{:.2}", results.p99_response_time)),
        ],
    ));
    if !results.errors.is_empty() {
        lines.push(String::new());
        lines.extend(errors_section(theme, results));
    }
    lines.push(String::new());
    lines.extend(section(
        theme,
        "Network Statistics",
        Role::Text,
        vec![
            ("Data Sent", format!("{:.2} MB", results.data_sent_mb)),
            ("Data Received", format!("{:.2} MB", results.data_received_mb)),
            ("Duration", format!("{:.2}s", results.duration)),
            ("Error Rate", format!("{:.2}%", results.error_rate)),
        ],
    ));
    lines
}

fn summary_section(theme: Theme, results: &TestResults) -> Vec<String> {
    let success_role = if results.error_rate > 5.0 {
        Role::Warning
    } else {
        Role::Success
    };
    section(
        theme,
        "Final Test Results",
        success_role,
        vec![
            ("Total Requests", group_thousands(results.total_requests)),
            (
                "Successful Requests",
                group_thousands(results.successful_requests),
            ),
            ("Failed Requests", group_thousands(results.failed_requests)),
            ("Errored Requests", group_thousands(results.errored_requests())),
            (
                "Requests per Second",
                format!("{:.2}", results.requests_per_second),
            ),
            ("Success Rate", format!("{:.2}%", results.success_rate())),
        ],
    )
}

fn errors_section(theme: Theme, results: &TestResults) -> Vec<String> {
    let mut errors: Vec<(&String, &u64)> = results.errors.iter().collect();
    errors.sort_by(|left, right| right.1.cmp(left.1).then_with(|| left.0.cmp(right.0)));
    let rows: Vec<Vec<(Role, String)>> = errors
        .into_iter()
        .map(|(kind, count)| {
            vec![
                (Role::Error, kind.clone()),
                (Role::Text, group_thousands(*count)),
                (
                    Role::Text,
                    format!("{:.2}%", percent(*count, results.total_requests)),
                ),
            ]
        })
        .collect();
    table_lines(theme, "Errors", &["Error", "Count", "Percentage"], &rows)
}

/// `/results history` table, oldest first.
#[must_use]
pub fn history_lines(theme: Theme, history: &[RunRecord]) -> Vec<String> {
    let rows: Vec<Vec<(Role, String)>> = history
        .iter()
        .map(|record| {
            let results = &record.results;
            vec![
                (Role::Primary, format!("#{}", record.id)),
                (
                    Role::Text,
                    record.finished_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ),
                (
                    Role::Text,
                    record
                        .settings
                        .framework
                        .map_or("unknown", |framework| framework.as_str())
                        .to_owned(),
                ),
                (Role::Text, record.settings.test_type.as_str().to_owned()),
                (Role::Text, group_thousands(results.total_requests)),
                (Role::Info, format!("{:.2}", results.requests_per_second)),
                (
                    if results.error_rate > 0.0 {
                        Role::Warning
                    } else {
                        Role::Success
                    },
                    format!("{:.2}%", results.error_rate),
                ),
            ]
        })
        .collect();
    table_lines(
        theme,
        "Run History",
        &["Run", "Finished", "Framework", "Type", "Requests", "RPS", "Errors"],
        &rows,
    )
}
