use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Local;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use super::progress::progress_bar_line;
use super::*;
use crate::args::{Framework, TestType};
use crate::config::TestSettings;
use crate::error::{AppError, AppResult};
use crate::metrics::{LiveStats, TestResults};
use crate::session::RunRecord;
use crate::system::banner::render_banner;

const fn plain() -> Theme {
    Theme::new(ThemeName::Gemini, true)
}

fn record(errors: BTreeMap<String, u64>) -> RunRecord {
    RunRecord {
        id: 3,
        started_at: Local::now(),
        finished_at: Local::now(),
        settings: TestSettings {
            framework: Some(Framework::Advanced),
            target_url: Some("http://localhost:8080".to_owned()),
            ..TestSettings::default()
        },
        results: TestResults {
            total_requests: 1_500,
            successful_requests: 1_480,
            failed_requests: 20,
            requests_per_second: 25.0,
            error_rate: 1.33,
            errors,
            ..TestResults::default()
        },
    }
}

#[test]
fn theme_names_parse_case_insensitively() -> AppResult<()> {
    let parsed: ThemeName = " Ocean ".parse()?;
    if parsed != ThemeName::Ocean {
        return Err(AppError::validation("Expected ocean"));
    }
    match "neon".parse::<ThemeName>() {
        Err(err) if err.to_string().contains("gemini, qwen, ocean, terminal") => Ok(()),
        Err(_) | Ok(_) => Err(AppError::validation("Expected unknown theme error")),
    }
}

#[test]
fn no_color_disables_painting() -> AppResult<()> {
    if plain().paint(Role::Error, "boom") != "boom" {
        return Err(AppError::validation("Expected plain text"));
    }
    let colored = Theme::new(ThemeName::Gemini, false).paint(Role::Error, "boom");
    if !colored.contains("\u{1b}[") || !colored.contains("boom") {
        return Err(AppError::validation("Expected ANSI colour codes"));
    }
    Ok(())
}

#[test]
fn palettes_expose_hex_colours() -> AppResult<()> {
    let theme = Theme::new(ThemeName::Gemini, false);
    if theme.hex(Role::Primary) != "#32b8c6" || theme.background_hex() != "#1f2121" {
        return Err(AppError::validation("Unexpected gemini colours"));
    }
    if Theme::new(ThemeName::Terminal, false).hex(Role::Text) != "#00ff00" {
        return Err(AppError::validation("Unexpected terminal foreground"));
    }
    Ok(())
}

#[test]
fn banner_shows_version_and_theme() -> AppResult<()> {
    let lines = render_banner(plain());
    let version = format!("chakload v{}", env!("CARGO_PKG_VERSION"));
    if !lines.iter().any(|line| line.contains(&version) && line.contains("theme: gemini")) {
        return Err(AppError::validation("Missing version line"));
    }
    if lines.iter().any(|line| line.contains('\u{1b}')) {
        return Err(AppError::validation("No colour codes expected"));
    }
    Ok(())
}

#[test]
fn framework_menu_reports_availability() -> AppResult<()> {
    let lines = framework_menu(
        plain(),
        &[(Framework::Simple, true), (Framework::K6, false), (Framework::Locust, true)],
    );
    let text = lines.join("\n");
    for expected in ["built-in", "not found", "installed", "/framework <name>"] {
        if !text.contains(expected) {
            return Err(AppError::validation(format!("Missing {expected}")));
        }
    }
    Ok(())
}

#[test]
fn test_type_menu_marks_current() -> AppResult<()> {
    let lines = test_type_menu(plain(), TestType::GraphqlEndpoint);
    let marked = lines
        .iter()
        .find(|line| line.starts_with('*'))
        .ok_or_else(|| AppError::validation("No marked row"))?;
    if !marked.contains("graphql-endpoint") {
        return Err(AppError::validation("Wrong row marked"));
    }
    Ok(())
}

#[test]
fn config_summary_flags_unset_values() -> AppResult<()> {
    let text = config_summary(plain(), &TestSettings::default()).join("\n");
    if !text.contains("not set") || !text.contains("100") || !text.contains("60s") {
        return Err(AppError::validation(format!("Unexpected summary: {text}")));
    }
    Ok(())
}

#[test]
fn results_include_errors_only_when_present() -> AppResult<()> {
    let clean = results_lines(plain(), &record(BTreeMap::new())).join("\n");
    if clean.contains("Errors\n") || !clean.contains("1,500") || !clean.contains("Run #3") {
        return Err(AppError::validation("Unexpected clean report"));
    }
    let mut errors = BTreeMap::new();
    errors.insert("503".to_owned(), 15);
    errors.insert("timeout".to_owned(), 5);
    let failing = results_lines(plain(), &record(errors)).join("\n");
    for expected in ["Errors", "503", "1.00%", "Network Statistics", "99th Percentile"] {
        if !failing.contains(expected) {
            return Err(AppError::validation(format!("Missing {expected}")));
        }
    }
    Ok(())
}

#[test]
fn history_lists_every_run() -> AppResult<()> {
    let history = vec![record(BTreeMap::new()), record(BTreeMap::new())];
    let lines = history_lines(plain(), &history);
    if lines.iter().filter(|line| line.starts_with("#3")).count() != 2 {
        return Err(AppError::validation("Expected two history rows"));
    }
    Ok(())
}

#[test]
fn thousands_are_grouped() -> AppResult<()> {
    for (value, expected) in [(0, "0"), (999, "999"), (1_000, "1,000"), (1_234_567, "1,234,567")] {
        if group_thousands(value) != expected {
            return Err(AppError::validation(format!("Bad grouping for {value}")));
        }
    }
    Ok(())
}

#[test]
fn progress_bar_fills_and_labels() -> AppResult<()> {
    let line = progress_bar_line(plain(), 10_000, 10_000, 22);
    let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
    if !text.starts_with("[█") || !text.contains("100%") || !text.ends_with("█]") {
        return Err(AppError::validation(format!("Unexpected bar: {text}")));
    }
    let empty = progress_bar_line(plain(), 0, 0, 12);
    let empty_text: String = empty.spans.iter().map(|span| span.content.as_ref()).collect();
    if empty_text.contains('█') || !empty_text.contains("0%") {
        return Err(AppError::validation(format!("Unexpected empty bar: {empty_text}")));
    }
    Ok(())
}

#[test]
fn dashboard_renders_live_stats() -> AppResult<()> {
    let backend = TestBackend::new(80, DASHBOARD_HEIGHT);
    let mut terminal = Terminal::new(backend)
        .map_err(|err| AppError::validation(format!("TestBackend: {err}")))?;
    let stats = LiveStats {
        elapsed: Duration::from_secs(5),
        target: Duration::from_secs(10),
        active_users: 7,
        requests: 321,
        rps: 64.2,
        avg_response_ms: 12.5,
        error_rate: 0.0,
    };
    terminal
        .draw(|f| draw_dashboard(f, plain(), "advanced | web-site", &stats))
        .map_err(|err| AppError::validation(format!("draw: {err}")))?;
    let content: String = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol.as_str())
        .collect();
    for expected in ["advanced | web-site", "50%", "Requests 321", "RPS 64.2", "Elapsed 5.0s of 10s"] {
        if !content.contains(expected) {
            return Err(AppError::validation(format!("Missing {expected}")));
        }
    }
    Ok(())
}
