use std::io;

use ratatui::{
    Terminal, TerminalOptions, Viewport,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    prelude::{Backend, Frame, text},
    text::Span,
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::metrics::LiveStats;

use super::theme::{Role, Theme};

/// Rows taken by the inline dashboard, borders included.
pub const DASHBOARD_HEIGHT: u16 = 5;

const PARTIAL_BLOCKS: [&str; 8] = ["", "▏", "▎", "▍", "▌", "▋", "▊", "▉"];

/// Gauge of `width` cells with the percentage centred over the bar.
pub(crate) fn progress_bar_line(
    theme: Theme,
    elapsed_ms: u128,
    target_ms: u128,
    width: u16,
) -> text::Line<'static> {
    let bar_width = usize::from(width.saturating_sub(2)).max(1);
    let total_eighths = u128::try_from(bar_width)
        .unwrap_or(u128::MAX)
        .saturating_mul(8);
    let filled_eighths = if target_ms > 0 {
        elapsed_ms
            .min(target_ms)
            .saturating_mul(total_eighths)
            .checked_div(target_ms)
            .unwrap_or(0)
    } else {
        0
    };
    let full_count =
        usize::try_from(filled_eighths.checked_div(8).unwrap_or(0)).unwrap_or(0).min(bar_width);
    let rem = usize::try_from(filled_eighths.checked_rem(8).unwrap_or(0)).unwrap_or(0);
    let partial_char = PARTIAL_BLOCKS
        .get(rem)
        .and_then(|block| block.chars().next())
        .filter(|_| full_count < bar_width);

    let percent = elapsed_ms
        .min(target_ms)
        .saturating_mul(100)
        .checked_div(target_ms)
        .unwrap_or(0);
    let label: Vec<char> = format!(" {percent}% ").chars().take(bar_width).collect();
    let label_start = bar_width.saturating_sub(label.len()) / 2;

    let mut spans = Vec::with_capacity(bar_width.saturating_add(2));
    spans.push(Span::raw("["));
    for idx in 0..bar_width {
        let label_char = idx
            .checked_sub(label_start)
            .and_then(|offset| label.get(offset))
            .copied();
        if let Some(ch) = label_char {
            spans.push(Span::styled(ch.to_string(), theme.title_style()));
        } else if idx < full_count {
            spans.push(Span::styled("█", theme.style(Role::Primary)));
        } else if let Some(ch) = partial_char.filter(|_| idx == full_count) {
            spans.push(Span::styled(ch.to_string(), theme.style(Role::Primary)));
        } else {
            spans.push(Span::raw(" "));
        }
    }
    spans.push(Span::raw("]"));
    text::Line::from(spans)
}

fn stats_line(theme: Theme, stats: &LiveStats) -> text::Line<'static> {
    let error_role = if stats.error_rate > 0.0 {
        Role::Error
    } else {
        Role::Success
    };
    let pair = |label: &str, value: String, role: Role| {
        [
            Span::styled(format!("{label} "), theme.style(Role::Text)),
            Span::styled(value, theme.style(role)),
            Span::raw("   "),
        ]
    };
    let mut spans = Vec::with_capacity(15);
    spans.extend(pair("Users", stats.active_users.to_string(), Role::Info));
    spans.extend(pair("Requests", stats.requests.to_string(), Role::Info));
    spans.extend(pair("RPS", format!("{:.1}", stats.rps), Role::Primary));
    spans.extend(pair(
        "Avg",
        format!("{:.1} ms", stats.avg_response_ms),
        Role::Warning,
    ));
    spans.extend(pair("Errors", format!("{:.1}%", stats.error_rate), error_role));
    text::Line::from(spans)
}

pub fn draw_dashboard<B: Backend>(
    f: &mut Frame<'_, B>,
    theme: Theme,
    title: &str,
    stats: &LiveStats,
) {
    let area = f.size();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.style(Role::Primary))
        .title(Span::styled(format!(" {title} "), theme.title_style()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);
    let (gauge_row, stats_row, time_row) = match rows.as_ref() {
        [gauge, stats_area, time] => (*gauge, *stats_area, *time),
        _ => return,
    };

    let gauge = progress_bar_line(
        theme,
        stats.elapsed.as_millis(),
        stats.target.as_millis(),
        gauge_row.width,
    );
    f.render_widget(Paragraph::new(gauge), gauge_row);
    f.render_widget(Paragraph::new(stats_line(theme, stats)), stats_row);
    let timing = format!(
        "Elapsed {:.1}s of {}s  (Ctrl+C to stop)",
        stats.elapsed.as_secs_f64(),
        stats.target.as_secs()
    );
    f.render_widget(
        Paragraph::new(Span::styled(timing, theme.style(Role::Text))),
        time_row,
    );
}

/// Draws the dashboard inline below the prompt until the sender is dropped.
#[must_use]
pub fn spawn_dashboard(
    theme: Theme,
    title: String,
    mut live_rx: watch::Receiver<LiveStats>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = match Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(DASHBOARD_HEIGHT),
            },
        ) {
            Ok(terminal) => terminal,
            Err(err) => {
                tracing::warn!("Live dashboard unavailable: {}", err);
                return;
            }
        };

        let mut last = live_rx.borrow().clone();
        loop {
            if let Err(err) = terminal.draw(|f| draw_dashboard(f, theme, &title, &last)) {
                tracing::warn!("Failed to render dashboard: {}", err);
                break;
            }
            if live_rx.changed().await.is_err() {
                break;
            }
            last = live_rx.borrow().clone();
        }

        let bottom = terminal.get_frame().size().bottom();
        if let Err(err) = terminal
            .set_cursor(0, bottom.saturating_sub(1))
            .and_then(|()| terminal.show_cursor())
        {
            tracing::debug!("Failed to restore cursor: {}", err);
        }
        println!();
    })
}
