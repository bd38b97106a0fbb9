use crate::args::{Framework, TestType};
use crate::config::TestSettings;

use super::theme::{Role, Theme, ThemeName};

/// Column-aligned table. Widths are measured on the plain text so colour
/// codes never break the alignment.
pub(crate) fn table_lines(
    theme: Theme,
    title: &str,
    headers: &[&str],
    rows: &[Vec<(Role, String)>],
) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (idx, (_, cell)) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let pad = |text: &str, idx: usize| {
        let width = widths.get(idx).copied().unwrap_or(0);
        format!("{text:<width$}")
    };
    let total_width = widths
        .iter()
        .sum::<usize>()
        .saturating_add(widths.len().saturating_sub(1).saturating_mul(2));

    let mut lines = Vec::with_capacity(rows.len().saturating_add(4));
    lines.push(theme.paint_bold(Role::Primary, title));
    let header_line = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| pad(header, idx))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(theme.paint_bold(Role::Text, header_line.trim_end()));
    lines.push(theme.paint(Role::Primary, &"─".repeat(total_width)));
    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(idx, (role, cell))| theme.paint(*role, &pad(cell, idx)))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_owned());
    }
    lines
}

#[must_use]
pub fn framework_menu(theme: Theme, availability: &[(Framework, bool)]) -> Vec<String> {
    let rows: Vec<Vec<(Role, String)>> = availability
        .iter()
        .map(|(framework, available)| {
            let status = match (framework.is_builtin(), available) {
                (true, _) => (Role::Success, "built-in".to_owned()),
                (false, true) => (Role::Success, "installed".to_owned()),
                (false, false) => (Role::Warning, "not found".to_owned()),
            };
            vec![
                (Role::Primary, framework.as_str().to_owned()),
                (Role::Text, framework.description().to_owned()),
                status,
            ]
        })
        .collect();
    let mut lines = table_lines(
        theme,
        "Select Testing Framework",
        &["Framework", "Description", "Status"],
        &rows,
    );
    lines.push(String::new());
    lines.push(format!(
        "{} /framework <name>",
        theme.paint_bold(Role::Text, "Usage:")
    ));
    lines
}

#[must_use]
pub fn test_type_menu(theme: Theme, current: TestType) -> Vec<String> {
    let rows: Vec<Vec<(Role, String)>> = TestType::ALL
        .iter()
        .map(|test_type| {
            let marker = if *test_type == current { "*" } else { "" };
            vec![
                (Role::Success, marker.to_owned()),
                (Role::Primary, test_type.as_str().to_owned()),
                (Role::Text, test_type.description().to_owned()),
            ]
        })
        .collect();
    let mut lines = table_lines(theme, "Select Test Type", &["", "Type", "Description"], &rows);
    lines.push(String::new());
    lines.push(format!(
        "{} /type <test-type>",
        theme.paint_bold(Role::Text, "Usage:")
    ));
    lines
}

#[must_use]
pub fn theme_menu(theme: Theme) -> Vec<String> {
    let rows: Vec<Vec<(Role, String)>> = ThemeName::ALL
        .iter()
        .map(|name| {
            let preview = theme.with_name(*name);
            let swatch = [Role::Primary, Role::Success, Role::Error, Role::Warning, Role::Info]
                .into_iter()
                .map(|role| preview.paint(role, "■"))
                .collect::<Vec<_>>()
                .join(" ");
            let marker = if *name == theme.name() { "*" } else { "" };
            vec![
                (Role::Success, marker.to_owned()),
                (Role::Primary, name.as_str().to_owned()),
                (Role::Text, name.description().to_owned()),
                (Role::Text, swatch),
            ]
        })
        .collect();
    table_lines(theme, "Themes", &["", "Name", "Description", "Palette"], &rows)
}

fn or_unset(value: Option<&str>) -> String {
    value.map_or_else(|| "not set".to_owned(), str::to_owned)
}

/// `/config show` panel.
#[must_use]
pub fn config_summary(theme: Theme, settings: &TestSettings) -> Vec<String> {
    let mut rows = vec![
        ("URL", or_unset(settings.target_url.as_deref())),
        (
            "Framework",
            or_unset(settings.framework.map(Framework::as_str)),
        ),
        ("Test Type", settings.test_type.as_str().to_owned()),
        ("Method", settings.method.as_str().to_owned()),
        ("Users", settings.users.to_string()),
        ("Duration", format!("{}s", settings.duration)),
        ("Ramp-up", format!("{}s", settings.rampup)),
        ("Payload", or_unset(settings.payload.as_deref())),
    ];
    if settings.custom_params.is_empty() {
        rows.push(("Params", "none".to_owned()));
    }
    for (key, value) in &settings.custom_params {
        rows.push(("Param", format!("{key} = {value}")));
    }

    let mut lines = Vec::with_capacity(rows.len().saturating_add(1));
    lines.push(theme.paint_bold(Role::Primary, "Current Configuration"));
    for (label, value) in rows {
        let role = if value == "not set" {
            Role::Warning
        } else {
            Role::Text
        };
        lines.push(format!(
            "  {} {}",
            theme.paint_bold(Role::Text, &format!("{label:<10}")),
            theme.paint(role, &value)
        ));
    }
    lines
}
