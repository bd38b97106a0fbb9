use crossterm::style::{Color, Stylize};

use crate::ui::theme::{Role, Theme, tri_gradient_rgb};

const GLYPH_ROWS: usize = 6;

// C H A K L O A D
const GLYPHS: [[&str; GLYPH_ROWS]; 8] = [
    [" ██████╗", "██╔════╝", "██║     ", "██║     ", "╚██████╗", " ╚═════╝"],
    ["██╗  ██╗", "██║  ██║", "███████║", "██╔══██║", "██║  ██║", "╚═╝  ╚═╝"],
    [" █████╗ ", "██╔══██╗", "███████║", "██╔══██║", "██║  ██║", "╚═╝  ╚═╝"],
    ["██╗  ██╗", "██║ ██╔╝", "█████╔╝ ", "██╔═██╗ ", "██║  ██╗", "╚═╝  ╚═╝"],
    ["██╗     ", "██║     ", "██║     ", "██║     ", "███████╗", "╚══════╝"],
    [" ██████╗ ", "██╔═══██╗", "██║   ██║", "██║   ██║", "╚██████╔╝", " ╚═════╝ "],
    [" █████╗ ", "██╔══██╗", "███████║", "██╔══██║", "██║  ██║", "╚═╝  ╚═╝"],
    ["██████╗ ", "██╔══██╗", "██║  ██║", "██║  ██║", "██████╔╝", "╚═════╝ "],
];

pub(crate) fn banner_lines() -> Vec<String> {
    (0..GLYPH_ROWS)
        .map(|row| {
            GLYPHS
                .iter()
                .filter_map(|glyph| glyph.get(row).copied())
                .collect::<String>()
        })
        .collect()
}

/// Renders the logo with the theme gradient followed by the version line.
pub(crate) fn render_banner(theme: Theme) -> Vec<String> {
    let palette = theme.palette();
    let lines = banner_lines();
    let denom = lines.len().saturating_sub(1);
    let mut out: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if theme.no_color() {
                return line.clone();
            }
            let (r, g, b) = tri_gradient_rgb(palette.primary, palette.info, palette.success, idx, denom);
            line.as_str().with(Color::Rgb { r, g, b }).to_string()
        })
        .collect();

    let description = format!(
        "chakload v{} | interactive load testing | theme: {}",
        env!("CARGO_PKG_VERSION"),
        theme.name()
    );
    out.push(String::new());
    out.push(theme.paint(Role::Primary, &description));
    out.push(theme.paint(
        Role::Text,
        "Type /help for commands, / for the command palette, /exit to quit.",
    ));
    out
}

pub(crate) fn print_banner(theme: Theme) {
    for line in render_banner(theme) {
        println!("{line}");
    }
}
