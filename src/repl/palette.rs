//! `/` command palette: arrow-key selector on a terminal, plain list otherwise.
use std::io::Write;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, queue};

use super::command::{COMMANDS, CommandSpec};
use crate::error::AppResult;
use crate::ui::{Role, Theme};

const HINT: &str = "↑/↓ select, Enter run, Esc cancel";

pub(super) fn palette_lines(theme: Theme, selected: Option<usize>) -> Vec<String> {
    let width = COMMANDS
        .iter()
        .map(|spec| spec.name.len())
        .max()
        .unwrap_or(0)
        .saturating_add(1);
    let mut lines = Vec::with_capacity(COMMANDS.len().saturating_add(1));
    lines.push(theme.paint_bold(Role::Primary, "Command Palette"));
    for (idx, spec) in COMMANDS.iter().enumerate() {
        let name = format!("/{:<width$}", spec.name);
        let line = if selected == Some(idx) {
            format!(
                "{} {}  {}",
                theme.paint_bold(Role::Success, ">"),
                theme.paint_bold(Role::Success, &name),
                theme.paint(Role::Text, spec.summary)
            )
        } else {
            format!(
                "  {}  {}",
                theme.paint(Role::Primary, &name),
                theme.paint(Role::Text, spec.summary)
            )
        };
        lines.push(line);
    }
    lines
}

/// Lets the user pick a command. Without a terminal the palette is only
/// printed and nothing is selected.
pub(super) fn choose_command<W: Write>(
    theme: Theme,
    out: &mut W,
    interactive: bool,
) -> AppResult<Option<&'static CommandSpec>> {
    if !interactive {
        for line in palette_lines(theme, None) {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{}", theme.paint(Role::Info, "Type a command to run it."))?;
        return Ok(None);
    }

    terminal::enable_raw_mode()?;
    let selection = select(theme, out);
    let cleanup = queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::FromCursorDown),
        cursor::Show
    )
    .and_then(|()| out.flush());
    let restored = terminal::disable_raw_mode();
    let chosen = selection?;
    cleanup?;
    restored?;
    if let Some(spec) = chosen {
        writeln!(out, "/{}", spec.name)?;
    }
    Ok(chosen)
}

fn draw<W: Write>(theme: Theme, out: &mut W, selected: usize) -> AppResult<()> {
    let mut lines = palette_lines(theme, Some(selected));
    lines.push(theme.paint(Role::Info, HINT));
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::FromCursorDown)
    )?;
    for line in &lines {
        // Raw mode does not translate \n.
        queue!(out, Print(line), Print("\r\n"))?;
    }
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    queue!(out, cursor::MoveUp(height))?;
    out.flush()?;
    Ok(())
}

fn select<W: Write>(theme: Theme, out: &mut W) -> AppResult<Option<&'static CommandSpec>> {
    queue!(out, cursor::Hide)?;
    let last = COMMANDS.len().saturating_sub(1);
    let mut selected = 0_usize;
    loop {
        draw(theme, out, selected)?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let cancelled = key.code == KeyCode::Esc
            || key.code == KeyCode::Char('q')
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
        if cancelled {
            return Ok(None);
        }
        if key.code == KeyCode::Enter {
            return Ok(COMMANDS.get(selected));
        }
        if key.code == KeyCode::Up || key.code == KeyCode::Char('k') {
            selected = selected.checked_sub(1).unwrap_or(last);
        } else if key.code == KeyCode::Down || key.code == KeyCode::Char('j') {
            selected = if selected >= last {
                0
            } else {
                selected.saturating_add(1)
            };
        } else if key.code == KeyCode::Home {
            selected = 0;
        } else if key.code == KeyCode::End {
            selected = last;
        }
    }
}
