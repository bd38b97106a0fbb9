//! The interactive shell: prompt loop, command parsing and dispatch.
mod command;
mod handlers;
mod palette;


use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{AppError, AppResult, ValidationError};
use crate::session::Session;
use crate::system::banner::print_banner;
use crate::ui::Role;

pub use command::{COMMANDS, CommandKind, CommandSpec, Line, lookup, parse_line};

/// What the prompt loop does after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Session plus the writer every command prints to.
#[derive(Debug)]
pub struct Shell<W: Write> {
    session: Session,
    out: W,
    /// Arrow-key palette allowed (stdin and stdout are terminals).
    interactive: bool,
}

impl<W: Write> Shell<W> {
    pub const fn new(session: Session, out: W, interactive: bool) -> Self {
        Self {
            session,
            out,
            interactive,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn output(&self) -> &W {
        &self.out
    }

    /// Handles one input line. Command errors are printed, never returned,
    /// so a bad command cannot end the session.
    pub async fn handle_line(&mut self, input: &str) -> Flow {
        let outcome = match parse_line(input) {
            Line::Empty => Ok(Flow::Continue),
            Line::Exit => Ok(Flow::Exit),
            Line::Palette => self.open_palette().await,
            Line::Unknown(input) => Err(AppError::validation(ValidationError::UnknownCommand {
                input,
            })),
            Line::Command(invocation) => self.dispatch(invocation.spec, &invocation.args).await,
        };
        match outcome {
            Ok(flow) => flow,
            Err(err) => {
                self.report(&err);
                Flow::Continue
            }
        }
    }

    async fn open_palette(&mut self) -> AppResult<Flow> {
        let theme = self.session.theme;
        let chosen = palette::choose_command(theme, &mut self.out, self.interactive)?;
        match chosen {
            Some(spec) => self.dispatch(spec, &[]).await,
            None => Ok(Flow::Continue),
        }
    }

    fn report(&mut self, err: &AppError) {
        let line = self
            .session
            .theme
            .paint(Role::Error, &format!("Error: {err}"));
        if let Err(write_err) = writeln!(self.out, "{line}") {
            tracing::warn!("Failed to print error '{}': {}", err, write_err);
        }
    }

    fn say(&mut self, role: Role, text: &str) -> AppResult<()> {
        writeln!(self.out, "{}", self.session.theme.paint(role, text))?;
        Ok(())
    }

    fn print_lines(&mut self, lines: &[String]) -> AppResult<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn prompt(&mut self) -> AppResult<()> {
        let theme = self.session.theme;
        write!(
            self.out,
            "{} ",
            theme.paint_bold(Role::Primary, "chakload>")
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Reads one line from stdin off the async threads. `None` on end of input.
async fn read_line() -> AppResult<Option<String>> {
    let line = tokio::task::spawn_blocking(|| {
        let mut buffer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut buffer)
            .map(|read| (read > 0).then_some(buffer))
    })
    .await??;
    Ok(line)
}

/// Runs the prompt loop on stdin/stdout until `/exit`, end of input or
/// Ctrl+C at the prompt.
///
/// # Errors
///
/// Returns an error only when the terminal itself cannot be read or written.
pub async fn run_shell(session: Session) -> AppResult<()> {
    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    print_banner(session.theme);
    let mut shell = Shell::new(session, io::stdout(), interactive);

    loop {
        shell.prompt()?;
        let line = tokio::select! {
            line = read_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            writeln!(shell.out)?;
            break;
        };
        if !interactive {
            // Piped input is not echoed by the terminal.
            writeln!(shell.out, "{}", line.trim_end())?;
        }
        if shell.handle_line(&line).await == Flow::Exit {
            break;
        }
    }

    shell.say(Role::Primary, "Exiting chakload...")?;
    tracing::debug!("Session ended after {} runs", shell.session.history.len());
    Ok(())
}
