use std::io::Write;
use std::path::Path;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use super::command::{COMMANDS, CommandKind, CommandSpec, lookup};
use super::{Flow, Shell};
use crate::args::parsers::{parse_non_negative_u64, parse_payload, parse_positive_u64};
use crate::args::{ExportFormat, Framework, HttpMethod, TestType};
use crate::config::parse_target_url;
use crate::error::{AppError, AppResult, ExportError, RunnerError, ValidationError};
use crate::execution::run_test;
use crate::export::export_record;
use crate::frameworks::{detect_availability, is_available, unsupported_test_type};
use crate::ui::{
    Role, ThemeName, config_summary, framework_menu, history_lines, results_lines, table_lines,
    test_type_menu, theme_menu,
};

fn usage(spec: &CommandSpec) -> AppError {
    AppError::validation(ValidationError::Usage { usage: spec.usage })
}

/// Exactly one argument.
fn single_arg<'args>(spec: &CommandSpec, args: &'args [String]) -> AppResult<&'args str> {
    match args {
        [only] => Ok(only.as_str()),
        _ => Err(usage(spec)),
    }
}

/// Zero or one argument.
fn optional_arg<'args>(spec: &CommandSpec, args: &'args [String]) -> AppResult<Option<&'args str>> {
    match args {
        [] => Ok(None),
        [only] => Ok(Some(only.as_str())),
        _ => Err(usage(spec)),
    }
}

/// `3` and `#3` both name run 3.
fn parse_run_id(raw: &str) -> AppResult<u64> {
    raw.trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .map_err(|_parse| {
            AppError::validation(ValidationError::UnknownRun {
                id: raw.to_owned(),
            })
        })
}

impl<W: Write> Shell<W> {
    pub(super) async fn dispatch(
        &mut self,
        spec: &'static CommandSpec,
        args: &[String],
    ) -> AppResult<Flow> {
        tracing::debug!("Dispatching /{} with {} args", spec.name, args.len());
        match spec.kind {
            CommandKind::Help => self.help(spec, args)?,
            CommandKind::Framework => self.framework(spec, args)?,
            CommandKind::Type => self.test_type(spec, args)?,
            CommandKind::Url => self.url(spec, args)?,
            CommandKind::Users => {
                let users = parse_positive_u64(single_arg(spec, args)?)?.get();
                self.session.settings.users = users;
                self.say(Role::Success, &format!("Concurrent users set to {users}"))?;
            }
            CommandKind::Duration => {
                let duration = parse_positive_u64(single_arg(spec, args)?)?.get();
                self.session.settings.duration = duration;
                self.say(Role::Success, &format!("Test duration set to {duration}s"))?;
            }
            CommandKind::Rampup => {
                let rampup = parse_non_negative_u64(single_arg(spec, args)?)?;
                self.session.settings.rampup = rampup;
                self.say(Role::Success, &format!("Ramp-up time set to {rampup}s"))?;
            }
            CommandKind::Method => {
                let method: HttpMethod = single_arg(spec, args)?.parse()?;
                self.session.settings.method = method;
                self.say(Role::Success, &format!("HTTP method set to {method}"))?;
            }
            CommandKind::Payload => self.payload(spec, args)?,
            CommandKind::Param => self.param(spec, args)?,
            CommandKind::Config => self.config(spec, args)?,
            CommandKind::Run => self.run().await?,
            CommandKind::Results => self.results(spec, args)?,
            CommandKind::Export => self.export(spec, args).await?,
            CommandKind::Theme => self.theme(spec, args)?,
            CommandKind::Clear => {
                queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                self.out.flush()?;
            }
            CommandKind::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn help(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        let theme = self.session.theme;
        if let Some(name) = optional_arg(spec, args)? {
            let command = lookup(name).ok_or_else(|| {
                AppError::validation(ValidationError::UnknownCommand {
                    input: name.to_owned(),
                })
            })?;
            let mut lines = vec![
                theme.paint_bold(Role::Primary, &format!("/{}", command.name)),
                format!("  {}", command.summary),
                format!(
                    "  {} {}",
                    theme.paint_bold(Role::Text, "Usage:"),
                    command.usage
                ),
                format!("  {}", command.detail),
            ];
            if !command.aliases.is_empty() {
                let aliases = command
                    .aliases
                    .iter()
                    .map(|alias| format!("/{alias}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!(
                    "  {} {}",
                    theme.paint_bold(Role::Text, "Aliases:"),
                    aliases
                ));
            }
            return self.print_lines(&lines);
        }

        let rows: Vec<Vec<(Role, String)>> = COMMANDS
            .iter()
            .map(|command| {
                vec![
                    (Role::Primary, command.usage.to_owned()),
                    (Role::Text, command.summary.to_owned()),
                ]
            })
            .collect();
        let mut lines = table_lines(theme, "Available Commands", &["Command", "Description"], &rows);
        lines.push(String::new());
        lines.push(theme.paint(
            Role::Info,
            "Type / to open the command palette, /help <command> for details.",
        ));
        self.print_lines(&lines)
    }

    fn framework(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        let theme = self.session.theme;
        match optional_arg(spec, args)? {
            None => {
                let mut lines = framework_menu(theme, &detect_availability());
                if let Some(current) = self.session.settings.framework {
                    lines.push(format!("Current: {}", theme.paint(Role::Success, current.as_str())));
                }
                self.print_lines(&lines)
            }
            Some(arg) if arg.eq_ignore_ascii_case("list") => {
                let availability = detect_availability();
                let installed = availability
                    .iter()
                    .filter(|(_, available)| *available)
                    .map(|(framework, _)| framework.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let lines = vec![
                    format!(
                        "{} {}",
                        theme.paint_bold(Role::Text, "Installed:"),
                        theme.paint(Role::Success, &installed)
                    ),
                    format!(
                        "{} {}",
                        theme.paint_bold(Role::Text, "All:"),
                        Framework::names()
                    ),
                ];
                self.print_lines(&lines)
            }
            Some(arg) => {
                let framework: Framework = arg.parse()?;
                if !is_available(framework) {
                    let warning = RunnerError::FrameworkUnavailable {
                        framework: framework.as_str(),
                    };
                    return self.say(Role::Warning, &warning.to_string());
                }
                self.session.settings.framework = Some(framework);
                self.say(
                    Role::Success,
                    &format!("Framework set to {}", framework.display_name()),
                )?;
                self.warn_unsupported()
            }
        }
    }

    /// Flags a framework and test type pair that `/run` would refuse.
    fn warn_unsupported(&mut self) -> AppResult<()> {
        let settings = &self.session.settings;
        let Some(framework) = settings.framework else {
            return Ok(());
        };
        match unsupported_test_type(framework, settings.test_type) {
            Some(err) => self.say(Role::Warning, &err.to_string()),
            None => Ok(()),
        }
    }

    fn test_type(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        let theme = self.session.theme;
        match optional_arg(spec, args)? {
            Some(arg) if !arg.eq_ignore_ascii_case("list") => {
                let test_type: TestType = arg.parse()?;
                self.session.settings.test_type = test_type;
                self.say(Role::Success, &format!("Test type set to {test_type}"))?;
                self.warn_unsupported()
            }
            Some(_) | None => {
                let lines = test_type_menu(theme, self.session.settings.test_type);
                self.print_lines(&lines)
            }
        }
    }

    fn url(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        let raw = single_arg(spec, args)?.trim();
        parse_target_url(raw)?;
        self.session.settings.target_url = Some(raw.to_owned());
        self.say(Role::Success, &format!("Target URL set to {raw}"))
    }

    fn payload(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        match optional_arg(spec, args)? {
            None => {
                let current = self.session.settings.payload.clone();
                match current {
                    Some(payload) => self.say(Role::Text, &format!("Payload: {payload}")),
                    None => self.say(Role::Info, "No payload set."),
                }
            }
            Some(arg) if arg.eq_ignore_ascii_case("clear") => {
                self.session.settings.payload = None;
                self.say(Role::Success, "Payload cleared")
            }
            Some(arg) => {
                let payload = parse_payload(arg)?;
                self.session.settings.payload = Some(payload);
                self.say(Role::Success, "Payload set")
            }
        }
    }

    fn param(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        match args {
            [] => {
                if self.session.settings.custom_params.is_empty() {
                    return self.say(Role::Info, "No custom parameters set.");
                }
                let lines: Vec<String> = self
                    .session
                    .settings
                    .custom_params
                    .iter()
                    .map(|(key, value)| format!("  {key} = {value}"))
                    .collect();
                self.say(Role::Primary, "Custom Parameters")?;
                self.print_lines(&lines)
            }
            [only] if only.eq_ignore_ascii_case("clear") => {
                self.session.settings.custom_params.clear();
                self.say(Role::Success, "Custom parameters cleared")
            }
            [key, value] => {
                self.session
                    .settings
                    .custom_params
                    .insert(key.clone(), value.clone());
                self.say(Role::Success, &format!("Parameter {key} = {value}"))
            }
            _ => Err(usage(spec)),
        }
    }

    fn config(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        let theme = self.session.theme;
        let (action, name) = match args {
            [] => ("show", None),
            [action] => (action.as_str(), None),
            [action, name] => (action.as_str(), Some(name.as_str())),
            _ => return Err(usage(spec)),
        };
        match (action.to_ascii_lowercase().as_str(), name) {
            ("show", None) => {
                let lines = config_summary(theme, &self.session.settings);
                self.print_lines(&lines)
            }
            ("list", None) => {
                let names = self.session.presets.list()?;
                if names.is_empty() {
                    let message = format!(
                        "No saved presets in {}",
                        self.session.presets.dir().display()
                    );
                    return self.say(Role::Info, &message);
                }
                self.say(Role::Primary, "Saved Presets")?;
                let lines: Vec<String> = names.iter().map(|name| format!("  {name}")).collect();
                self.print_lines(&lines)
            }
            ("save", Some(name)) => {
                let path = self.session.presets.save(name, &self.session.settings)?;
                self.say(
                    Role::Success,
                    &format!("Configuration saved as '{name}' ({})", path.display()),
                )
            }
            ("load", Some(name)) => {
                self.session.settings = self.session.presets.load(name)?;
                self.say(Role::Success, &format!("Configuration '{name}' loaded"))
            }
            ("delete", Some(name)) => {
                self.session.presets.delete(name)?;
                self.say(Role::Success, &format!("Preset '{name}' deleted"))
            }
            _ => Err(usage(spec)),
        }
    }

    async fn run(&mut self) -> AppResult<()> {
        let id = run_test(&mut self.session, &mut self.out).await?;
        self.say(Role::Success, "Test completed")?;
        self.show_run(id)
    }

    fn show_run(&mut self, id: u64) -> AppResult<()> {
        let theme = self.session.theme;
        let lines = self
            .session
            .find(id)
            .map(|record| results_lines(theme, record))
            .ok_or_else(|| {
                AppError::validation(ValidationError::UnknownRun { id: id.to_string() })
            })?;
        self.print_lines(&lines)
    }

    fn results(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        let theme = self.session.theme;
        match optional_arg(spec, args)? {
            None => {
                let id = self
                    .session
                    .last()
                    .map(|record| record.id)
                    .ok_or_else(|| AppError::validation(ValidationError::NoResults))?;
                self.show_run(id)
            }
            Some(arg) if arg.eq_ignore_ascii_case("history") => {
                if self.session.history.is_empty() {
                    return Err(AppError::validation(ValidationError::NoResults));
                }
                let lines = history_lines(theme, &self.session.history);
                self.print_lines(&lines)
            }
            Some(arg) => {
                let id = parse_run_id(arg)?;
                if self.session.find(id).is_none() {
                    return Err(AppError::validation(ValidationError::UnknownRun {
                        id: arg.to_owned(),
                    }));
                }
                self.show_run(id)
            }
        }
    }

    async fn export(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        let (format, file) = match args {
            [format] => (format.as_str(), None),
            [format, file] => (format.as_str(), Some(Path::new(file.as_str()))),
            _ => return Err(usage(spec)),
        };
        let format: ExportFormat = format.parse()?;
        let record = self
            .session
            .last()
            .ok_or_else(|| AppError::export(ExportError::NoResults))?;
        let path = export_record(
            record,
            format,
            file,
            &self.session.output_dir,
            self.session.theme,
        )
        .await?;
        self.say(
            Role::Success,
            &format!("Results exported to {}", path.display()),
        )
    }

    fn theme(&mut self, spec: &CommandSpec, args: &[String]) -> AppResult<()> {
        match optional_arg(spec, args)? {
            Some(arg) if !arg.eq_ignore_ascii_case("list") => {
                let name: ThemeName = arg.parse()?;
                self.session.theme = self.session.theme.with_name(name);
                self.say(Role::Success, &format!("Theme changed to {name}"))
            }
            Some(_) | None => {
                let lines = theme_menu(self.session.theme);
                self.print_lines(&lines)
            }
        }
    }
}
