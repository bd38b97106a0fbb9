use std::io::IsTerminal;

use crate::args::{Command, ShellArgs};
use crate::config::{PresetStore, TestSettings, apply_run_args};
use crate::error::AppResult;
use crate::session::Session;
use crate::ui::{Theme, ThemeName};

use super::types::{Mode, RunPlan};

/// Preset loaded automatically when the shell starts.
const DEFAULT_PRESET: &str = "default";

pub(in crate::entry) fn build_plan(args: ShellArgs) -> AppResult<RunPlan> {
    let theme_name: ThemeName = args.theme.parse()?;
    let theme = Theme::new(theme_name, args.no_color);
    let presets = PresetStore::new(args.config_dir);
    let mut session = Session::new(presets, theme, args.output_dir);
    session.dashboard = !args.no_ui && std::io::stdout().is_terminal();

    let mode = match args.command {
        None | Some(Command::Interactive) => {
            session.settings = startup_settings(&session.presets);
            Mode::Shell
        }
        Some(Command::Run(run_args)) => {
            if let Some(name) = run_args.preset.as_deref() {
                session.settings = session.presets.load(name)?;
            }
            apply_run_args(&mut session.settings, &run_args)?;
            Mode::Run {
                exports: run_args.exports,
                output: run_args.output,
            }
        }
        Some(Command::Frameworks) => Mode::Frameworks,
        Some(Command::Themes) => Mode::Themes,
    };
    Ok(RunPlan { session, mode })
}

/// The `default` preset when present and valid, otherwise built-in defaults.
fn startup_settings(presets: &PresetStore) -> TestSettings {
    if !presets.exists(DEFAULT_PRESET) {
        return TestSettings::default();
    }
    match presets.load(DEFAULT_PRESET) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("Ignoring default preset: {}", err);
            TestSettings::default()
        }
    }
}
