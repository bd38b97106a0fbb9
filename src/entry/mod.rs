mod plan;

use std::ffi::OsString;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};

use crate::args::{Command, ShellArgs};
use crate::error::{AppError, AppResult, ValidationError};
use plan::{build_plan, execute_plan};

/// Blocking stdin reads may still be parked when the shell exits.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

pub(crate) fn run() -> AppResult<()> {
    let args = parse_args(std::env::args_os())?;

    crate::system::logger::init_logging(args.verbose, args.no_color, default_log_level(&args));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(ValidationError::RuntimeBuild { source: err }))?;

    let result = runtime.block_on(run_async(args));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

fn parse_args<I>(raw_args: I) -> AppResult<ShellArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let matches = ShellArgs::command().get_matches_from(raw_args);
    Ok(ShellArgs::from_arg_matches(&matches)?)
}

/// The shell stays quiet so log lines do not interleave with the prompt.
const fn default_log_level(args: &ShellArgs) -> &'static str {
    match args.command {
        Some(Command::Run(_)) => "info",
        Some(Command::Interactive | Command::Frameworks | Command::Themes) | None => "warn",
    }
}

async fn run_async(args: ShellArgs) -> AppResult<()> {
    let plan = build_plan(args)?;
    execute_plan(plan).await
}
