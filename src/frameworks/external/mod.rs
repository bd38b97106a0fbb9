//! Runners that shell out to k6, Locust, Artillery and JMeter.
mod artillery;
mod csv;
mod jmeter;
mod k6;
mod locust;


use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};

use super::detect::find_binary;
use super::traits::{ExternalCommand, LoadRunner, PreparedTest, RunContext};
use super::unsupported_test_type;
use crate::args::Framework;
use crate::config::TestPlan;
use crate::error::{AppError, AppResult, RunnerError};
use crate::metrics::{LIVE_UPDATE_INTERVAL, LiveStats, TestResults};
use crate::templates::TemplateManager;

pub use artillery::Artillery;
pub use jmeter::JMeter;
pub use k6::K6;
pub use locust::Locust;

/// Grace period on top of the script's run length before the tool is killed.
const EXTRA_WAIT: Duration = Duration::from_secs(60);
const STDERR_TAIL_LINES: usize = 20;

/// Contents of the files a tool left in its working directory, by name.
#[derive(Debug, Default, Clone)]
pub struct OutputFiles {
    files: BTreeMap<&'static str, String>,
}

impl OutputFiles {
    pub fn insert(&mut self, name: &'static str, contents: String) {
        self.files.insert(name, contents);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns a message naming the file when the tool did not write it.
    pub fn require(&self, name: &str) -> Result<&str, String> {
        self.get(name)
            .ok_or_else(|| format!("{name} was not written"))
    }
}

/// Command line and output format of one external tool.
pub trait ExternalTool: Send + Sync {
    fn framework(&self) -> Framework;

    /// File name the rendered script is written to.
    fn script_name(&self) -> &'static str;

    fn args(&self, plan: &TestPlan) -> Vec<String>;

    /// How long the rendered script drives load. Scripts with a separate
    /// ramp stage run for `rampup` on top of `duration`.
    fn run_length(&self, plan: &TestPlan) -> Duration {
        plan.duration
    }

    /// Files read back from the working directory after the tool exits.
    fn output_files(&self) -> &'static [&'static str];

    /// Turns the tool's machine output into results. `elapsed` is the wall
    /// time of the run, used when the output carries no duration.
    ///
    /// # Errors
    ///
    /// Returns a message when the output is missing or malformed.
    fn parse_results(
        &self,
        outputs: &OutputFiles,
        elapsed: Duration,
    ) -> Result<TestResults, String>;
}

enum Finish {
    Exited(ExitStatus),
    Stopped,
    TimedOut,
}

pub struct ExternalRunner<T> {
    tool: T,
    templates: TemplateManager,
    program: Option<PathBuf>,
}

impl<T: ExternalTool> ExternalRunner<T> {
    #[must_use]
    pub const fn new(tool: T, templates: TemplateManager) -> Self {
        Self {
            tool,
            templates,
            program: None,
        }
    }

    /// Runs `program` instead of the binary found on `PATH`.
    #[cfg(test)]
    #[must_use]
    pub fn with_program(mut self, program: PathBuf) -> Self {
        self.program = Some(program);
        self
    }

    fn resolve_program(&self) -> AppResult<PathBuf> {
        let framework = self.tool.framework();
        self.program
            .clone()
            .or_else(|| find_binary(framework))
            .ok_or_else(|| {
                AppError::runner(RunnerError::FrameworkUnavailable {
                    framework: framework.as_str(),
                })
            })
    }

    /// The tool is killed once this much time has passed since spawning it.
    pub(super) fn kill_timeout(&self, plan: &TestPlan) -> Duration {
        self.tool.run_length(plan).saturating_add(EXTRA_WAIT)
    }

    async fn collect_outputs(&self, command: &ExternalCommand) -> AppResult<OutputFiles> {
        let mut outputs = OutputFiles::default();
        for &name in self.tool.output_files() {
            let path = command.workdir.path().join(name);
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => outputs.insert(name, contents),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("{} did not write {}", self.tool.framework(), name);
                }
                Err(err) => {
                    return Err(AppError::runner(RunnerError::ReadOutput {
                        framework: self.tool.framework().as_str(),
                        path,
                        source: err,
                    }));
                }
            }
        }
        Ok(outputs)
    }
}

#[async_trait]
impl<T: ExternalTool> LoadRunner for ExternalRunner<T> {
    fn framework(&self) -> Framework {
        self.tool.framework()
    }

    async fn prepare(&self, plan: &TestPlan) -> AppResult<PreparedTest> {
        if let Some(err) = unsupported_test_type(self.tool.framework(), plan.test_type) {
            return Err(AppError::validation(err));
        }
        let program = self.resolve_program()?;
        let script = self.templates.render_for(plan)?;
        let workdir = tempfile::Builder::new()
            .prefix("chakload-")
            .tempdir()
            .map_err(|err| AppError::runner(RunnerError::WorkDir { source: err }))?;
        let script_path = workdir.path().join(self.tool.script_name());
        tokio::fs::write(&script_path, script)
            .await
            .map_err(|err| {
                AppError::runner(RunnerError::WriteScript {
                    path: script_path.clone(),
                    source: err,
                })
            })?;
        tracing::debug!("Wrote {} script to {}", self.tool.framework(), script_path.display());

        Ok(PreparedTest::External(ExternalCommand {
            workdir,
            program,
            args: self.tool.args(plan),
            script_path,
        }))
    }

    async fn execute(
        &self,
        prepared: &PreparedTest,
        plan: &TestPlan,
        context: RunContext,
    ) -> AppResult<TestResults> {
        let framework = self.tool.framework();
        let PreparedTest::External(command) = prepared else {
            return Err(AppError::runner(RunnerError::PreparedMismatch {
                framework: framework.as_str(),
            }));
        };

        tracing::info!(
            "Running {} {}",
            command.program.display(),
            command.args.join(" ")
        );
        let started = Instant::now();
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(command.workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                AppError::runner(RunnerError::Spawn {
                    framework: framework.as_str(),
                    source: err,
                })
            })?;

        let stdout_task = child
            .stdout
            .take()
            .map(|stdout| tokio::spawn(read_tail(stdout, framework, 0)));
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(read_tail(stderr, framework, STDERR_TAIL_LINES)));

        let run_length = self.tool.run_length(plan);
        let timeout = self.kill_timeout(plan);
        let kill_at = started.checked_add(timeout).unwrap_or(started);
        let mut shutdown_rx = context.shutdown_tx.subscribe();
        let live_tx = context.live_tx;
        let mut ticker = interval(LIVE_UPDATE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let finish = loop {
            tokio::select! {
                status = child.wait() => {
                    let status = status.map_err(|err| AppError::runner(RunnerError::Spawn {
                        framework: framework.as_str(),
                        source: err,
                    }))?;
                    break Finish::Exited(status);
                }
                _ = shutdown_rx.recv() => break Finish::Stopped,
                () = sleep_until(kill_at) => break Finish::TimedOut,
                _ = ticker.tick(), if live_tx.is_some() => {
                    let stats = LiveStats {
                        elapsed: started.elapsed(),
                        target: run_length,
                        active_users: plan.users,
                        ..LiveStats::default()
                    };
                    if let Some(tx) = live_tx.as_ref() {
                        tx.send_replace(stats);
                    }
                }
            }
        };

        if !matches!(finish, Finish::Exited(_))
            && let Err(err) = child.kill().await
        {
            tracing::warn!("Failed to kill {}: {}", framework, err);
        }
        let elapsed = started.elapsed();
        if let Some(task) = stdout_task
            && let Err(err) = task.await
        {
            tracing::debug!("{} stdout reader failed: {}", framework, err);
        }
        let stderr_tail = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        let status = match finish {
            Finish::Exited(status) => status,
            Finish::TimedOut => {
                return Err(AppError::runner(RunnerError::TimedOut {
                    framework: framework.as_str(),
                    timeout,
                }));
            }
            Finish::Stopped => {
                tracing::warn!("{} stopped before completion", framework);
                let outputs = self.collect_outputs(command).await?;
                return self
                    .tool
                    .parse_results(&outputs, elapsed)
                    .map_err(|message| {
                        tracing::debug!("No usable {} output after stop: {}", framework, message);
                        AppError::runner(RunnerError::Stopped)
                    });
            }
        };

        let outputs = self.collect_outputs(command).await?;
        match self.tool.parse_results(&outputs, elapsed) {
            Ok(results) => {
                if !status.success() {
                    tracing::warn!(
                        "{} exited with {} but produced results",
                        framework,
                        status
                    );
                }
                Ok(results)
            }
            Err(message) if status.success() => {
                Err(AppError::runner(RunnerError::ParseOutput {
                    framework: framework.as_str(),
                    message,
                }))
            }
            Err(message) => {
                tracing::debug!("{} output unusable: {}", framework, message);
                Err(AppError::runner(RunnerError::ExitFailure {
                    framework: framework.as_str(),
                    status: status.to_string(),
                    stderr: stderr_tail,
                }))
            }
        }
    }
}

/// Logs every line at debug level and returns the last `keep` lines.
async fn read_tail<R>(reader: R, framework: Framework, keep: usize) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(keep);
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                tracing::debug!("[{}] {}", framework, line);
                if keep == 0 {
                    continue;
                }
                if tail.len() == keep {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Ok(None) => break,
            Err(err) => {
                tracing::debug!("Failed to read {} output: {}", framework, err);
                break;
            }
        }
    }
    tail.into_iter().collect::<Vec<_>>().join("\n")
}
