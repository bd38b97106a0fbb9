use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::args::Framework;
use crate::config::TestPlan;
use crate::error::AppResult;
use crate::metrics::{LiveStats, TestResults};
use crate::shutdown::ShutdownSender;

/// Everything a runner needs besides the plan while a test is executing.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Broadcasting on this stops the test early.
    pub shutdown_tx: ShutdownSender,
    pub live_tx: Option<watch::Sender<LiveStats>>,
}

/// Command line of an external tool, ready to spawn inside `workdir`.
#[derive(Debug)]
pub struct ExternalCommand {
    pub workdir: tempfile::TempDir,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub script_path: PathBuf,
}

/// Output of [`LoadRunner::prepare`].
#[derive(Debug)]
pub enum PreparedTest {
    Builtin { client: reqwest::Client },
    External(ExternalCommand),
}

#[async_trait]
pub trait LoadRunner: Send + Sync {
    fn framework(&self) -> Framework;

    /// Checks the plan and sets up whatever the run needs (HTTP client,
    /// rendered script, working directory).
    ///
    /// # Errors
    ///
    /// Returns an error when the framework cannot run this plan.
    async fn prepare(&self, plan: &TestPlan) -> AppResult<PreparedTest>;

    /// Runs until the plan's duration elapses or shutdown is broadcast.
    ///
    /// # Errors
    ///
    /// Returns an error when the run fails or produces no usable results.
    async fn execute(
        &self,
        prepared: &PreparedTest,
        plan: &TestPlan,
        context: RunContext,
    ) -> AppResult<TestResults>;
}
