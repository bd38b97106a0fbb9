use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Framework '{framework}' is not installed on this system.")]
    FrameworkUnavailable { framework: &'static str },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
    #[error("Failed to create working directory: {source}")]
    WorkDir {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write script '{}': {source}", path.display())]
    WriteScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to start {framework}: {source}")]
    Spawn {
        framework: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{framework} did not finish within {timeout:?}.")]
    TimedOut {
        framework: &'static str,
        timeout: Duration,
    },
    #[error("{framework} exited with {status}: {stderr}")]
    ExitFailure {
        framework: &'static str,
        status: String,
        stderr: String,
    },
    #[error("Failed to read {framework} output '{}': {source}", path.display())]
    ReadOutput {
        framework: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {framework} output: {message}")]
    ParseOutput {
        framework: &'static str,
        message: String,
    },
    #[error("Test was stopped before producing results.")]
    Stopped,
    #[error("{framework} runner was handed a test prepared by another runner.")]
    PreparedMismatch { framework: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
