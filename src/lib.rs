//! Core library for the `chakload` load testing shell.
//!
//! The binary is a thin wrapper around [`run`]. The modules below hold the
//! pieces it is assembled from: CLI arguments, test settings and presets,
//! the built-in and external runners, metrics aggregation, the interactive
//! shell and result exports.
pub mod args;
pub mod config;
mod entry;
pub mod error;
pub mod execution;
pub mod export;
pub mod frameworks;
pub mod metrics;
pub mod repl;
pub mod session;
pub mod shutdown;
pub mod shutdown_handlers;
mod system;
pub mod templates;
pub mod ui;

/// Parses the process arguments and runs the selected mode to completion.
///
/// # Errors
///
/// Returns an error when arguments are invalid or the selected mode fails.
pub fn run() -> error::AppResult<()> {
    entry::run()
}
