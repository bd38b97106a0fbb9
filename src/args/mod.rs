//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, RunArgs, ShellArgs};
pub use types::{ExportFormat, Framework, HttpMethod, PositiveU64, TestType};

pub(crate) use defaults::{DEFAULT_THEME, DEFAULT_USER_AGENT, default_config_dir};
