use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::defaults::{DEFAULT_THEME, default_config_dir};
use super::parsers::{parse_bool_env, parse_param, parse_positive_u64};
use super::types::{ExportFormat, Framework, HttpMethod, PositiveU64, TestType};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Start the interactive shell (default)
    Interactive,
    /// Run a single load test and exit
    Run(RunArgs),
    /// List load testing frameworks and whether they are installed
    Frameworks,
    /// List available colour themes
    Themes,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// Load settings from a saved preset before applying flags
    #[arg(long = "preset")]
    pub preset: Option<String>,

    /// Target URL
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Framework (simple, advanced, locust, k6, artillery, jmeter)
    #[arg(long, short = 'f')]
    pub framework: Option<Framework>,

    /// Test type (web-site, telegram-webhook, api-endpoint, graphql-endpoint, websocket)
    #[arg(long = "type", short = 'T')]
    pub test_type: Option<TestType>,

    /// Number of concurrent users
    #[arg(long, short = 'c', value_parser = parse_positive_u64)]
    pub users: Option<PositiveU64>,

    /// Test duration in seconds
    #[arg(long, short = 'd', value_parser = parse_positive_u64)]
    pub duration: Option<PositiveU64>,

    /// Ramp-up time in seconds
    #[arg(long, short = 'r')]
    pub rampup: Option<u64>,

    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    #[arg(long, short = 'X')]
    pub method: Option<HttpMethod>,

    /// JSON request body
    #[arg(long)]
    pub payload: Option<String>,

    /// Custom parameter in key=value form (repeatable)
    #[arg(long = "param", short = 'P', value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Export results after the run (repeatable)
    #[arg(long = "export", short = 'e')]
    pub exports: Vec<ExportFormat>,

    /// Output file for a single export
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "chakload",
    version,
    about = "Interactive load testing shell that drives built-in HTTP workers or k6, Locust, Artillery and JMeter."
)]
pub struct ShellArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding saved presets
    #[arg(long = "config-dir", env = "CHAKLOAD_CONFIG_DIR", default_value_os_t = default_config_dir(), global = true)]
    pub config_dir: PathBuf,

    /// Default directory for exported results
    #[arg(long = "output-dir", env = "CHAKLOAD_OUTPUT_DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Initial colour theme (gemini, qwen, ocean, terminal)
    #[arg(long, env = "CHAKLOAD_THEME", default_value = DEFAULT_THEME, global = true)]
    pub theme: String,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env, global = true)]
    pub no_color: bool,

    /// Disable the live progress dashboard
    #[arg(long = "no-ui", global = true)]
    pub no_ui: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by CHAKLOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}
