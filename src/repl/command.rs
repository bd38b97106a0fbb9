//! Shell command table and line parsing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Framework,
    Type,
    Url,
    Users,
    Duration,
    Rampup,
    Method,
    Payload,
    Param,
    Config,
    Run,
    Results,
    Export,
    Theme,
    Clear,
    Exit,
}

/// How the text after the command name is split into arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgStyle {
    Words,
    /// The whole remainder is one argument.
    Rest,
    /// One word, then the remainder.
    WordThenRest,
}

#[derive(Debug)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub summary: &'static str,
    pub detail: &'static str,
    args: ArgStyle,
}

pub const COMMANDS: [CommandSpec; 17] = [
    CommandSpec {
        kind: CommandKind::Help,
        name: "help",
        aliases: &[],
        usage: "/help [command]",
        summary: "Show available commands",
        detail: "Without an argument lists every command. With a command name shows its usage and details.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Framework,
        name: "framework",
        aliases: &[],
        usage: "/framework [name|list]",
        summary: "Select the load testing framework",
        detail: "Without an argument shows the framework menu. 'list' shows installed frameworks. Frameworks: simple, advanced, locust, k6, artillery, jmeter. External frameworks must be on PATH.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Type,
        name: "type",
        aliases: &[],
        usage: "/type [test-type|list]",
        summary: "Select the test type",
        detail: "Test types: web-site, telegram-webhook, api-endpoint, graphql-endpoint, websocket.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Url,
        name: "url",
        aliases: &[],
        usage: "/url <target-url>",
        summary: "Set the target URL",
        detail: "Accepts absolute http, https, ws and wss URLs with a host.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Users,
        name: "users",
        aliases: &[],
        usage: "/users <count>",
        summary: "Set the number of concurrent users",
        detail: "Positive integer. Default 100.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Duration,
        name: "duration",
        aliases: &[],
        usage: "/duration <seconds>",
        summary: "Set the test duration",
        detail: "Positive integer number of seconds. Default 60.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Rampup,
        name: "rampup",
        aliases: &[],
        usage: "/rampup <seconds>",
        summary: "Set the ramp-up time",
        detail: "Non-negative number of seconds over which users start. Default 10.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Method,
        name: "method",
        aliases: &[],
        usage: "/method <GET|POST|PUT|PATCH|DELETE>",
        summary: "Set the HTTP method for api-endpoint tests",
        detail: "Bodies are sent for POST, PUT and PATCH.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Payload,
        name: "payload",
        aliases: &[],
        usage: "/payload <json>|clear",
        summary: "Set the JSON request body",
        detail: "The rest of the line must be valid JSON. 'clear' removes the payload.",
        args: ArgStyle::Rest,
    },
    CommandSpec {
        kind: CommandKind::Param,
        name: "param",
        aliases: &[],
        usage: "/param <key> <value> | /param clear",
        summary: "Set or list custom parameters",
        detail: "Without arguments lists parameters. 'header.<Name>' keys are sent as request headers; 'message' and 'query' shape telegram and graphql tests. Parameters are available to templates upper-cased.",
        args: ArgStyle::WordThenRest,
    },
    CommandSpec {
        kind: CommandKind::Config,
        name: "config",
        aliases: &[],
        usage: "/config [show|save <name>|load <name>|list|delete <name>]",
        summary: "Show or manage saved presets",
        detail: "Presets are stored as TOML in the config directory.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Run,
        name: "run",
        aliases: &["start"],
        usage: "/run",
        summary: "Run the load test",
        detail: "Validates the configuration, runs the test and records the results. Ctrl+C stops the test early.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Results,
        name: "results",
        aliases: &[],
        usage: "/results [history|<id>]",
        summary: "Show test results",
        detail: "Without an argument shows the last run. 'history' lists every run of this session.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Export,
        name: "export",
        aliases: &[],
        usage: "/export <json|csv|html> [file]",
        summary: "Export the last results",
        detail: "Without a file name writes chakload_<id>_<timestamp>.<ext> to the output directory.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Theme,
        name: "theme",
        aliases: &[],
        usage: "/theme [name|list]",
        summary: "Change the colour theme",
        detail: "Themes: gemini, qwen, ocean, terminal.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Clear,
        name: "clear",
        aliases: &["cls"],
        usage: "/clear",
        summary: "Clear the screen",
        detail: "Clears the terminal.",
        args: ArgStyle::Words,
    },
    CommandSpec {
        kind: CommandKind::Exit,
        name: "exit",
        aliases: &["quit"],
        usage: "/exit",
        summary: "Exit the shell",
        detail: "Ctrl+C or end of input at the prompt also exits.",
        args: ArgStyle::Words,
    },
];

/// Finds a command by name or alias, case-insensitively, with or without
/// the leading slash.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    let wanted = name.trim().trim_start_matches('/').to_ascii_lowercase();
    COMMANDS
        .iter()
        .find(|spec| spec.name == wanted || spec.aliases.contains(&wanted.as_str()))
}

#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
    pub spec: &'static CommandSpec,
    pub args: Vec<String>,
}

impl PartialEq for CommandSpec {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for CommandSpec {}

#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Empty,
    Palette,
    Exit,
    Command(Invocation),
    Unknown(String),
}

fn split_args(style: ArgStyle, rest: &str) -> Vec<String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Vec::new();
    }
    match style {
        ArgStyle::Words => rest.split_whitespace().map(str::to_owned).collect(),
        ArgStyle::Rest => vec![rest.to_owned()],
        ArgStyle::WordThenRest => match rest.split_once(char::is_whitespace) {
            Some((first, remainder)) => {
                vec![first.to_owned(), remainder.trim_start().to_owned()]
            }
            None => vec![rest.to_owned()],
        },
    }
}

#[must_use]
pub fn parse_line(input: &str) -> Line {
    let line = input.trim();
    if line.is_empty() {
        return Line::Empty;
    }
    if line == "/" {
        return Line::Palette;
    }
    if matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit" | "q") {
        return Line::Exit;
    }
    let Some(body) = line.strip_prefix('/') else {
        return Line::Unknown(line.to_owned());
    };
    let (name, rest) = body
        .split_once(char::is_whitespace)
        .unwrap_or((body, ""));
    match lookup(name) {
        Some(spec) => Line::Command(Invocation {
            spec,
            args: split_args(spec.args, rest),
        }),
        None => Line::Unknown(line.to_owned()),
    }
}
