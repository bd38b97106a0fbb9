use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No target URL specified. Use /url <target-url> to set it.")]
    MissingUrl,
    #[error("No framework specified. Use /framework <name> to select one.")]
    MissingFramework,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' is missing a host.")]
    UrlMissingHost { url: String },
    #[error("Unsupported URL scheme '{scheme}' for {test_type} tests.")]
    UnsupportedScheme {
        scheme: String,
        test_type: &'static str,
    },
    #[error("Unknown framework: {value}. Available: {available}")]
    UnknownFramework { value: String, available: String },
    #[error("Unknown test type: {value}. Available: {available}")]
    UnknownTestType { value: String, available: String },
    #[error("Unknown HTTP method '{value}'. Use GET, POST, PUT, PATCH or DELETE.")]
    UnknownMethod { value: String },
    #[error("Unknown theme: {value}. Available themes: {available}")]
    UnknownTheme { value: String, available: String },
    #[error("Format '{value}' not supported. Available: json, csv, html")]
    UnknownExportFormat { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid number '{value}': {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Payload is not valid JSON: {source}")]
    InvalidPayload {
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid parameter '{value}'. Expected key=value.")]
    InvalidParam { value: String },
    #[error("Invalid boolean value '{value}'. Use true/false, yes/no, on/off or 1/0.")]
    InvalidBoolean { value: String },
    #[error("--output requires exactly one --export format.")]
    OutputRequiresSingleExport,
    #[error("The simple runner only supports HTTP test types; use the advanced runner for websocket.")]
    SimpleRunnerUnsupportedType,
    #[error("{framework} scripts only cover HTTP test types; use the advanced runner for websocket.")]
    ExternalRunnerUnsupportedType { framework: &'static str },
    #[error("Unknown command: {input}. Type /help for available commands.")]
    UnknownCommand { input: String },
    #[error("Usage: {usage}")]
    Usage { usage: &'static str },
    #[error("No test results available. Run a test first with /run.")]
    NoResults,
    #[error("No run with id '{id}'. Use /results history to list runs.")]
    UnknownRun { id: String },
    #[error("Failed to build runtime: {source}")]
    RuntimeBuild {
        #[source]
        source: std::io::Error,
    },
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
