use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read preset '{}': {source}", path.display())]
    ReadPreset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write preset '{}': {source}", path.display())]
    WritePreset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to delete preset '{}': {source}", path.display())]
    DeletePreset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to list presets in '{}': {source}", path.display())]
    ListPresets {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML preset '{}': {source}", path.display())]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize preset: {source}")]
    SerializeToml {
        #[source]
        source: toml::ser::Error,
    },
    #[error("Failed to parse JSON preset '{}': {source}", path.display())]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Preset '{name}' not found in {}.", dir.display())]
    PresetNotFound { name: String, dir: PathBuf },
    #[error("Invalid preset name '{name}'. Use 1-64 letters, digits, '-' or '_'.")]
    InvalidPresetName { name: String },
    #[error("Preset field '{field}' must be >= {min}.")]
    FieldTooSmall { field: &'static str, min: u64 },
    #[error("Failed to read template '{}': {source}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Template '{name}' not found for framework {framework}.")]
    TemplateNotFound {
        framework: &'static str,
        name: String,
    },
    #[error("Missing template variable: ${{{name}}}")]
    MissingTemplateVar { name: String },
    #[error("Unterminated template placeholder at byte {offset}.")]
    UnterminatedPlaceholder { offset: usize },
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
