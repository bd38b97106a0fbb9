use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

use crate::error::{AppError, ValidationError};

fn joined_names<T: Copy>(items: &[T], name: fn(T) -> &'static str) -> String {
    items
        .iter()
        .map(|item| name(*item))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load testing engine used to drive a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Framework {
    Simple,
    Advanced,
    Locust,
    K6,
    Artillery,
    JMeter,
}

impl Framework {
    pub const ALL: [Framework; 6] = [
        Framework::Simple,
        Framework::Advanced,
        Framework::Locust,
        Framework::K6,
        Framework::Artillery,
        Framework::JMeter,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Framework::Simple => "simple",
            Framework::Advanced => "advanced",
            Framework::Locust => "locust",
            Framework::K6 => "k6",
            Framework::Artillery => "artillery",
            Framework::JMeter => "jmeter",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Framework::Simple => "Simple HTTP",
            Framework::Advanced => "Advanced HTTP",
            Framework::Locust => "Locust",
            Framework::K6 => "K6",
            Framework::Artillery => "Artillery",
            Framework::JMeter => "JMeter",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Framework::Simple => "Built-in async HTTP engine, constant concurrency",
            Framework::Advanced => "Built-in engine with ramp-up and per-type payloads",
            Framework::Locust => "Python-based, easy to use with Python scripting",
            Framework::K6 => "Go-based, high-performance with JavaScript",
            Framework::Artillery => "Node.js, YAML configuration",
            Framework::JMeter => "Java-based, enterprise features",
        }
    }

    #[must_use]
    pub const fn is_builtin(self) -> bool {
        matches!(self, Framework::Simple | Framework::Advanced)
    }

    /// Executable looked up on `PATH` for external frameworks.
    #[must_use]
    pub const fn binary(self) -> Option<&'static str> {
        match self {
            Framework::Simple | Framework::Advanced => None,
            Framework::Locust => Some("locust"),
            Framework::K6 => Some("k6"),
            Framework::Artillery => Some("artillery"),
            Framework::JMeter => Some("jmeter"),
        }
    }

    /// Only the advanced runner speaks WebSocket; every other framework
    /// drives HTTP test types.
    #[must_use]
    pub const fn supports(self, test_type: TestType) -> bool {
        test_type.is_http() || matches!(self, Framework::Advanced)
    }

    #[must_use]
    pub fn names() -> String {
        joined_names(&Self::ALL, Self::as_str)
    }
}

impl<'de> Deserialize<'de> for Framework {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse::<Framework>().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Framework {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Framework {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" | "http" => Ok(Framework::Simple),
            "advanced" | "builtin" | "enhanced" => Ok(Framework::Advanced),
            "locust" => Ok(Framework::Locust),
            "k6" => Ok(Framework::K6),
            "artillery" => Ok(Framework::Artillery),
            "jmeter" => Ok(Framework::JMeter),
            _ => Err(AppError::validation(ValidationError::UnknownFramework {
                value: s.to_owned(),
                available: Framework::names(),
            })),
        }
    }
}

/// Kind of target being load tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TestType {
    #[default]
    WebSite,
    TelegramWebhook,
    ApiEndpoint,
    GraphqlEndpoint,
    Websocket,
}

impl TestType {
    pub const ALL: [TestType; 5] = [
        TestType::WebSite,
        TestType::TelegramWebhook,
        TestType::ApiEndpoint,
        TestType::GraphqlEndpoint,
        TestType::Websocket,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TestType::WebSite => "web-site",
            TestType::TelegramWebhook => "telegram-webhook",
            TestType::ApiEndpoint => "api-endpoint",
            TestType::GraphqlEndpoint => "graphql-endpoint",
            TestType::Websocket => "websocket",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            TestType::WebSite => "Test website (HTTP/HTTPS requests)",
            TestType::TelegramWebhook => "Test Telegram Bot webhook",
            TestType::ApiEndpoint => "Test REST API endpoint",
            TestType::GraphqlEndpoint => "Test GraphQL endpoint",
            TestType::Websocket => "Test WebSocket connections",
        }
    }

    /// Template file stem shared by the script-based frameworks.
    #[must_use]
    pub const fn template_stem(self) -> &'static str {
        match self {
            TestType::WebSite => "web_site",
            TestType::TelegramWebhook => "telegram_webhook",
            TestType::ApiEndpoint => "api_endpoint",
            TestType::GraphqlEndpoint => "graphql_endpoint",
            TestType::Websocket => "websocket",
        }
    }

    #[must_use]
    pub const fn is_http(self) -> bool {
        !matches!(self, TestType::Websocket)
    }

    #[must_use]
    pub fn names() -> String {
        joined_names(&Self::ALL, Self::as_str)
    }
}

impl<'de> Deserialize<'de> for TestType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse::<TestType>().map_err(serde::de::Error::custom)
    }
}

impl Serialize for TestType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TestType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web-site" | "website" | "web" => Ok(TestType::WebSite),
            "telegram-webhook" | "telegram" => Ok(TestType::TelegramWebhook),
            "api-endpoint" | "api" => Ok(TestType::ApiEndpoint),
            "graphql-endpoint" | "graphql" => Ok(TestType::GraphqlEndpoint),
            "websocket" | "ws" => Ok(TestType::Websocket),
            _ => Err(AppError::validation(ValidationError::UnknownTestType {
                value: s.to_owned(),
                available: TestType::names(),
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Patch | HttpMethod::Put)
    }

    #[must_use]
    pub const fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PATCH" => Ok(HttpMethod::Patch),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(AppError::validation(ValidationError::UnknownMethod {
                value: s.to_owned(),
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Html];

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" | "htm" => Ok(ExportFormat::Html),
            _ => Err(AppError::validation(ValidationError::UnknownExportFormat {
                value: s.to_owned(),
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveU64(NonZeroU64);

impl PositiveU64 {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for PositiveU64 {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(PositiveU64)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveU64 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber {
                value: s.to_owned(),
                source: err,
            })?;
        PositiveU64::try_from(value)
    }
}

impl From<PositiveU64> for u64 {
    fn from(value: PositiveU64) -> Self {
        value.get()
    }
}
