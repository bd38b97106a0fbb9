use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::args::{Framework, HttpMethod, TestType};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

pub const DEFAULT_USERS: u64 = 100;
pub const DEFAULT_DURATION_SECS: u64 = 60;
pub const DEFAULT_RAMPUP_SECS: u64 = 10;
pub const HEADER_PARAM_PREFIX: &str = "header.";

/// Mutable test configuration edited by the shell and stored in presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,
    pub test_type: TestType,
    #[serde(
        rename = "url",
        alias = "target_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_url: Option<String>,
    pub method: HttpMethod,
    #[serde(alias = "concurrent_users")]
    pub users: u64,
    pub duration: u64,
    pub rampup: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    pub custom_params: BTreeMap<String, String>,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            framework: None,
            test_type: TestType::default(),
            target_url: None,
            method: HttpMethod::default(),
            users: DEFAULT_USERS,
            duration: DEFAULT_DURATION_SECS,
            rampup: DEFAULT_RAMPUP_SECS,
            payload: None,
            custom_params: BTreeMap::new(),
        }
    }
}

/// Validated, immutable view of [`TestSettings`] handed to runners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    pub framework: Framework,
    pub test_type: TestType,
    pub url: Url,
    pub method: HttpMethod,
    pub users: u64,
    pub duration: Duration,
    pub rampup: Duration,
    pub payload: Option<String>,
    pub custom_params: BTreeMap<String, String>,
}

impl TestSettings {
    /// Rejects values that cannot have come from the shell.
    ///
    /// # Errors
    ///
    /// Returns an error when `users` or `duration` is zero.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.users == 0 {
            return Err(ConfigError::FieldTooSmall {
                field: "users",
                min: 1,
            });
        }
        if self.duration == 0 {
            return Err(ConfigError::FieldTooSmall {
                field: "duration",
                min: 1,
            });
        }
        Ok(())
    }

    /// Validates the settings and freezes them into a [`TestPlan`].
    ///
    /// # Errors
    ///
    /// Returns an error when the URL or framework is missing, the URL is
    /// invalid for the test type, or a numeric field is out of range.
    pub fn to_plan(&self) -> AppResult<TestPlan> {
        let raw_url = self
            .target_url
            .as_deref()
            .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
        let framework = self
            .framework
            .ok_or_else(|| AppError::validation(ValidationError::MissingFramework))?;
        self.check_bounds().map_err(AppError::config)?;
        let url = url_for_test_type(raw_url, self.test_type)?;

        Ok(TestPlan {
            framework,
            test_type: self.test_type,
            url,
            method: self.method,
            users: self.users,
            duration: Duration::from_secs(self.duration),
            rampup: Duration::from_secs(self.rampup),
            payload: self.payload.clone(),
            custom_params: self.custom_params.clone(),
        })
    }
}

impl TestPlan {
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.custom_params.get(key).map(String::as_str)
    }

    /// `header.<Name>` custom params as header pairs.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom_params.iter().filter_map(|(key, value)| {
            key.strip_prefix(HEADER_PARAM_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| (name, value.as_str()))
        })
    }
}

/// Parses a URL accepted by `/url`: absolute, with a host and a web scheme.
///
/// # Errors
///
/// Returns an error when the URL does not parse, has no host or uses an
/// unsupported scheme.
pub fn parse_target_url(raw: &str) -> AppResult<Url> {
    let url = parse_with_host(raw)?;
    match url.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(url),
        other => Err(AppError::validation(ValidationError::UnsupportedScheme {
            scheme: other.to_owned(),
            test_type: "any",
        })),
    }
}

/// Resolves the URL a runner should hit. Websocket tests accept `http(s)`
/// and rewrite it to `ws(s)`.
///
/// # Errors
///
/// Returns an error when the scheme does not fit the test type.
pub fn url_for_test_type(raw: &str, test_type: TestType) -> AppResult<Url> {
    let mut url = parse_with_host(raw)?;
    let scheme = url.scheme().to_owned();
    let unsupported = || {
        AppError::validation(ValidationError::UnsupportedScheme {
            scheme: scheme.clone(),
            test_type: test_type.as_str(),
        })
    };
    match (test_type.is_http(), scheme.as_str()) {
        (true, "http" | "https") | (false, "ws" | "wss") => Ok(url),
        (false, "http" | "https") => {
            let ws_scheme = if scheme == "https" { "wss" } else { "ws" };
            url.set_scheme(ws_scheme).map_err(|()| unsupported())?;
            Ok(url)
        }
        _ => Err(unsupported()),
    }
}

fn parse_with_host(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: trimmed.to_owned(),
            source: err,
        })
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::validation(ValidationError::UrlMissingHost {
            url: trimmed.to_owned(),
        }));
    }
    Ok(url)
}
