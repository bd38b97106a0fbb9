use super::types::PositiveU64;
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(crate) fn parse_non_negative_u64(s: &str) -> AppResult<u64> {
    s.trim().parse::<u64>().map_err(|err| {
        AppError::validation(ValidationError::InvalidNumber {
            value: s.to_owned(),
            source: err,
        })
    })
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Parses `key=value`; the key is trimmed and must not be empty.
pub(crate) fn parse_param(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidParam {
            value: s.to_owned(),
        }),
    }
}

/// Checks that `text` is valid JSON and returns it trimmed.
pub(crate) fn parse_payload(text: &str) -> AppResult<String> {
    let trimmed = text.trim();
    serde_json::from_str::<serde_json::Value>(trimmed)
        .map_err(|err| AppError::validation(ValidationError::InvalidPayload { source: err }))?;
    Ok(trimmed.to_owned())
}
