use crate::args::RunArgs;
use crate::args::parsers::parse_payload;
use crate::error::{AppError, AppResult, ValidationError};

use super::types::{TestSettings, parse_target_url};

/// Applies `run` flags on top of `settings` (usually a preset).
///
/// # Errors
///
/// Returns an error when a flag value is invalid or `--output` is combined
/// with anything other than a single export format.
pub fn apply_run_args(settings: &mut TestSettings, args: &RunArgs) -> AppResult<()> {
    if args.output.is_some() && args.exports.len() != 1 {
        return Err(AppError::validation(
            ValidationError::OutputRequiresSingleExport,
        ));
    }
    if let Some(url) = args.url.as_deref() {
        parse_target_url(url)?;
        settings.target_url = Some(url.trim().to_owned());
    }
    if let Some(framework) = args.framework {
        settings.framework = Some(framework);
    }
    if let Some(test_type) = args.test_type {
        settings.test_type = test_type;
    }
    if let Some(users) = args.users {
        settings.users = users.get();
    }
    if let Some(duration) = args.duration {
        settings.duration = duration.get();
    }
    if let Some(rampup) = args.rampup {
        settings.rampup = rampup;
    }
    if let Some(method) = args.method {
        settings.method = method;
    }
    if let Some(payload) = args.payload.as_deref() {
        settings.payload = Some(parse_payload(payload)?);
    }
    for (key, value) in &args.params {
        settings.custom_params.insert(key.clone(), value.clone());
    }
    Ok(())
}
