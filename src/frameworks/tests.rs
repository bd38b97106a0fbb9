use std::ffi::OsString;

use super::detect::search_path;
use super::*;
use crate::args::TestType;
use crate::error::{AppError, AppResult};

#[test]
fn runner_for_matches_framework() -> AppResult<()> {
    let templates = TemplateManager::default();
    for framework in Framework::ALL {
        let runner = runner_for(framework, &templates);
        if runner.framework() != framework {
            return Err(AppError::validation(format!(
                "runner_for({framework}) returned {}",
                runner.framework()
            )));
        }
    }
    Ok(())
}

#[test]
fn builtin_frameworks_are_always_available() -> AppResult<()> {
    let availability = detect_availability();
    if availability.len() != Framework::ALL.len() {
        return Err(AppError::validation("Expected one entry per framework"));
    }
    let builtin_ok = availability
        .iter()
        .filter(|(framework, _)| framework.is_builtin())
        .all(|(_, available)| *available);
    if !builtin_ok {
        return Err(AppError::validation("Built-in runners must be available"));
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn search_path_finds_executables_only() -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let first = tempfile::tempdir().map_err(|err| AppError::validation(err.to_string()))?;
    let second = tempfile::tempdir().map_err(|err| AppError::validation(err.to_string()))?;
    let plain = first.path().join("k6");
    std::fs::write(&plain, "not executable").map_err(|err| AppError::validation(err.to_string()))?;
    let tool = second.path().join("k6");
    std::fs::write(&tool, "#!/bin/sh\n").map_err(|err| AppError::validation(err.to_string()))?;
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755))
        .map_err(|err| AppError::validation(err.to_string()))?;

    let path = std::env::join_paths([first.path(), second.path()])
        .map_err(|err| AppError::validation(err.to_string()))?;
    if search_path("k6", &path, &[String::new()]) != Some(tool) {
        return Err(AppError::validation("Expected the executable in the second dir"));
    }
    if search_path("locust", &path, &[String::new()]).is_some() {
        return Err(AppError::validation("Expected no locust"));
    }
    if search_path("k6", &OsString::new(), &[String::new()]).is_some() {
        return Err(AppError::validation("Empty PATH finds nothing"));
    }
    Ok(())
}

#[test]
fn only_the_advanced_runner_takes_websocket() -> AppResult<()> {
    for framework in Framework::ALL {
        if unsupported_test_type(framework, TestType::ApiEndpoint).is_some() {
            return Err(AppError::validation(format!("{framework} refused an HTTP type")));
        }
        let refused = unsupported_test_type(framework, TestType::Websocket).is_some();
        if refused == (framework == Framework::Advanced) {
            return Err(AppError::validation(format!(
                "Unexpected websocket support for {framework}"
            )));
        }
    }
    match unsupported_test_type(Framework::K6, TestType::Websocket) {
        Some(err) if err.to_string().starts_with("K6 scripts only cover HTTP test types") => Ok(()),
        Some(_) | None => Err(AppError::validation("Expected the k6 websocket message")),
    }
}
