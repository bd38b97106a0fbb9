use super::types::HEADER_PARAM_PREFIX;
use super::*;
use crate::args::{ExportFormat, Framework, HttpMethod, PositiveU64, RunArgs, TestType};
use crate::error::{AppError, AppResult};
use std::time::Duration;
use tempfile::tempdir;

fn configured() -> TestSettings {
    TestSettings {
        framework: Some(Framework::Advanced),
        target_url: Some("http://localhost:8080/api".to_owned()),
        ..TestSettings::default()
    }
}

#[test]
fn defaults_match_shell_defaults() -> AppResult<()> {
    let settings = TestSettings::default();
    if settings.users != 100 || settings.duration != 60 || settings.rampup != 10 {
        return Err(AppError::validation("Unexpected numeric defaults"));
    }
    if settings.framework.is_some() || settings.target_url.is_some() {
        return Err(AppError::validation("Expected no framework or url"));
    }
    if settings.test_type != TestType::WebSite || settings.method != HttpMethod::Get {
        return Err(AppError::validation("Unexpected type or method"));
    }
    Ok(())
}

#[test]
fn plan_requires_url_then_framework() -> AppResult<()> {
    let missing_url = TestSettings::default().to_plan();
    match missing_url {
        Err(err) if err.to_string().starts_with("No target URL specified") => {}
        Err(_) | Ok(_) => return Err(AppError::validation("Expected missing url error")),
    }
    let missing_framework = TestSettings {
        target_url: Some("http://localhost".to_owned()),
        ..TestSettings::default()
    }
    .to_plan();
    match missing_framework {
        Err(err)
            if err.to_string()
                == "No framework specified. Use /framework <name> to select one." =>
        {
            Ok(())
        }
        Err(_) | Ok(_) => Err(AppError::validation("Expected missing framework error")),
    }
}

#[test]
fn plan_carries_settings() -> AppResult<()> {
    let mut settings = configured();
    settings.rampup = 0;
    settings
        .custom_params
        .insert(format!("{HEADER_PARAM_PREFIX}X-Token"), "abc".to_owned());
    settings
        .custom_params
        .insert("message".to_owned(), "hi".to_owned());
    let plan = settings.to_plan()?;
    if plan.duration != Duration::from_secs(60) || plan.rampup != Duration::ZERO {
        return Err(AppError::validation("Unexpected plan durations"));
    }
    let headers: Vec<(&str, &str)> = plan.headers().collect();
    if headers != vec![("X-Token", "abc")] {
        return Err(AppError::validation("Unexpected headers"));
    }
    if plan.param("message") != Some("hi") {
        return Err(AppError::validation("Unexpected param"));
    }
    Ok(())
}

#[test]
fn websocket_plan_rewrites_http_scheme() -> AppResult<()> {
    let settings = TestSettings {
        test_type: TestType::Websocket,
        target_url: Some("https://example.com/socket".to_owned()),
        ..configured()
    };
    let plan = settings.to_plan()?;
    if plan.url.as_str() != "wss://example.com/socket" {
        return Err(AppError::validation(format!(
            "Unexpected websocket url {}",
            plan.url
        )));
    }
    Ok(())
}

#[test]
fn http_plan_rejects_ws_scheme() -> AppResult<()> {
    let settings = TestSettings {
        target_url: Some("ws://example.com".to_owned()),
        ..configured()
    };
    if settings.to_plan().is_ok() {
        return Err(AppError::validation("Expected ws scheme to be rejected"));
    }
    Ok(())
}

#[test]
fn target_url_validation() -> AppResult<()> {
    for good in ["http://a.test", "https://a.test:8443/x?q=1", "ws://a.test/ws"] {
        parse_target_url(good)?;
    }
    for bad in ["not a url", "ftp://a.test", "file:///tmp/x", "/relative"] {
        if parse_target_url(bad).is_ok() {
            return Err(AppError::validation(format!("Expected {bad} to fail")));
        }
    }
    Ok(())
}

#[test]
fn zero_users_fail_plan() -> AppResult<()> {
    let settings = TestSettings {
        users: 0,
        ..configured()
    };
    if settings.to_plan().is_ok() {
        return Err(AppError::validation("Expected zero users to fail"));
    }
    Ok(())
}

#[test]
fn preset_round_trip_and_listing() -> AppResult<()> {
    let dir = tempdir()?;
    let store = PresetStore::new(dir.path().join("configs"));
    if !store.list()?.is_empty() {
        return Err(AppError::validation("Expected no presets before save"));
    }

    let mut settings = configured();
    settings.payload = Some("{\"a\":1}".to_owned());
    settings
        .custom_params
        .insert("header.Authorization".to_owned(), "Bearer x".to_owned());
    let path = store.save("staging", &settings)?;
    store.save("alpha", &TestSettings::default())?;
    if !path.ends_with("configs/staging.toml") {
        return Err(AppError::validation("Unexpected preset path"));
    }

    let loaded = store.load("staging")?;
    if loaded != settings {
        return Err(AppError::validation("Preset did not round trip"));
    }
    if store.list()? != vec!["alpha".to_owned(), "staging".to_owned()] {
        return Err(AppError::validation("Unexpected preset listing"));
    }

    store.delete("alpha")?;
    if store.exists("alpha") || store.load("alpha").is_ok() {
        return Err(AppError::validation("Expected alpha to be deleted"));
    }
    Ok(())
}

#[test]
fn preset_reads_aliases_and_json() -> AppResult<()> {
    let dir = tempdir()?;
    std::fs::write(
        dir.path().join("legacy.json"),
        r#"{"target_url": "http://localhost:3000", "concurrent_users": 7, "framework": "k6", "extra": true}"#,
    )?;
    std::fs::write(
        dir.path().join("short.toml"),
        "url = \"http://localhost\"\nmethod = \"post\"\ntest_type = \"graphql\"\n",
    )?;
    let store = PresetStore::new(dir.path().to_path_buf());

    let legacy = store.load("legacy")?;
    if legacy.users != 7
        || legacy.framework != Some(Framework::K6)
        || legacy.target_url.as_deref() != Some("http://localhost:3000")
        || legacy.duration != 60
    {
        return Err(AppError::validation("Unexpected legacy preset"));
    }
    let short = store.load("short")?;
    if short.method != HttpMethod::Post || short.test_type != TestType::GraphqlEndpoint {
        return Err(AppError::validation("Unexpected short preset"));
    }
    Ok(())
}

#[test]
fn preset_framework_and_type_are_case_insensitive() -> AppResult<()> {
    let dir = tempdir()?;
    std::fs::write(
        dir.path().join("mixed.toml"),
        "framework = \"JMeter\"\ntest_type = \"API\"\n",
    )?;
    std::fs::write(dir.path().join("upper.json"), r#"{"framework": "K6"}"#)?;
    std::fs::write(dir.path().join("bogus.toml"), "framework = \"gatling\"\n")?;
    let store = PresetStore::new(dir.path().to_path_buf());

    let mixed = store.load("mixed")?;
    if mixed.framework != Some(Framework::JMeter) || mixed.test_type != TestType::ApiEndpoint {
        return Err(AppError::validation("Unexpected mixed-case preset"));
    }
    if store.load("upper")?.framework != Some(Framework::K6) {
        return Err(AppError::validation("Expected K6 from upper-case preset"));
    }
    if store.load("bogus").is_ok() {
        return Err(AppError::validation("Expected unknown framework to fail"));
    }

    store.save("saved", &mixed)?;
    let text = std::fs::read_to_string(dir.path().join("saved.toml"))?;
    if !text.contains("framework = \"jmeter\"") || !text.contains("test_type = \"api-endpoint\"") {
        return Err(AppError::validation(format!("Unexpected saved preset: {text}")));
    }
    Ok(())
}

#[test]
fn preset_names_are_restricted() -> AppResult<()> {
    let dir = tempdir()?;
    let store = PresetStore::new(dir.path().to_path_buf());
    let long = "x".repeat(65);
    for name in ["", "../etc", "a b", "a/b", long.as_str()] {
        if store.save(name, &TestSettings::default()).is_ok() {
            return Err(AppError::validation(format!("Expected '{name}' to be rejected")));
        }
    }
    Ok(())
}

#[test]
fn preset_with_zero_duration_is_rejected() -> AppResult<()> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("broken.toml"), "duration = 0\n")?;
    let store = PresetStore::new(dir.path().to_path_buf());
    match store.load("broken") {
        Err(err) if err.to_string().contains("duration") => Ok(()),
        Err(_) | Ok(_) => Err(AppError::validation("Expected duration bound error")),
    }
}

#[test]
fn run_args_override_preset() -> AppResult<()> {
    let mut settings = configured();
    let args = RunArgs {
        url: Some(" http://other.test/ ".to_owned()),
        users: Some(PositiveU64::try_from(5)?),
        rampup: Some(0),
        payload: Some("[1,2]".to_owned()),
        params: vec![("query".to_owned(), "{ me }".to_owned())],
        ..RunArgs::default()
    };
    apply_run_args(&mut settings, &args)?;
    if settings.target_url.as_deref() != Some("http://other.test/")
        || settings.users != 5
        || settings.rampup != 0
        || settings.payload.as_deref() != Some("[1,2]")
        || settings.custom_params.get("query").map(String::as_str) != Some("{ me }")
        || settings.framework != Some(Framework::Advanced)
    {
        return Err(AppError::validation("Unexpected applied settings"));
    }
    Ok(())
}

#[test]
fn output_requires_single_export() -> AppResult<()> {
    let args = RunArgs {
        output: Some("out.json".into()),
        exports: vec![ExportFormat::Json, ExportFormat::Csv],
        ..RunArgs::default()
    };
    if apply_run_args(&mut configured(), &args).is_ok() {
        return Err(AppError::validation("Expected --output conflict"));
    }
    Ok(())
}
