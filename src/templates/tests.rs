use super::vars::param_var_name;
use super::*;
use crate::args::{Framework, HttpMethod, TestType};
use crate::config::TestSettings;
use crate::error::{AppError, AppResult};
use std::collections::BTreeMap;
use tempfile::tempdir;

fn plan(framework: Framework, test_type: TestType) -> AppResult<TestPlan> {
    TestSettings {
        framework: Some(framework),
        test_type,
        target_url: Some("http://api.test:8080/v1/items?limit=5".to_owned()),
        users: 20,
        duration: 30,
        rampup: 5,
        ..TestSettings::default()
    }
    .to_plan()
}

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[test]
fn render_substitutes_and_escapes_dollar() -> AppResult<()> {
    let rendered = render(
        "users=${USERS} cost=$$5 plain=$x end",
        &vars(&[("USERS", "10")]),
    )?;
    if rendered != "users=10 cost=$5 plain=$x end" {
        return Err(AppError::validation(format!("Unexpected render: {rendered}")));
    }
    Ok(())
}

#[test]
fn render_rejects_unknown_variable() -> AppResult<()> {
    match render("a ${NOPE} b", &BTreeMap::new()) {
        Err(err) if err.to_string().contains("NOPE") => Ok(()),
        Err(_) | Ok(_) => Err(AppError::validation("Expected missing variable error")),
    }
}

#[test]
fn render_rejects_unterminated_placeholder() -> AppResult<()> {
    match render("ok ${USERS", &vars(&[("USERS", "1")])) {
        Err(err) if err.to_string().contains("byte 3") => Ok(()),
        Err(_) | Ok(_) => Err(AppError::validation("Expected unterminated error")),
    }
}

#[test]
fn context_vars_describe_the_plan() -> AppResult<()> {
    let mut plan = plan(Framework::K6, TestType::ApiEndpoint)?;
    plan.method = HttpMethod::Post;
    plan.custom_params
        .insert("message".to_owned(), "say \"hi\"".to_owned());
    let vars = context_vars(&plan);
    let expect = [
        ("USERS", "20"),
        ("DURATION", "30"),
        ("RAMPUP", "5"),
        ("METHOD", "POST"),
        ("HOST", "api.test"),
        ("PORT", "8080"),
        ("PROTOCOL", "http"),
        ("PATH", "/v1/items"),
        ("ENDPOINT_PATH", "/v1/items?limit=5"),
        ("BASE_URL", "http://api.test:8080"),
        ("REQUEST_BODY", "{}"),
        ("TEST_MESSAGE", "say \\\"hi\\\""),
        ("MESSAGE", "say \\\"hi\\\""),
        ("GRAPHQL_QUERY", "{ __typename }"),
    ];
    for (key, value) in expect {
        if vars.get(key).map(String::as_str) != Some(value) {
            return Err(AppError::validation(format!(
                "Unexpected {key}: {:?}",
                vars.get(key)
            )));
        }
    }
    Ok(())
}

#[test]
fn jmeter_values_are_xml_escaped() -> AppResult<()> {
    let mut plan = plan(Framework::JMeter, TestType::ApiEndpoint)?;
    plan.payload = Some("{\"a\":\"<b>&\"}".to_owned());
    let vars = context_vars(&plan);
    if vars.get("REQUEST_BODY").map(String::as_str)
        != Some("{&quot;a&quot;:&quot;&lt;b&gt;&amp;&quot;}")
    {
        return Err(AppError::validation("Expected XML escaped body"));
    }
    Ok(())
}

#[test]
fn param_names_are_upper_snake_case() -> AppResult<()> {
    if param_var_name("header.X-Token") != "HEADER_X_TOKEN" {
        return Err(AppError::validation("Unexpected param var name"));
    }
    Ok(())
}

#[test]
fn every_bundled_template_renders() -> AppResult<()> {
    let manager = TemplateManager::default();
    for framework in Framework::ALL.into_iter().filter(|f| !f.is_builtin()) {
        for test_type in TestType::ALL {
            let plan = plan(framework, test_type)?;
            let script = manager.render_for(&plan)?;
            if script.contains("${") {
                return Err(AppError::validation(format!(
                    "Unrendered placeholder in {framework} {test_type}"
                )));
            }
        }
    }
    Ok(())
}

#[test]
fn k6_picks_type_specific_template() -> AppResult<()> {
    let manager = TemplateManager::default();
    let script = manager.render_for(&plan(Framework::K6, TestType::TelegramWebhook)?)?;
    if !script.contains("Hello from load test!") || !script.contains("vus: 20") {
        return Err(AppError::validation("Expected telegram k6 script"));
    }
    let fallback = manager.render_for(&plan(Framework::K6, TestType::Websocket)?)?;
    if !fallback.contains("executor: 'constant-vus'") {
        return Err(AppError::validation("Expected default k6 script"));
    }
    Ok(())
}

#[test]
fn override_directory_takes_precedence() -> AppResult<()> {
    let dir = tempdir()?;
    let k6_dir = dir.path().join("templates").join("k6");
    std::fs::create_dir_all(&k6_dir)?;
    std::fs::write(k6_dir.join("web_site.js"), "// custom ${USERS}\n")?;
    std::fs::write(k6_dir.join("extra.js"), "// extra\n")?;

    let manager = TemplateManager::for_config_dir(&dir.path().join("configs"));
    let script = manager.render_for(&plan(Framework::K6, TestType::WebSite)?)?;
    if script != "// custom 20\n" {
        return Err(AppError::validation(format!("Unexpected override: {script}")));
    }
    let names = manager.list(Framework::K6);
    if !names.contains(&"extra.js".to_owned()) || !names.contains(&"default.js".to_owned()) {
        return Err(AppError::validation("Expected merged template listing"));
    }
    Ok(())
}

#[test]
fn unknown_template_is_an_error() -> AppResult<()> {
    if TemplateManager::default()
        .load(Framework::Artillery, "missing.yml")
        .is_ok()
    {
        return Err(AppError::validation("Expected missing template"));
    }
    Ok(())
}
