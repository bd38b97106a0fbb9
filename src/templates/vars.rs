use std::collections::BTreeMap;
use crate::args::Framework;
use crate::config::TestPlan;

pub(crate) const DEFAULT_TEST_MESSAGE: &str = "Hello from load test!";
pub(crate) const DEFAULT_GRAPHQL_QUERY: &str = "{ __typename }";
pub(crate) const DEFAULT_REQUEST_BODY: &str = "{}";

const WEIGHT_HOME: &str = "3";
const WEIGHT_API: &str = "1";
const GET_WEIGHT: &str = "3";
const POST_WEIGHT: &str = "1";

/// Variables available to templates. String values are escaped for the
/// framework's script language; custom params are added last (upper-cased)
/// and win over built-ins.
#[must_use]
pub fn context_vars(plan: &TestPlan) -> BTreeMap<String, String> {
    let escape = escaper(plan.framework);
    let url = plan.url.as_str();
    let mut endpoint = plan.url.path().to_owned();
    if let Some(query) = plan.url.query() {
        endpoint.push('?');
        endpoint.push_str(query);
    }
    let host = plan.url.host_str().unwrap_or_default();
    let port = plan
        .url
        .port_or_known_default()
        .map(|port| port.to_string())
        .unwrap_or_default();
    let base_url = match plan.url.port() {
        Some(port) => format!("{}://{}:{}", plan.url.scheme(), host, port),
        None => format!("{}://{}", plan.url.scheme(), host),
    };

    let mut vars = BTreeMap::new();
    let mut set = |key: &str, value: &str| {
        vars.insert(key.to_owned(), escape(value));
    };
    set("TARGET_URL", url);
    set("WEBHOOK_URL", url);
    set("BASE_URL", &base_url);
    set("USERS", &plan.users.to_string());
    set("DURATION", &plan.duration.as_secs().to_string());
    set("RAMPUP", &plan.rampup.as_secs().to_string());
    set("METHOD", plan.method.as_str());
    set(
        "ARTILLERY_METHOD",
        &plan.method.as_str().to_ascii_lowercase(),
    );
    set(
        "REQUEST_BODY",
        plan.payload.as_deref().unwrap_or(DEFAULT_REQUEST_BODY),
    );
    set(
        "TEST_MESSAGE",
        plan.param("message").unwrap_or(DEFAULT_TEST_MESSAGE),
    );
    set(
        "GRAPHQL_QUERY",
        plan.param("query").unwrap_or(DEFAULT_GRAPHQL_QUERY),
    );
    set("ENDPOINT_PATH", &endpoint);
    set("WEIGHT_HOME", WEIGHT_HOME);
    set("WEIGHT_API", WEIGHT_API);
    set("GET_WEIGHT", GET_WEIGHT);
    set("POST_WEIGHT", POST_WEIGHT);
    set("HOST", host);
    set("PORT", &port);
    set("PROTOCOL", plan.url.scheme());
    set("PATH", plan.url.path());
    for (key, value) in &plan.custom_params {
        set(&param_var_name(key), value);
    }
    vars
}

/// `header.X-Token` becomes `HEADER_X_TOKEN`.
pub(crate) fn param_var_name(key: &str) -> String {
    key.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn escaper(framework: Framework) -> fn(&str) -> String {
    match framework {
        Framework::JMeter => escape_xml,
        Framework::Simple
        | Framework::Advanced
        | Framework::Locust
        | Framework::K6
        | Framework::Artillery => escape_quoted,
    }
}

/// Escapes for a double-quoted literal in JavaScript, Python or YAML.
fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => push_unicode_escape(&mut out, ch),
            ch => out.push(ch),
        }
    }
    out
}

fn push_unicode_escape(out: &mut String, ch: char) {
    let code = u32::from(ch);
    out.push_str("\\u");
    for shift in [12_u32, 8, 4, 0] {
        let nibble = (code >> shift) & 0xf;
        out.push(char::from_digit(nibble, 16).unwrap_or('0'));
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            ch => out.push(ch),
        }
    }
    out
}
