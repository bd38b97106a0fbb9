use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::json;
use tokio::time::{Instant, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::args::TestType;
use crate::config::TestPlan;
use crate::error::{AppError, AppResult, RunnerError};
use crate::metrics::Sample;
use crate::templates::{DEFAULT_GRAPHQL_QUERY, DEFAULT_REQUEST_BODY, DEFAULT_TEST_MESSAGE};

pub(super) const GRAPHQL_ERROR: &str = "graphql_error";
const WEBSOCKET_TIMEOUT: Duration = Duration::from_secs(10);
const WEBSOCKET_DEFAULT_MESSAGE: &str = "ping";
const TELEGRAM_ID_RANGE: std::ops::RangeInclusive<u64> = 100_000..=999_999;

#[derive(Debug, Clone)]
pub(super) enum Body {
    Empty,
    Json(String),
    TelegramUpdate { text: String },
}

/// What one worker iteration sends, resolved once per run.
#[derive(Debug, Clone)]
pub(super) enum RequestSpec {
    Http {
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Body,
        graphql: bool,
    },
    Websocket {
        url: Url,
        message: String,
    },
}

impl RequestSpec {
    /// Plain `GET` used by the simple runner.
    pub(super) fn simple(plan: &TestPlan) -> AppResult<Self> {
        Ok(Self::Http {
            method: Method::GET,
            url: plan.url.clone(),
            headers: header_map(plan)?,
            body: Body::Empty,
            graphql: false,
        })
    }

    /// Request shaped by the plan's test type.
    pub(super) fn for_plan(plan: &TestPlan) -> AppResult<Self> {
        let headers = header_map(plan)?;
        let spec = match plan.test_type {
            TestType::WebSite => Self::Http {
                method: Method::GET,
                url: plan.url.clone(),
                headers,
                body: Body::Empty,
                graphql: false,
            },
            TestType::ApiEndpoint => {
                let body = if plan.method.has_body() {
                    Body::Json(
                        plan.payload
                            .clone()
                            .unwrap_or_else(|| DEFAULT_REQUEST_BODY.to_owned()),
                    )
                } else {
                    Body::Empty
                };
                Self::Http {
                    method: plan.method.to_reqwest(),
                    url: plan.url.clone(),
                    headers,
                    body,
                    graphql: false,
                }
            }
            TestType::TelegramWebhook => Self::Http {
                method: Method::POST,
                url: plan.url.clone(),
                headers,
                body: Body::TelegramUpdate {
                    text: plan
                        .param("message")
                        .unwrap_or(DEFAULT_TEST_MESSAGE)
                        .to_owned(),
                },
                graphql: false,
            },
            TestType::GraphqlEndpoint => {
                let query = plan.param("query").unwrap_or(DEFAULT_GRAPHQL_QUERY);
                Self::Http {
                    method: Method::POST,
                    url: plan.url.clone(),
                    headers,
                    body: Body::Json(json!({ "query": query }).to_string()),
                    graphql: true,
                }
            }
            TestType::Websocket => Self::Websocket {
                url: plan.url.clone(),
                message: plan
                    .payload
                    .clone()
                    .unwrap_or_else(|| WEBSOCKET_DEFAULT_MESSAGE.to_owned()),
            },
        };
        Ok(spec)
    }

    /// Performs one request and reports it relative to `run_start`.
    pub(super) async fn execute(&self, client: &Client, run_start: Instant) -> Sample {
        match self {
            Self::Http {
                method,
                url,
                headers,
                body,
                graphql,
            } => {
                let payload = render_body(body);
                execute_http(client, method.clone(), url, headers, payload, *graphql, run_start)
                    .await
            }
            Self::Websocket { url, message } => execute_websocket(url, message, run_start).await,
        }
    }
}

fn header_map(plan: &TestPlan) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in plan.headers() {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            AppError::runner(RunnerError::InvalidHeader {
                name: name.to_owned(),
                message: err.to_string(),
            })
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            AppError::runner(RunnerError::InvalidHeader {
                name: name.to_owned(),
                message: err.to_string(),
            })
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn render_body(body: &Body) -> Option<String> {
    match body {
        Body::Empty => None,
        Body::Json(text) => Some(text.clone()),
        Body::TelegramUpdate { text } => Some(telegram_update(text).to_string()),
    }
}

/// Random Telegram `Update` carrying a private text message.
pub(super) fn telegram_update(text: &str) -> serde_json::Value {
    let mut rng = rand::thread_rng();
    let user_id = rng.gen_range(TELEGRAM_ID_RANGE);
    let chat_id = rng.gen_range(TELEGRAM_ID_RANGE);
    json!({
        "update_id": rng.gen_range(1..=i32::MAX),
        "message": {
            "message_id": rng.gen_range(1..=1_000_000),
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Load",
                "last_name": "Test",
                "username": format!("load_test_{user_id}"),
            },
            "chat": {
                "id": chat_id,
                "type": "private",
                "first_name": "Load",
            },
            "date": chrono::Utc::now().timestamp(),
            "text": text,
        }
    })
}

async fn execute_http(
    client: &Client,
    method: Method,
    url: &Url,
    headers: &HeaderMap,
    payload: Option<String>,
    graphql: bool,
    run_start: Instant,
) -> Sample {
    let bytes_sent = payload
        .as_ref()
        .map_or(0, |text| u64::try_from(text.len()).unwrap_or(u64::MAX));
    let mut request = client.request(method, url.clone()).headers(headers.clone());
    if let Some(payload) = payload {
        request = request.header(CONTENT_TYPE, "application/json").body(payload);
    }

    let started = Instant::now();
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!("Request failed: {}", err);
            return Sample {
                offset: run_start.elapsed(),
                latency: Duration::ZERO,
                status: None,
                error: Some(reqwest_error_kind(&err).to_owned()),
                bytes_sent,
                bytes_received: 0,
            };
        }
    };

    let status = response.status().as_u16();
    let (bytes_received, error) = if graphql {
        match response.bytes().await {
            Ok(body) => {
                let received = u64::try_from(body.len()).unwrap_or(u64::MAX);
                let failed = status == 200 && has_graphql_errors(&body);
                (received, failed.then(|| GRAPHQL_ERROR.to_owned()))
            }
            Err(err) => (0, Some(reqwest_error_kind(&err).to_owned())),
        }
    } else {
        match drain_response_body(response).await {
            Ok(received) => (received, None),
            Err(err) => (0, Some(reqwest_error_kind(&err).to_owned())),
        }
    };

    Sample {
        offset: run_start.elapsed(),
        latency: started.elapsed(),
        status: Some(status),
        error,
        bytes_sent,
        bytes_received,
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

/// True when the body is JSON with a non-empty `errors` array.
pub(super) fn has_graphql_errors(body: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("errors").and_then(|errors| errors.as_array().map(Vec::len)))
        .is_some_and(|count| count > 0)
}

fn reqwest_error_kind(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection_error"
    } else if err.is_body() || err.is_decode() {
        "body_error"
    } else {
        "request_error"
    }
}

async fn execute_websocket(url: &Url, message: &str, run_start: Instant) -> Sample {
    let started = Instant::now();
    let bytes_sent = u64::try_from(message.len()).unwrap_or(u64::MAX);
    let failed = |kind: &str| Sample {
        offset: run_start.elapsed(),
        latency: Duration::ZERO,
        status: None,
        error: Some(kind.to_owned()),
        bytes_sent: 0,
        bytes_received: 0,
    };

    let (mut stream, response) = match timeout(WEBSOCKET_TIMEOUT, connect_async(url.as_str())).await
    {
        Ok(Ok(values)) => values,
        Ok(Err(err)) => {
            tracing::debug!("WebSocket connect failed: {}", err);
            return failed("ws_connect_error");
        }
        Err(_) => return failed("timeout"),
    };
    let status = response.status().as_u16();

    match timeout(WEBSOCKET_TIMEOUT, stream.send(Message::Text(message.to_owned()))).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => return failed("ws_send_error"),
        Err(_) => return failed("timeout"),
    }

    let bytes_received = match timeout(WEBSOCKET_TIMEOUT, stream.next()).await {
        Ok(Some(Ok(reply))) => message_bytes(&reply),
        Ok(Some(Err(_)) | None) => return failed("ws_receive_error"),
        Err(_) => return failed("timeout"),
    };
    let latency = started.elapsed();
    drop(stream.close(None).await);

    Sample {
        offset: run_start.elapsed(),
        latency,
        status: Some(status),
        error: None,
        bytes_sent,
        bytes_received,
    }
}

fn message_bytes(message: &Message) -> u64 {
    let len = match message {
        Message::Text(value) => value.len(),
        Message::Binary(value) | Message::Ping(value) | Message::Pong(value) => value.len(),
        Message::Close(_) | Message::Frame(_) => 0,
    };
    u64::try_from(len).unwrap_or(u64::MAX)
}
