use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;

use super::requests::{Body, GRAPHQL_ERROR, RequestSpec, has_graphql_errors, telegram_update};
use super::worker::{ramp_delay, think_time};
use super::*;
use crate::config::TestSettings;
use crate::error::{AppError, AppResult};
use crate::metrics::BYTES_PER_MB;
use crate::shutdown_handlers::shutdown_channel;

/// Reads one request and returns its header block.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(String::from_utf8_lossy(&buffer).into_owned());
        }
        buffer.extend_from_slice(chunk.get(..read).unwrap_or_default());
        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text
                .get(..header_end)
                .unwrap_or_default()
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                return Ok(text.get(..header_end).unwrap_or_default().to_owned());
            }
        }
    }
}

/// Answers every request with `body` and closes the connection.
async fn spawn_server(status_line: &'static str, body: &'static str) -> AppResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| AppError::validation(err.to_string()))?;
    let addr = listener
        .local_addr()
        .map_err(|err| AppError::validation(err.to_string()))?;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                if read_request(&mut stream).await.is_err() {
                    return;
                }
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                drop(stream.write_all(response.as_bytes()).await);
                drop(stream.shutdown().await);
            });
        }
    });
    Ok(addr)
}

/// Answers 200 when the request carries `name: value`, 400 otherwise.
async fn spawn_header_server(name: &'static str, value: &'static str) -> AppResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| AppError::validation(err.to_string()))?;
    let addr = listener
        .local_addr()
        .map_err(|err| AppError::validation(err.to_string()))?;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(head) = read_request(&mut stream).await else {
                    return;
                };
                let found = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .any(|(key, sent)| key.trim().eq_ignore_ascii_case(name) && sent.trim() == value);
                let status_line = if found { "200 OK" } else { "400 Bad Request" };
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                drop(stream.write_all(response.as_bytes()).await);
                drop(stream.shutdown().await);
            });
        }
    });
    Ok(addr)
}

/// WebSocket server that echoes the first message of every connection.
async fn spawn_echo_server() -> AppResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| AppError::validation(format!("Failed to bind websocket server: {err}")))?;
    let addr = listener
        .local_addr()
        .map_err(|err| AppError::validation(format!("Failed to read websocket server addr: {err}")))?;
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                if let Some(Ok(incoming)) = ws.next().await
                    && (incoming.is_text() || incoming.is_binary())
                {
                    drop(ws.send(incoming).await);
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });
    Ok(addr)
}

fn plan(framework: Framework, test_type: TestType, url: &str, duration: u64) -> AppResult<TestPlan> {
    TestSettings {
        framework: Some(framework),
        test_type,
        target_url: Some(url.to_owned()),
        users: 4,
        duration,
        rampup: 0,
        ..TestSettings::default()
    }
    .to_plan()
}

fn context() -> RunContext {
    let (shutdown_tx, _) = shutdown_channel();
    RunContext {
        shutdown_tx,
        live_tx: None,
    }
}

#[test]
fn ramp_delay_spreads_workers() -> AppResult<()> {
    let rampup = Duration::from_secs(10);
    if ramp_delay(rampup, 0, 4) != Duration::ZERO
        || ramp_delay(rampup, 1, 4) != Duration::from_millis(2500)
        || ramp_delay(rampup, 3, 4) != Duration::from_millis(7500)
    {
        return Err(AppError::validation("Unexpected ramp delays"));
    }
    if ramp_delay(Duration::ZERO, 3, 4) != Duration::ZERO {
        return Err(AppError::validation("Zero ramp-up should start everyone"));
    }
    Ok(())
}

#[test]
fn think_time_depends_on_test_type() -> AppResult<()> {
    if think_time(false, 1000) != Duration::from_millis(100) {
        return Err(AppError::validation("Expected 100ms default think time"));
    }
    if think_time(true, 4) != Duration::from_millis(250) {
        return Err(AppError::validation("Expected 1s / users for telegram"));
    }
    if think_time(true, 1000) != Duration::from_millis(10) {
        return Err(AppError::validation("Expected 10ms telegram floor"));
    }
    Ok(())
}

#[test]
fn graphql_errors_are_detected() -> AppResult<()> {
    if !has_graphql_errors(br#"{"errors":[{"message":"boom"}]}"#) {
        return Err(AppError::validation("Expected errors array to be detected"));
    }
    if has_graphql_errors(br#"{"data":{},"errors":[]}"#) || has_graphql_errors(b"not json") {
        return Err(AppError::validation("Empty errors or invalid JSON are not failures"));
    }
    Ok(())
}

#[test]
fn telegram_update_has_expected_shape() -> AppResult<()> {
    let update = telegram_update("hi");
    let message = update
        .get("message")
        .ok_or_else(|| AppError::validation("Missing message"))?;
    if message.get("text").and_then(serde_json::Value::as_str) != Some("hi") {
        return Err(AppError::validation("Unexpected text"));
    }
    for path in ["from", "chat"] {
        let id = message
            .get(path)
            .and_then(|value| value.get("id"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if !(100_000..=999_999).contains(&id) {
            return Err(AppError::validation("Id outside 100000..=999999"));
        }
    }
    if update.get("update_id").and_then(serde_json::Value::as_i64).is_none() {
        return Err(AppError::validation("Missing update_id"));
    }
    Ok(())
}

#[test]
fn api_endpoint_posts_default_body() -> AppResult<()> {
    let mut plan = plan(Framework::Advanced, TestType::ApiEndpoint, "http://localhost/api", 1)?;
    plan.method = crate::args::HttpMethod::Post;
    let spec = RequestSpec::for_plan(&plan)?;
    let RequestSpec::Http { method, body, .. } = spec else {
        return Err(AppError::validation("Expected an HTTP request"));
    };
    if method != reqwest::Method::POST {
        return Err(AppError::validation("Expected POST"));
    }
    match body {
        Body::Json(text) if text == "{}" => Ok(()),
        Body::Json(_) | Body::Empty | Body::TelegramUpdate { .. } => {
            Err(AppError::validation("Expected {} body"))
        }
    }
}

#[tokio::test]
async fn simple_runner_rejects_websocket() -> AppResult<()> {
    let plan = plan(Framework::Simple, TestType::Websocket, "ws://localhost/socket", 1)?;
    match BuiltinRunner::simple().prepare(&plan).await {
        Err(err) if err.to_string().contains("use the advanced runner") => Ok(()),
        Err(_) | Ok(_) => Err(AppError::validation("Expected websocket rejection")),
    }
}

#[tokio::test]
async fn invalid_header_param_is_rejected() -> AppResult<()> {
    let mut plan = plan(Framework::Advanced, TestType::WebSite, "http://localhost/", 1)?;
    plan.custom_params
        .insert("header.Bad Name".to_owned(), "x".to_owned());
    match BuiltinRunner::advanced().prepare(&plan).await {
        Err(err) if err.to_string().contains("Invalid header 'Bad Name'") => Ok(()),
        Err(_) | Ok(_) => Err(AppError::validation("Expected invalid header error")),
    }
}

#[tokio::test]
async fn simple_runner_counts_successes() -> AppResult<()> {
    let addr = spawn_server("200 OK", "ok").await?;
    let url = format!("http://{addr}/");
    let plan = plan(Framework::Simple, TestType::WebSite, &url, 1)?;
    let runner = BuiltinRunner::simple();
    let prepared = runner.prepare(&plan).await?;
    let results = runner.execute(&prepared, &plan, context()).await?;
    if results.total_requests == 0 {
        return Err(AppError::validation("Expected requests to be sent"));
    }
    if results.successful_requests != results.total_requests || !results.errors.is_empty() {
        return Err(AppError::validation(format!(
            "Expected only successes, got {:?}",
            results.errors
        )));
    }
    if results.data_received_mb <= 0.0 || results.timeline.is_empty() {
        return Err(AppError::validation("Expected bytes and timeline"));
    }
    Ok(())
}

#[tokio::test]
async fn graphql_error_bodies_count_as_failures() -> AppResult<()> {
    let addr = spawn_server("200 OK", r#"{"errors":[{"message":"nope"}]}"#).await?;
    let url = format!("http://{addr}/graphql");
    let plan = plan(Framework::Advanced, TestType::GraphqlEndpoint, &url, 1)?;
    let runner = BuiltinRunner::advanced();
    let prepared = runner.prepare(&plan).await?;
    let results = runner.execute(&prepared, &plan, context()).await?;
    let errors = results.errors.get(GRAPHQL_ERROR).copied().unwrap_or(0);
    if results.total_requests == 0 || errors != results.total_requests {
        return Err(AppError::validation(format!(
            "Expected every request to be a graphql_error: {:?}",
            results.errors
        )));
    }
    if results.successful_requests != 0 {
        return Err(AppError::validation("No request should succeed"));
    }
    Ok(())
}

#[tokio::test]
async fn http_error_status_is_recorded_by_code() -> AppResult<()> {
    let addr = spawn_server("503 Service Unavailable", "down").await?;
    let url = format!("http://{addr}/");
    let plan = plan(Framework::Simple, TestType::WebSite, &url, 1)?;
    let runner = BuiltinRunner::simple();
    let prepared = runner.prepare(&plan).await?;
    let results = runner.execute(&prepared, &plan, context()).await?;
    if results.failed_requests == 0 || results.errors.get("503") != Some(&results.failed_requests) {
        return Err(AppError::validation("Expected 503 failures"));
    }
    Ok(())
}

#[tokio::test]
async fn shutdown_ends_the_run_early() -> AppResult<()> {
    let addr = spawn_server("200 OK", "ok").await?;
    let url = format!("http://{addr}/");
    let plan = plan(Framework::Advanced, TestType::WebSite, &url, 30)?;
    let runner = BuiltinRunner::advanced();
    let prepared = runner.prepare(&plan).await?;
    let run_context = context();
    let shutdown_tx = run_context.shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        drop(shutdown_tx.send(()));
    });
    let started = std::time::Instant::now();
    let results = runner.execute(&prepared, &plan, run_context).await?;
    if started.elapsed() > Duration::from_secs(10) {
        return Err(AppError::validation("Run ignored shutdown"));
    }
    if results.duration >= 30.0 {
        return Err(AppError::validation("Duration should reflect the early stop"));
    }
    Ok(())
}

#[tokio::test]
async fn advanced_runner_sends_header_params() -> AppResult<()> {
    let addr = spawn_header_server("x-load-tag", "chakload").await?;
    let url = format!("http://{addr}/");
    let mut tagged = plan(Framework::Advanced, TestType::WebSite, &url, 1)?;
    tagged
        .custom_params
        .insert("header.X-Load-Tag".to_owned(), "chakload".to_owned());
    let runner = BuiltinRunner::advanced();
    let prepared = runner.prepare(&tagged).await?;
    let with_header = runner.execute(&prepared, &tagged, context()).await?;
    if with_header.total_requests == 0
        || with_header.successful_requests != with_header.total_requests
    {
        return Err(AppError::validation(format!(
            "Expected the header on every request: {:?}",
            with_header.errors
        )));
    }

    let untagged = plan(Framework::Advanced, TestType::WebSite, &url, 1)?;
    let bare = runner.prepare(&untagged).await?;
    let without_header = runner.execute(&bare, &untagged, context()).await?;
    if without_header.total_requests == 0
        || without_header.errors.get("400") != Some(&without_header.total_requests)
    {
        return Err(AppError::validation("Expected 400s without the header"));
    }
    Ok(())
}

#[tokio::test]
async fn websocket_exchange_reports_handshake_status_and_bytes() -> AppResult<()> {
    let addr = spawn_echo_server().await?;
    let mut socket_plan = plan(
        Framework::Advanced,
        TestType::Websocket,
        &format!("http://{addr}/socket"),
        1,
    )?;
    socket_plan.payload = Some("hello-ws".to_owned());
    let spec = RequestSpec::for_plan(&socket_plan)?;
    let sample = spec
        .execute(&reqwest::Client::new(), tokio::time::Instant::now())
        .await;
    if sample.status != Some(101) || sample.error.is_some() {
        return Err(AppError::validation(format!("Unexpected sample: {sample:?}")));
    }
    if sample.bytes_sent != 8 || sample.bytes_received != 8 || sample.latency.is_zero() {
        return Err(AppError::validation(format!("Unexpected sample sizes: {sample:?}")));
    }
    Ok(())
}

#[tokio::test]
async fn advanced_runner_drives_websocket_echo() -> AppResult<()> {
    let addr = spawn_echo_server().await?;
    let mut socket_plan = plan(
        Framework::Advanced,
        TestType::Websocket,
        &format!("http://{addr}/socket"),
        1,
    )?;
    socket_plan.payload = Some("hello-ws".to_owned());
    let runner = BuiltinRunner::advanced();
    let prepared = runner.prepare(&socket_plan).await?;
    let results = runner.execute(&prepared, &socket_plan, context()).await?;
    if results.total_requests == 0
        || results.successful_requests != results.total_requests
        || !results.errors.is_empty()
    {
        return Err(AppError::validation(format!(
            "Expected only successful exchanges: {:?}",
            results.errors
        )));
    }
    let expected_mb = (results.total_requests * 8) as f64 / BYTES_PER_MB;
    if (results.data_sent_mb - expected_mb).abs() > 1e-9
        || (results.data_received_mb - expected_mb).abs() > 1e-9
    {
        return Err(AppError::validation(format!(
            "Unexpected websocket bytes: sent {} received {}",
            results.data_sent_mb, results.data_received_mb
        )));
    }
    Ok(())
}
