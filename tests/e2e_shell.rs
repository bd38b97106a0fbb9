mod support;

use tempfile::tempdir;

use support::{describe, run_shell, spawn_http_server};

#[test]
fn e2e_shell_runs_a_test_from_piped_commands() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let input = format!(
        "/framework simple\n/url {url}\n/users 2\n/duration 1\n/run\n/results history\n/config save smoke\n/exit\n"
    );

    let output = run_shell(dir.path(), &input)?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    for expected in [
        "Framework set to Simple HTTP",
        "Final Test Results",
        "Run History",
        "Configuration saved as 'smoke'",
        "Exiting chakload...",
    ] {
        if !stdout.contains(expected) {
            return Err(format!("missing '{}'\n{}", expected, describe(&output)));
        }
    }
    if !dir.path().join("smoke.toml").is_file() {
        return Err("preset file was not written".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_shell_survives_errors_and_exits_on_eof() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let output = run_shell(dir.path(), "/users zero\nbogus\n/export json\n")?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    for expected in [
        "Invalid number 'zero'",
        "Unknown command: bogus. Type /help for available commands.",
        "No results to export. Run a test first with /run.",
        "Exiting chakload...",
    ] {
        if !stdout.contains(expected) {
            return Err(format!("missing '{}'\n{}", expected, describe(&output)));
        }
    }
    Ok(())
}

#[test]
fn e2e_shell_loads_default_preset() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    std::fs::write(
        dir.path().join("default.toml"),
        "url = \"https://example.com\"\nconcurrent_users = 12\n",
    )
    .map_err(|err| format!("write preset failed: {}", err))?;
    let output = run_shell(dir.path(), "/config show\nquit\n")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() || !stdout.contains("https://example.com") || !stdout.contains("12")
    {
        return Err(describe(&output));
    }
    Ok(())
}
