use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawns a tiny HTTP server answering `200 OK` to everything.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 4096];
    if stream.read(&mut buffer).is_err() {
        return;
    }
    if stream
        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK")
        .is_err()
    {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn chakload_command(config_dir: &Path) -> Result<Command, String> {
    let bin = option_env!("CARGO_BIN_EXE_chakload")
        .ok_or_else(|| "CARGO_BIN_EXE_chakload missing at compile time.".to_owned())?;
    let mut command = Command::new(bin);
    command
        .arg("--config-dir")
        .arg(config_dir)
        .arg("--no-color")
        .arg("--no-ui")
        .env("CHAKLOAD_LOG", "error")
        .env_remove("CHAKLOAD_THEME")
        .env_remove("CHAKLOAD_OUTPUT_DIR");
    Ok(command)
}

/// Runs the `chakload` binary with `args` and captures its output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_chakload<I, S>(config_dir: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    chakload_command(config_dir)?
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| format!("run chakload failed: {}", err))
}

/// Starts the interactive shell, feeds `input` on stdin and waits for exit.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed or fed.
pub fn run_shell(config_dir: &Path, input: &str) -> Result<Output, String> {
    let mut child = chakload_command(config_dir)?
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("spawn chakload failed: {}", err))?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| "chakload stdin missing".to_owned())?;
    stdin
        .write_all(input.as_bytes())
        .map_err(|err| format!("write stdin failed: {}", err))?;
    drop(stdin);
    child
        .wait_with_output()
        .map_err(|err| format!("wait for chakload failed: {}", err))
}

#[must_use]
pub fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
