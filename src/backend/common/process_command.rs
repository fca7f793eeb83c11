use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::constants::COMMAND_TIMEOUT_POLL_INTERVAL;
use super::dtos::CommandResult;

fn spawn_pipe_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    }))
}

fn join_pipe_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
        .unwrap_or_default()
}

/// Runs `command` to completion, killing it once `timeout` elapses.
///
/// Pipes are drained on background threads so a chatty child cannot block
/// on a full pipe while we poll for its exit.
pub(crate) fn run_command_with_timeout(
    mut command: Command,
    timeout: Duration,
    spawn_error_context: String,
    timeout_context: String,
) -> CommandResult {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(error) => {
            return CommandResult {
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                error: Some(format!("{spawn_error_context}: {error}")),
            };
        }
    };

    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return CommandResult {
                    exit_code: status.code(),
                    stdout: join_pipe_reader(stdout_reader),
                    stderr: join_pipe_reader(stderr_reader),
                    error: None,
                };
            }
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let reaped = child.wait();
                    let stdout = join_pipe_reader(stdout_reader);
                    let stderr = join_pipe_reader(stderr_reader);
                    let error = match reaped {
                        Ok(_) => format!(
                            "Command {timeout_context} timed out after {timeout:?} and was terminated."
                        ),
                        Err(error) => format!(
                            "Command {timeout_context} timed out after {timeout:?} and could not be reaped: {error}"
                        ),
                    };
                    return CommandResult {
                        exit_code: None,
                        stdout,
                        stderr,
                        error: Some(error),
                    };
                }

                thread::sleep(COMMAND_TIMEOUT_POLL_INTERVAL);
            }
            Err(error) => {
                let _ = child.kill();
                let _ = child.wait();
                return CommandResult {
                    exit_code: None,
                    stdout: join_pipe_reader(stdout_reader),
                    stderr: join_pipe_reader(stderr_reader),
                    error: Some(format!(
                        "Failed while waiting for {timeout_context}: {error}"
                    )),
                };
            }
        }
    }
}

pub(crate) fn first_non_empty_line(value: &str) -> Option<String> {
    value
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
}

/// First meaningful output line, stderr first, truncated to 160 chars.
pub(crate) fn command_output_snippet(result: &CommandResult) -> Option<String> {
    first_non_empty_line(&result.stderr)
        .or_else(|| first_non_empty_line(&result.stdout))
        .map(|line| {
            let prefix = line.chars().take(160).collect::<String>();
            if prefix.len() < line.len() {
                format!("{prefix}...")
            } else {
                line
            }
        })
}
