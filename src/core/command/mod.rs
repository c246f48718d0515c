#![allow(clippy::result_large_err)] // Runner returns AppError so launch and timeout diagnostics reach the step report intact.

use crate::core::credentials::redact_url;
use crate::core::error::AppError;
use async_trait::async_trait;
use gitship_types::CommandResult;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const OUTPUT_CAPTURE_LIMIT_BYTES: usize = 1_048_576;

/// One external invocation.
///
/// The default form is an argument vector with no shell in between, so
/// usernames, emails and tokens are never re-parsed. `shell` exists for
/// callers that genuinely hold a command line.
#[derive(Clone, Debug)]
pub struct CommandRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<String>,
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub shell: bool,
}

impl CommandRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
            env: Vec::new(),
            timeout: None,
            shell: false,
        }
    }

    /// A command line interpreted by the platform shell.
    pub fn shell(command_line: impl Into<String>) -> Self {
        let mut request = Self::new(command_line);
        request.shell = true;
        request
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Command line for logs and step details, with credentials masked.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(redact_url)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Executes external commands.
///
/// Implementations never fail because of a non-zero exit; that is reported
/// through `CommandResult::succeeded`. `Err` means the command could not be
/// started, or it ran past its timeout.
#[async_trait]
pub trait CommandRunner: Send + Sync + 'static {
    async fn run(&self, request: &CommandRequest) -> Result<CommandResult, AppError>;
}

/// Production runner backed by `tokio::process`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandResult, AppError> {
        let mut command = build_command(request);
        let command_line = request.display();

        tracing::debug!(
            cmd = %command_line,
            cwd = %request
                .cwd
                .as_ref()
                .map(|cwd| cwd.display().to_string())
                .unwrap_or_else(|| ".".to_string()),
            timeout = ?request.timeout,
            "executing command"
        );

        let start = Instant::now();
        let mut child = command
            .spawn()
            .map_err(|err| AppError::launch_failure(&launch_name(request), err))?;

        // Input is fed concurrently so a child that writes while reading
        // cannot stall on a full stdout pipe.
        let feeder = match (&request.stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.clone().into_bytes();
                let command_line = command_line.clone();
                Some(tokio::spawn(async move {
                    // A child that exits without reading its input is not a launch failure.
                    if let Err(err) = pipe.write_all(&input).await {
                        tracing::debug!(cmd = %command_line, error = %err, "stdin closed early");
                    }
                }))
            }
            _ => None,
        };

        let waiting = child.wait_with_output();
        let output = match request.timeout {
            Some(limit) => match tokio::time::timeout(limit, waiting).await {
                Ok(result) => result,
                Err(_) => {
                    if let Some(feeder) = feeder {
                        feeder.abort();
                    }
                    tracing::warn!(cmd = %command_line, "command timed out");
                    return Err(AppError::timeout(&command_line, limit));
                }
            },
            None => waiting.await,
        }
        .map_err(|err| AppError::launch_failure(&launch_name(request), err))?;

        let (stdout, stdout_lossy) = decode_output(&output.stdout);
        let (stderr, stderr_lossy) = decode_output(&output.stderr);

        tracing::debug!(
            cmd = %command_line,
            exit_code = output.status.code().unwrap_or(-1),
            duration_ms = start.elapsed().as_millis() as u64,
            "command finished"
        );

        Ok(CommandResult {
            succeeded: output.status.success(),
            exit_code: output.status.code(),
            stdout,
            stderr,
            decoding_lossy: stdout_lossy || stderr_lossy,
        })
    }
}

fn build_command(request: &CommandRequest) -> Command {
    let mut command = if request.shell {
        shell_command(&request.program)
    } else {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        cmd
    };

    if let Some(cwd) = &request.cwd {
        command.current_dir(cwd);
    }
    command.envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    command.stdin(if request.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    // Only reached when the timeout future is dropped.
    command.kill_on_drop(true);
    command
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

fn launch_name(request: &CommandRequest) -> String {
    if request.shell {
        if cfg!(windows) { "cmd" } else { "sh" }.to_string()
    } else {
        request.program.clone()
    }
}

/// Best-effort decode: invalid UTF-8 is replaced, never an error.
fn decode_output(bytes: &[u8]) -> (String, bool) {
    let limit = OUTPUT_CAPTURE_LIMIT_BYTES.min(bytes.len());
    match std::str::from_utf8(&bytes[..limit]) {
        Ok(text) => (text.to_string(), false),
        Err(err) if limit < bytes.len() && err.error_len().is_none() => {
            // Cut landed inside a multi-byte character.
            let valid = err.valid_up_to();
            (String::from_utf8_lossy(&bytes[..valid]).into_owned(), false)
        }
        Err(_) => (String::from_utf8_lossy(&bytes[..limit]).into_owned(), true),
    }
}
