//! External converter execution.
//!
//! Runs conversion tools as child processes from an explicit argument
//! vector (never through a shell), captures their output, and maps exit
//! status, spawn failures and timeouts into [`ExecutorError`].

use std::ffi::{OsStr, OsString};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;

/// Characters of stderr kept in logs.
const LOG_STDERR_CHARS: usize = 500;
/// Characters of stderr/stdout kept in errors.
const MAX_CAPTURE_CHARS: usize = 2000;

/// Errors from running an external tool.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The program could not be started (missing binary, permissions).
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// Program that was being started.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish in time and was killed.
    #[error("'{program}' timed out after {seconds} seconds")]
    Timeout {
        /// Program that timed out.
        program: String,
        /// The timeout that was exceeded.
        seconds: u64,
    },

    /// The process exited with a non-zero code or was killed by a signal.
    #[error("'{program}' failed with exit code {code}: {stderr}")]
    ProcessFailed {
        /// Program that failed.
        program: String,
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Program name (resolved through `PATH`) or path.
    pub program: OsString,
    /// Arguments, passed verbatim.
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    /// Start building an invocation of `program`.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Program name for logs and error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Human-readable rendering of the command line, for logs and
    /// diagnostics only. Never executed.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| {
                let s = part.to_string_lossy();
                if s.contains(char::is_whitespace) {
                    format!("\"{s}\"")
                } else {
                    s.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output of a successful tool run.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Exit code (always `0` for a successful run on Unix).
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Wall-clock duration.
    pub duration: Duration,
}

/// Executor for running external conversion commands.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    /// Default per-invocation timeout; `None` waits indefinitely.
    timeout: Option<Duration>,
}

impl ToolExecutor {
    /// Create an executor with an optional default timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run an invocation with the executor's default timeout.
    pub async fn run(
        &self,
        invocation: &ToolInvocation,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        self.run_with_timeout(invocation, self.timeout).await
    }

    /// Run an invocation with an explicit timeout.
    ///
    /// The child is spawned with `kill_on_drop`, so dropping the returned
    /// future (timeout, client disconnect) also kills the process.
    pub async fn run_with_timeout(
        &self,
        invocation: &ToolInvocation,
        timeout: Option<Duration>,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let program = invocation.program_name();
        let start = Instant::now();

        tracing::debug!(command = %invocation.display(), "Executing external tool");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(
                        program = %program,
                        timeout_secs = limit.as_secs(),
                        "External tool timed out"
                    );
                    return Err(ExecutorError::Timeout {
                        program,
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => cmd.output().await,
        };

        let output = output.map_err(|source| {
            tracing::error!(program = %program, error = %source, "Failed to start external tool");
            ExecutorError::Spawn {
                program: program.clone(),
                source,
            }
        })?;

        let duration = start.elapsed();
        let stdout = truncate(&String::from_utf8_lossy(&output.stdout), MAX_CAPTURE_CHARS);
        let stderr = truncate(&String::from_utf8_lossy(&output.stderr), MAX_CAPTURE_CHARS);

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            tracing::error!(
                program = %program,
                exit_code = code,
                duration_ms = duration.as_millis() as u64,
                stderr = %truncate(&stderr, LOG_STDERR_CHARS),
                "External tool failed"
            );
            return Err(ExecutorError::ProcessFailed {
                program,
                code,
                stdout,
                stderr,
            });
        }

        tracing::info!(
            program = %program,
            duration_ms = duration.as_millis() as u64,
            "External tool completed"
        );

        Ok(ExecutionOutcome {
            exit_code: output.status.code(),
            stdout,
            stderr,
            duration,
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}
