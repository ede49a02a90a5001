//! External process execution.
//!
//! Every tool the pipeline shells out to (runtime locator, permission passes,
//! PlistBuddy, nested builds, ...) goes through a [`ProcessExecutor`]. The
//! production implementation spawns real processes with tokio; tests swap in
//! a recording fake to assert the exact command sequence.

use crate::bundler::error::{Error, Result};
use std::future::Future;
use std::path::Path;

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ProcessOutput {
    /// Output of a process that exited with code 0.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Output of a process that exited with the given non-zero code.
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// True if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a command to completion and captures its output.
///
/// Implementations return `Ok` for any process that ran, whatever its exit
/// code; only a failure to spawn is an `Err`. Use [`run_checked`] to turn a
/// non-zero exit into [`Error::ExternalTool`].
pub trait ProcessExecutor {
    /// Run `program` with `args`, optionally inside `working_dir`.
    fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> impl Future<Output = Result<ProcessOutput>>;
}

impl<E: ProcessExecutor + ?Sized> ProcessExecutor for &E {
    fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> impl Future<Output = Result<ProcessOutput>> {
        (**self).run(program, args, working_dir)
    }
}

/// Spawns real child processes with `tokio::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutor;

impl ProcessExecutor for TokioExecutor {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<ProcessOutput> {
        log::debug!("Running {} {}", program, args.join(" "));

        let mut command = tokio::process::Command::new(program);
        command.args(args);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: program.to_string(),
                error,
            })?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs a command and fails with [`Error::ExternalTool`] on a non-zero exit.
///
/// `tool` is the human readable name used in the error message.
pub async fn run_checked<E: ProcessExecutor + ?Sized>(
    executor: &E,
    tool: &str,
    program: &str,
    args: &[String],
    working_dir: Option<&Path>,
) -> Result<ProcessOutput> {
    let output = executor.run(program, args, working_dir).await?;

    if !output.success() {
        let status = output
            .status
            .map(|code| format!("exit code {code}"))
            .unwrap_or_else(|| "terminated by signal".to_string());
        let diagnostics = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        return Err(Error::ExternalTool {
            tool: tool.to_string(),
            reason: format!("{status}: {diagnostics}"),
        });
    }

    Ok(output)
}
