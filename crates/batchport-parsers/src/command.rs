//! Command execution utilities for scheduler client tools.

use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Error type for command execution.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to execute {command}: {error}")]
    Execution { command: String, error: String },
    #[error("Command {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

impl CommandError {
    /// Standard error text of a command that ran and exited non-zero.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            Self::Execution { .. } => None,
        }
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Execute a command and return its output.
///
/// A non-zero exit becomes [`CommandError::Failed`] carrying stderr, which
/// scheduler clients inspect to tell "unknown job" apart from real failures.
pub async fn run_command(cmd: &mut Command, name: &str) -> Result<CommandOutput, CommandError> {
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| CommandError::Execution {
            command: name.to_string(),
            error: e.to_string(),
        })?;

    collect_output(output, name)
}

/// Execute a command with `input` written to its stdin.
///
/// Used for qsub-style tools that read the job script from standard input.
pub async fn run_command_with_input(
    cmd: &mut Command,
    name: &str,
    input: &str,
) -> Result<CommandOutput, CommandError> {
    let execution_error = |e: std::io::Error| CommandError::Execution {
        command: name.to_string(),
        error: e.to_string(),
    };

    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(execution_error)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .await
            .map_err(execution_error)?;
        // dropping stdin closes the pipe so the tool sees EOF
    }

    let output = child.wait_with_output().await.map_err(execution_error)?;
    collect_output(output, name)
}

fn collect_output(output: std::process::Output, name: &str) -> Result<CommandOutput, CommandError> {
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(CommandError::Failed {
            command: name.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr,
    })
}
