//! Torque client backed by the qsub/qstat/qhold/qrls/qdel tools.

use crate::client::{TorqueClient, TorqueError};
use crate::qstat::parse_qstat_full;
use crate::qsub::{parse_qsub_output, qsub_args};
use crate::types::{JobRecord, SubmitRequest};
use async_trait::async_trait;
use batchport_parsers::{CommandError, run_command, run_command_with_input};
use camino::{Utf8Path, Utf8PathBuf};
use tokio::process::Command;

/// Talks to a Torque server by running its client tools.
#[derive(Debug, Clone)]
pub struct CommandClient {
    /// Batch server host, exported to the tools as `PBS_DEFAULT`
    host: String,
    /// Directory holding the client tools; `$PATH` lookup when unset
    bin: Option<Utf8PathBuf>,
    /// Directory holding the client libraries
    lib: Option<Utf8PathBuf>,
}

impl CommandClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            bin: None,
            lib: None,
        }
    }

    pub fn with_bin(mut self, bin: impl Into<Utf8PathBuf>) -> Self {
        self.bin = Some(bin.into());
        self
    }

    pub fn with_lib(mut self, lib: impl Into<Utf8PathBuf>) -> Self {
        self.lib = Some(lib.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn bin(&self) -> Option<&Utf8Path> {
        self.bin.as_deref()
    }

    pub fn lib(&self) -> Option<&Utf8Path> {
        self.lib.as_deref()
    }

    /// Build a command for one of the client tools.
    fn command(&self, tool: &str) -> Command {
        let program = match &self.bin {
            Some(bin) => bin.join(tool).into_string(),
            None => tool.to_string(),
        };

        let mut cmd = Command::new(program);
        cmd.env("PBS_DEFAULT", &self.host);
        if let Some(lib) = &self.lib {
            cmd.env("LD_LIBRARY_PATH", lib.as_str());
        }
        cmd
    }

    /// Run a control tool (qhold, qrls, qdel) against one job.
    async fn control(&self, tool: &str, id: &str) -> Result<(), TorqueError> {
        tracing::debug!("Running {} {}", tool, id);
        let mut cmd = self.command(tool);
        cmd.arg(id);
        run_command(&mut cmd, tool)
            .await
            .map(|_| ())
            .map_err(|e| classify_error(tool, id, e))
    }
}

/// A failed tool run, keeping whatever the tool printed.
fn command_failed(tool: &str, error: &CommandError) -> TorqueError {
    let message = match error.stderr().map(str::trim) {
        Some(stderr) if !stderr.is_empty() => stderr.to_string(),
        _ => error.to_string(),
    };
    TorqueError::Command {
        command: tool.to_string(),
        message,
    }
}

/// Sort a failed per-job tool run into the error kinds the adapter cares about.
fn classify_error(tool: &str, id: &str, error: CommandError) -> TorqueError {
    let Some(stderr) = error.stderr().map(str::trim) else {
        return command_failed(tool, &error);
    };

    let lower = stderr.to_lowercase();
    if lower.contains("unknown job id") {
        TorqueError::UnknownJob {
            id: id.to_string(),
            message: stderr.to_string(),
        }
    } else if lower.contains("request invalid for state of job") || lower.contains("invalid state")
    {
        TorqueError::InvalidState {
            id: id.to_string(),
            message: stderr.to_string(),
        }
    } else {
        command_failed(tool, &error)
    }
}

#[async_trait]
impl TorqueClient for CommandClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<String, TorqueError> {
        let mut cmd = self.command("qsub");
        cmd.args(qsub_args(request));
        tracing::debug!("Submitting job to {}: {:?}", self.host, cmd.as_std());

        let output = run_command_with_input(&mut cmd, "qsub", &request.content)
            .await
            .map_err(|e| command_failed("qsub", &e))?;

        parse_qsub_output(&output.stdout).ok_or_else(|| TorqueError::Parse {
            command: "qsub".to_string(),
            message: "no job id in output".to_string(),
        })
    }

    async fn fetch(
        &self,
        id: Option<&str>,
        filters: &[&str],
    ) -> Result<Vec<JobRecord>, TorqueError> {
        let mut cmd = self.command("qstat");
        // -1 keeps every attribute on a single line
        cmd.args(["-f", "-1"]);
        if let Some(id) = id {
            cmd.arg(id);
        }
        tracing::debug!("Querying {} for {}", self.host, id.unwrap_or("all jobs"));

        let output = run_command(&mut cmd, "qstat")
            .await
            .map_err(|e| match id {
                Some(id) => classify_error("qstat", id, e),
                None => command_failed("qstat", &e),
            })?;

        let mut records = parse_qstat_full(&output.stdout);
        for record in &mut records {
            record.retain_attributes(filters);
        }
        Ok(records)
    }

    async fn hold(&self, id: &str) -> Result<(), TorqueError> {
        self.control("qhold", id).await
    }

    async fn release(&self, id: &str) -> Result<(), TorqueError> {
        self.control("qrls", id).await
    }

    async fn delete(&self, id: &str) -> Result<(), TorqueError> {
        self.control("qdel", id).await
    }
}
