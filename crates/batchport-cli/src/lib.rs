//! CLI argument parsing for batchport.

use batchport_core::{Dependencies, NodeRequest, NodeSpec, Script};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("Invalid node request '{0}': {1}")]
    NodeRequest(String, String),
    #[error("Invalid environment variable '{0}': expected KEY=VALUE")]
    EnvVar(String),
}

#[derive(Parser, Debug)]
#[command(name = "batchport")]
#[command(about = "Submit and manage jobs on a PBS/Torque cluster")]
pub struct Args {
    /// Cluster configuration file (JSON)
    #[arg(long, short)]
    pub config: Utf8PathBuf,

    /// Log remote calls to stderr
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a job script and print its id
    Submit(SubmitArgs),
    /// Show everything known about a job
    Info { id: String },
    /// Show every job on the server
    InfoAll {
        /// Only jobs submitted by this user (repeatable)
        #[arg(long)]
        owner: Vec<String>,
    },
    /// Show a job's status
    Status { id: String },
    /// Keep a queued job from starting
    Hold { id: String },
    /// Release a held job
    Release { id: String },
    /// Remove a job
    Delete { id: String },
}

#[derive(clap::Args, Debug)]
pub struct SubmitArgs {
    /// Job script to submit
    pub script: Utf8PathBuf,

    /// Destination queue
    #[arg(long)]
    pub queue: Option<String>,

    /// Job name
    #[arg(long)]
    pub name: Option<String>,

    /// Wall clock limit in seconds
    #[arg(long, value_name = "SECONDS")]
    pub walltime: Option<u64>,

    /// Minimum physical memory in kilobytes
    #[arg(long, value_name = "KB")]
    pub mem: Option<u64>,

    /// Request a node, written `[ppn=N][:prop]...` (repeatable)
    #[arg(long, value_name = "SPEC", value_parser = parse_node_request)]
    pub node_request: Vec<NodeRequest>,

    /// Run on this named node (repeatable)
    #[arg(long, value_name = "NAME")]
    pub host: Vec<String>,

    /// Submit in the held state
    #[arg(long)]
    pub hold: bool,

    /// Environment variable for the job (repeatable)
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_env)]
    pub env: Vec<(String, String)>,

    /// Start after these jobs have started
    #[arg(long, value_name = "ID")]
    pub after: Vec<String>,

    /// Start after these jobs succeed
    #[arg(long, value_name = "ID")]
    pub afterok: Vec<String>,

    /// Start after these jobs fail
    #[arg(long, value_name = "ID")]
    pub afternotok: Vec<String>,

    /// Start after these jobs end
    #[arg(long, value_name = "ID")]
    pub afterany: Vec<String>,

    /// Backend-specific options as a JSON object
    #[arg(long, value_name = "JSON", value_parser = parse_native)]
    pub native: Option<serde_json::Value>,
}

impl SubmitArgs {
    /// Build the job description around the script body.
    pub fn to_script(&self, content: impl Into<String>) -> Script {
        let mut script = Script::new(content);
        if self.hold {
            script = script.with_submit_as_hold(true);
        }
        if let Some(queue) = &self.queue {
            script = script.with_queue_name(queue);
        }
        if let Some(name) = &self.name {
            script = script.with_job_name(name);
        }
        if let Some(seconds) = self.walltime {
            script = script.with_wall_time(seconds);
        }
        if let Some(kb) = self.mem {
            script = script.with_min_phys_memory(kb);
        }
        for (key, value) in &self.env {
            script = script.with_env(key, value);
        }
        if let Some(native) = &self.native {
            script = script.with_native(native.clone());
        }

        let nodes: Vec<NodeSpec> = self
            .node_request
            .iter()
            .cloned()
            .map(NodeSpec::from)
            .chain(self.host.iter().cloned().map(NodeSpec::from))
            .collect();
        script.with_nodes(nodes)
    }

    pub fn dependencies(&self) -> Dependencies {
        Dependencies::none()
            .after(self.after.iter().cloned())
            .afterok(self.afterok.iter().cloned())
            .afternotok(self.afternotok.iter().cloned())
            .afterany(self.afterany.iter().cloned())
    }
}

/// Parse `[ppn=N][:prop]...`, e.g. `ppn=4:gpu` or `bigmem`.
pub fn parse_node_request(spec: &str) -> Result<NodeRequest, CliError> {
    let mut request = NodeRequest::new();
    let mut properties = Vec::new();

    for token in spec.split(':').map(str::trim).filter(|t| !t.is_empty()) {
        match token.strip_prefix("ppn=") {
            Some(procs) => {
                let procs = procs
                    .parse()
                    .map_err(|_| CliError::NodeRequest(spec.to_string(), format!("bad ppn '{procs}'")))?;
                request = request.with_procs(procs);
            }
            None => properties.push(token.to_string()),
        }
    }

    if !properties.is_empty() {
        request = request.with_properties(properties);
    }
    Ok(request)
}

/// Parse `KEY=VALUE`. The value may contain `=` and may be empty.
pub fn parse_env(var: &str) -> Result<(String, String), CliError> {
    match var.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::EnvVar(var.to_string())),
    }
}

fn parse_native(json: &str) -> Result<serde_json::Value, String> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_node_request() {
        assert_eq!(
            parse_node_request("ppn=4:gpu").unwrap(),
            NodeRequest::new().with_procs(4).with_properties(["gpu"])
        );
        assert_eq!(
            parse_node_request("bigmem").unwrap(),
            NodeRequest::new().with_properties(["bigmem"])
        );
        assert_eq!(parse_node_request("").unwrap(), NodeRequest::new());
        assert!(parse_node_request("ppn=x").is_err());
    }

    #[test]
    fn test_parse_env() {
        assert_eq!(
            parse_env("A=1").unwrap(),
            ("A".to_string(), "1".to_string())
        );
        assert_eq!(
            parse_env("OPTS=a=b").unwrap(),
            ("OPTS".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_env("EMPTY=").unwrap(), ("EMPTY".to_string(), String::new()));
        assert_eq!(parse_env("A"), Err(CliError::EnvVar("A".to_string())));
        assert!(parse_env("=1").is_err());
    }

    #[test]
    fn test_parse_control_commands() {
        let args = parse(&["batchport", "--config", "cluster.json", "delete", "7.server"]);
        assert_eq!(args.config, "cluster.json");
        assert!(!args.verbose);
        assert!(matches!(args.command, Command::Delete { id } if id == "7.server"));

        let args = parse(&["batchport", "-c", "c.json", "-v", "status", "7.server"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Status { .. }));
    }

    #[test]
    fn test_parse_info_all_owners() {
        let args = parse(&[
            "batchport", "--config", "c.json", "info-all", "--owner", "bob", "--owner", "sam",
        ]);
        match args.command {
            Command::InfoAll { owner } => assert_eq!(owner, vec!["bob", "sam"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_config_is_required() {
        assert!(Args::try_parse_from(["batchport", "status", "1"]).is_err());
    }

    #[test]
    fn test_submit_to_script() {
        let args = parse(&[
            "batchport",
            "--config",
            "c.json",
            "submit",
            "job.sh",
            "--queue",
            "batch",
            "--name",
            "align",
            "--walltime",
            "3600",
            "--mem",
            "1024",
            "--host",
            "n0001",
            "--node-request",
            "ppn=4",
            "--hold",
            "--env",
            "A=1",
            "--afterok",
            "1.server",
            "--afterok",
            "2.server",
            "--afterany",
            "3.server",
            "--native",
            r#"{"resources": {"pmem": "2gb"}}"#,
        ]);
        let Command::Submit(submit) = args.command else {
            panic!("expected submit");
        };
        assert_eq!(submit.script, "job.sh");

        let script = submit.to_script("hostname");
        assert_eq!(script.content, "hostname");
        assert_eq!(script.queue_name.as_deref(), Some("batch"));
        assert_eq!(script.job_name.as_deref(), Some("align"));
        assert_eq!(script.wall_time, Some(3600));
        assert_eq!(script.min_phys_memory, Some(1024));
        assert_eq!(script.submit_as_hold, Some(true));
        assert_eq!(script.job_environment["A"], "1");
        assert_eq!(
            script.nodes,
            vec![
                NodeSpec::Request(NodeRequest::new().with_procs(4)),
                NodeSpec::Host("n0001".to_string()),
            ]
        );
        assert_eq!(
            script.native,
            Some(serde_json::json!({"resources": {"pmem": "2gb"}}))
        );

        assert_eq!(
            submit.dependencies(),
            Dependencies::none()
                .afterok(["1.server", "2.server"])
                .afterany(["3.server"])
        );
    }

    #[test]
    fn test_submit_rejects_bad_values() {
        let base = ["batchport", "--config", "c.json", "submit", "job.sh"];
        for extra in [
            ["--env", "NOVALUE"],
            ["--node-request", "ppn=many"],
            ["--native", "[1, 2]"],
            ["--walltime", "1h"],
        ] {
            let argv: Vec<&str> = base.iter().chain(extra.iter()).copied().collect();
            assert!(Args::try_parse_from(argv).is_err(), "accepted {extra:?}");
        }
    }
}
