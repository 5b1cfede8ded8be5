//! Abstract job description.

use crate::error::{AdapterError, Result};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A request for a node of a given shape rather than a specific host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRequest {
    /// Processors per node
    pub procs: Option<u32>,
    /// Node feature tags
    pub properties: Option<Vec<String>>,
}

impl NodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_procs(mut self, procs: u32) -> Self {
        self.procs = Some(procs);
        self
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }
}

/// One entry of a job's node list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// Pin the job to this host
    Host(String),
    /// Any node matching the request
    Request(NodeRequest),
}

impl From<NodeRequest> for NodeSpec {
    fn from(request: NodeRequest) -> Self {
        NodeSpec::Request(request)
    }
}

impl From<&str> for NodeSpec {
    fn from(host: &str) -> Self {
        NodeSpec::Host(host.to_string())
    }
}

impl From<String> for NodeSpec {
    fn from(host: String) -> Self {
        NodeSpec::Host(host)
    }
}

/// Everything a caller can say about a job before submitting it.
///
/// Only `content` is required. Unset options and empty collections are left
/// out of the submission entirely so the resource manager applies its own
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Executable body of the job
    pub content: String,

    /// Arguments passed to the script
    #[serde(default)]
    pub args: Vec<String>,

    pub submit_as_hold: Option<bool>,
    pub rerunnable: Option<bool>,

    /// Environment variables exported to the job
    #[serde(default)]
    pub job_environment: BTreeMap<String, String>,

    pub workdir: Option<Utf8PathBuf>,

    /// Notification addresses
    #[serde(default)]
    pub email: Vec<String>,
    pub email_on_started: Option<bool>,
    pub email_on_terminated: Option<bool>,

    pub job_name: Option<String>,
    pub input_path: Option<Utf8PathBuf>,
    pub output_path: Option<Utf8PathBuf>,
    pub error_path: Option<Utf8PathBuf>,

    /// Merge stderr into stdout
    pub join_files: Option<bool>,

    pub reservation_id: Option<String>,
    pub queue_name: Option<String>,
    pub priority: Option<i64>,

    /// Minimum physical memory in KB
    pub min_phys_memory: Option<u64>,

    /// Earliest time the job may start
    pub start_time: Option<DateTime<Utc>>,

    /// Wall time limit in seconds
    pub wall_time: Option<u64>,

    pub accounting_id: Option<String>,

    #[serde(default)]
    pub nodes: Vec<NodeSpec>,

    /// Backend-specific options the abstract model doesn't cover
    pub native: Option<serde_json::Value>,
}

impl Script {
    /// Create a script from its body. Every other field starts unset.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Like [`Script::new`], but rejects an empty body.
    pub fn try_new(content: impl Into<String>) -> Result<Self> {
        let script = Self::new(content);
        script.validate()?;
        Ok(script)
    }

    /// Check the invariants an adapter relies on before submitting.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(AdapterError::Validation(
                "script content must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_submit_as_hold(mut self, hold: bool) -> Self {
        self.submit_as_hold = Some(hold);
        self
    }

    pub fn with_rerunnable(mut self, rerunnable: bool) -> Self {
        self.rerunnable = Some(rerunnable);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.job_environment.insert(key.into(), value.into());
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<Utf8PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn with_email<I, S>(mut self, email: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.email = email.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_email_on_started(mut self, notify: bool) -> Self {
        self.email_on_started = Some(notify);
        self
    }

    pub fn with_email_on_terminated(mut self, notify: bool) -> Self {
        self.email_on_terminated = Some(notify);
        self
    }

    pub fn with_job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = Some(name.into());
        self
    }

    pub fn with_input_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn with_output_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_error_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.error_path = Some(path.into());
        self
    }

    pub fn with_join_files(mut self, join: bool) -> Self {
        self.join_files = Some(join);
        self
    }

    pub fn with_reservation_id(mut self, id: impl Into<String>) -> Self {
        self.reservation_id = Some(id.into());
        self
    }

    pub fn with_queue_name(mut self, queue: impl Into<String>) -> Self {
        self.queue_name = Some(queue.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_min_phys_memory(mut self, kb: u64) -> Self {
        self.min_phys_memory = Some(kb);
        self
    }

    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    pub fn with_wall_time(mut self, seconds: u64) -> Self {
        self.wall_time = Some(seconds);
        self
    }

    pub fn with_accounting_id(mut self, id: impl Into<String>) -> Self {
        self.accounting_id = Some(id.into());
        self
    }

    pub fn with_nodes<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeSpec>,
    {
        self.nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_native(mut self, native: serde_json::Value) -> Self {
        self.native = Some(native);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_script_defaults_unset() {
        let script = Script::new("my script content");
        assert_eq!(script.content, "my script content");
        assert!(script.args.is_empty());
        assert!(script.submit_as_hold.is_none());
        assert!(script.job_environment.is_empty());
        assert!(script.workdir.is_none());
        assert!(script.nodes.is_empty());
        assert!(script.native.is_none());
    }

    #[test]
    fn test_script_requires_content() {
        assert!(matches!(
            Script::try_new(""),
            Err(AdapterError::Validation(_))
        ));
        assert!(Script::try_new("hostname").is_ok());
    }

    #[test]
    fn test_script_builder() {
        let script = Script::new("hostname")
            .with_args(["arg1", "arg2"])
            .with_submit_as_hold(false)
            .with_job_name("my_job")
            .with_wall_time(3600)
            .with_nodes([NodeSpec::from("n0001"), NodeRequest::new().with_procs(4).into()]);

        assert_eq!(script.args, vec!["arg1", "arg2"]);
        assert_eq!(script.submit_as_hold, Some(false));
        assert_eq!(script.job_name.as_deref(), Some("my_job"));
        assert_eq!(script.wall_time, Some(3600));
        assert_eq!(script.nodes.len(), 2);
    }

    #[test]
    fn test_node_request_equality() {
        let a = NodeRequest::new().with_procs(4).with_properties(["gpu"]);
        let b = NodeRequest::new().with_procs(4).with_properties(["gpu"]);
        let c = NodeRequest::new().with_procs(4);
        let d = NodeRequest::new().with_properties(["gpu"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(c, d);
    }

    #[test]
    fn test_node_request_as_group_key() {
        let mut counts: HashMap<NodeSpec, usize> = HashMap::new();
        for spec in [
            NodeSpec::from(NodeRequest::new().with_procs(2)),
            NodeSpec::from(NodeRequest::new().with_procs(2)),
            NodeSpec::from("n0001"),
        ] {
            *counts.entry(spec).or_default() += 1;
        }
        assert_eq!(counts[&NodeSpec::from(NodeRequest::new().with_procs(2))], 2);
        assert_eq!(counts[&NodeSpec::from("n0001")], 1);
    }

    #[test]
    fn test_node_spec_deserialize() {
        let nodes: Vec<NodeSpec> =
            serde_json::from_str(r#"["n0001", {"procs": 8, "properties": ["gpu"]}]"#).unwrap();
        assert_eq!(nodes[0], NodeSpec::Host("n0001".into()));
        assert_eq!(
            nodes[1],
            NodeSpec::Request(NodeRequest::new().with_procs(8).with_properties(["gpu"]))
        );
    }
}
