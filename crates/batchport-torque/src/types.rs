//! Torque job types.

use batchport_core::Status;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Torque job state.
///
/// Torque uses single-letter state codes:
/// - Q: Queued
/// - H: Held
/// - T: Being moved to a new location
/// - W: Waiting for its execution time
/// - R: Running
/// - E: Exiting after having run
/// - S: Suspended
/// - C: Completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorqueState {
    Queued,
    Held,
    Transit,
    Waiting,
    Running,
    Exiting,
    Suspended,
    Completed,
    Unknown(String),
}

impl TorqueState {
    /// Parse a state code as printed in `job_state`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "Q" => Self::Queued,
            "H" => Self::Held,
            "T" => Self::Transit,
            "W" => Self::Waiting,
            "R" => Self::Running,
            "E" => Self::Exiting,
            "S" => Self::Suspended,
            "C" => Self::Completed,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Map to the normalized job status.
    pub fn to_status(&self) -> Status {
        match self {
            Self::Queued => Status::Queued,
            // a job in transit is closest to a held one
            Self::Held | Self::Transit => Status::QueuedHeld,
            // exiting jobs still hold their nodes
            Self::Running | Self::Exiting => Status::Running,
            Self::Suspended => Status::Suspended,
            Self::Completed => Status::Completed,
            Self::Waiting | Self::Unknown(_) => Status::Undetermined,
        }
    }
}

/// A job as reported by the batch server: its id and raw attributes.
///
/// Attribute names are the server's own (`Job_Owner`, `job_state`,
/// `resources_used.walltime`, ...), with nested resources flattened
/// using a dot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl JobRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attribute value, or None when absent or empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// `user@host` of the submitter.
    pub fn job_owner(&self) -> Option<&str> {
        self.get("Job_Owner")
    }

    pub fn state(&self) -> TorqueState {
        TorqueState::from_code(self.get("job_state").unwrap_or_default())
    }

    pub fn exec_host(&self) -> Option<&str> {
        self.get("exec_host")
    }

    pub fn submit_host(&self) -> Option<&str> {
        self.get("submit_host")
    }

    pub fn queue(&self) -> Option<&str> {
        self.get("queue")
    }

    pub fn walltime_used(&self) -> Option<&str> {
        self.get("resources_used.walltime")
    }

    pub fn cput_used(&self) -> Option<&str> {
        self.get("resources_used.cput")
    }

    pub fn ctime(&self) -> Option<&str> {
        self.get("ctime")
    }

    pub fn start_time(&self) -> Option<&str> {
        self.get("start_time")
    }

    /// Keep only the named attributes. An empty filter keeps everything.
    pub fn retain_attributes(&mut self, filters: &[&str]) {
        if filters.is_empty() {
            return;
        }
        self.attributes.retain(|key, _| filters.contains(&key.as_str()));
    }
}

/// Everything the batch server needs to queue a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Job script body
    pub content: String,
    /// Destination queue; the server default when unset
    pub queue: Option<String>,
    /// Job attributes (`Job_Name`, `depend`, ...)
    pub headers: BTreeMap<String, String>,
    /// Resource list entries (`walltime`, `nodes`, ...)
    pub resources: BTreeMap<String, String>,
    /// Environment exported to the job
    pub envvars: BTreeMap<String, String>,
}

/// Torque-specific overrides carried in [`batchport_core::Script::native`].
///
/// ```json
/// {"headers": {"group_list": "ops"}, "resources": {"gres": "gpu:1"}, "envvars": {"OMP_NUM_THREADS": 4}}
/// ```
///
/// Values are stringified, so numbers and booleans are accepted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TorqueNative {
    #[serde(default)]
    pub headers: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub resources: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub envvars: BTreeMap<String, serde_json::Value>,
}

impl TorqueNative {
    /// Merge one override table into `target`, overwriting existing keys.
    pub fn merge_into(
        overrides: &BTreeMap<String, serde_json::Value>,
        target: &mut BTreeMap<String, String>,
    ) {
        for (key, value) in overrides {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            target.insert(key.clone(), value);
        }
    }
}
