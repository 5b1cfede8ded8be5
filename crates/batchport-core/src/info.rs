//! Queried job state.

use crate::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node allocated to a running job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedNode {
    pub name: String,
    pub procs: u32,
}

/// Everything an adapter could learn about a job from the resource manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Job id assigned by the resource manager
    pub id: String,

    pub status: Status,

    /// Nodes and processor slots the job occupies
    #[serde(default)]
    pub allocated_nodes: Vec<AllocatedNode>,

    pub submit_host: Option<String>,
    pub job_owner: Option<String>,

    /// Total processors across `allocated_nodes`
    pub procs: u32,

    pub queue_name: Option<String>,

    /// Elapsed wall clock time in seconds
    pub wallclock_time: u64,

    /// Aggregate CPU time in seconds
    pub cpu_time: u64,

    pub submission_time: Option<DateTime<Utc>>,
    pub dispatch_time: Option<DateTime<Utc>>,

    /// Raw resource manager record, for diagnostics only
    pub native: Option<serde_json::Value>,
}

impl Info {
    /// Info for a job the resource manager no longer knows about.
    ///
    /// Resource managers drop records some time after a job finishes, so an
    /// unknown id is reported as completed with nothing else filled in.
    pub fn completed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Status::Completed,
            ..Default::default()
        }
    }

    /// Attach allocated nodes and recompute the processor total.
    pub fn with_allocated_nodes(mut self, nodes: Vec<AllocatedNode>) -> Self {
        self.procs = nodes.iter().map(|n| n.procs).sum();
        self.allocated_nodes = nodes;
        self
    }

    /// Whether `owner` submitted this job.
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.job_owner.as_deref() == Some(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_info() {
        let info = Info::completed("nonexistent-id");
        assert_eq!(info.id, "nonexistent-id");
        assert_eq!(info.status, Status::Completed);
        assert!(info.allocated_nodes.is_empty());
        assert!(info.job_owner.is_none());
        assert!(info.submit_host.is_none());
        assert!(info.queue_name.is_none());
        assert!(info.submission_time.is_none());
        assert!(info.dispatch_time.is_none());
        assert!(info.native.is_none());
        assert_eq!(info.procs, 0);
        assert_eq!(info.wallclock_time, 0);
        assert_eq!(info.cpu_time, 0);
    }

    #[test]
    fn test_allocated_nodes_sum_procs() {
        let info = Info::completed("1").with_allocated_nodes(vec![
            AllocatedNode {
                name: "n01".into(),
                procs: 4,
            },
            AllocatedNode {
                name: "n02".into(),
                procs: 12,
            },
        ]);
        assert_eq!(info.procs, 16);
    }

    #[test]
    fn test_is_owned_by() {
        let info = Info {
            job_owner: Some("bob".into()),
            ..Default::default()
        };
        assert!(info.is_owned_by("bob"));
        assert!(!info.is_owned_by("sam"));
        assert!(!Info::default().is_owned_by(""));
    }
}
