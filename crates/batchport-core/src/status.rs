//! Terse job state shared by every backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized job state.
///
/// `Completed` is the only terminal state; everything else may still change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The resource manager reported something we can't classify
    #[default]
    Undetermined,
    /// Waiting in a queue
    Queued,
    /// Queued but held from running
    QueuedHeld,
    /// Running (or still cleaning up)
    Running,
    /// Suspended mid-run
    Suspended,
    /// Finished, or no longer known to the resource manager
    Completed,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Undetermined,
        Status::Queued,
        Status::QueuedHeld,
        Status::Running,
        Status::Suspended,
        Status::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undetermined => "undetermined",
            Self::Queued => "queued",
            Self::QueuedHeld => "queued_held",
            Self::Running => "running",
            Self::Suspended => "suspended",
            Self::Completed => "completed",
        }
    }

    pub fn is_undetermined(&self) -> bool {
        matches!(self, Self::Undetermined)
    }

    /// Queued, whether held or not.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued | Self::QueuedHeld)
    }

    pub fn is_held(&self) -> bool {
        matches!(self, Self::QueuedHeld)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job status: {s}"))
    }
}
