//! The batch server operations the adapter is built on.

use crate::types::{JobRecord, SubmitRequest};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TorqueError {
    /// The server has no record of this job.
    #[error("{message}")]
    UnknownJob { id: String, message: String },

    /// The job is in a state that doesn't allow the request.
    #[error("{message}")]
    InvalidState { id: String, message: String },

    /// A client tool failed; `message` is what it printed.
    #[error("{message}")]
    Command { command: String, message: String },

    /// A client tool produced output we couldn't understand.
    #[error("Failed to parse {command} output: {message}")]
    Parse { command: String, message: String },
}

/// Connection to a Torque batch server.
///
/// Implementations must report a job the server doesn't know as
/// [`TorqueError::UnknownJob`] and, for `delete`, a job that can no longer
/// be deleted as [`TorqueError::InvalidState`].
#[async_trait]
pub trait TorqueClient: Send + Sync {
    /// Queue a job, returning its id.
    async fn submit(&self, request: &SubmitRequest) -> Result<String, TorqueError>;

    /// Fetch job records: one job when `id` is given, every job otherwise.
    ///
    /// A non-empty `filters` limits the returned attributes to those names.
    async fn fetch(&self, id: Option<&str>, filters: &[&str])
    -> Result<Vec<JobRecord>, TorqueError>;

    async fn hold(&self, id: &str) -> Result<(), TorqueError>;

    async fn release(&self, id: &str) -> Result<(), TorqueError>;

    async fn delete(&self, id: &str) -> Result<(), TorqueError>;
}
