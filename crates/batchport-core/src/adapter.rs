//! The contract every resource manager binding implements.

use crate::error::{AdapterError, Result};
use crate::info::Info;
use crate::script::Script;
use crate::status::Status;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Jobs a new submission waits on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    /// Start any time after these jobs have started
    #[serde(default)]
    pub after: Vec<String>,
    /// Start only after these jobs finished without error
    #[serde(default)]
    pub afterok: Vec<String>,
    /// Start only after these jobs finished with an error
    #[serde(default)]
    pub afternotok: Vec<String>,
    /// Start after these jobs finished, however they ended
    #[serde(default)]
    pub afterany: Vec<String>,
}

impl Dependencies {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.after.is_empty()
            && self.afterok.is_empty()
            && self.afternotok.is_empty()
            && self.afterany.is_empty()
    }

    pub fn after<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.after.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn afterok<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.afterok.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn afternotok<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.afternotok.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn afterany<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.afterany.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// Submit, query and control jobs on one resource manager.
///
/// # Contract
///
/// - Unknown job ids are not errors. `info` and `status` report them as
///   [`Status::Completed`]; `hold`, `release` and `delete` succeed, since the
///   job is already gone. `delete` also succeeds on jobs that are already
///   exiting or finished.
/// - Every other remote failure is an [`AdapterError::Adapter`] carrying the
///   resource manager's message. Nothing is retried.
/// - Empty ids and scripts are rejected with [`AdapterError::Validation`]
///   before any remote call.
/// - Methods a backend doesn't override fail with
///   [`AdapterError::NotImplemented`].
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Submit a job, returning the id the resource manager assigned.
    async fn submit(&self, script: &Script, dependencies: &Dependencies) -> Result<String> {
        let _ = (script, dependencies);
        Err(AdapterError::NotImplemented("submit"))
    }

    /// Information about every job visible to this adapter.
    async fn info_all(&self) -> Result<Vec<Info>> {
        Err(AdapterError::NotImplemented("info_all"))
    }

    /// Jobs owned by any of `owners`, in the order [`Adapter::info_all`] returns them.
    async fn info_where_owner(&self, owners: &[&str]) -> Result<Vec<Info>> {
        let jobs = self.info_all().await?;
        Ok(jobs
            .into_iter()
            .filter(|info| owners.iter().any(|owner| info.is_owned_by(owner)))
            .collect())
    }

    /// Information about a single job.
    async fn info(&self, id: &str) -> Result<Info> {
        let _ = id;
        Err(AdapterError::NotImplemented("info"))
    }

    /// Current state of a job. Cheaper than [`Adapter::info`].
    async fn status(&self, id: &str) -> Result<Status> {
        let _ = id;
        Err(AdapterError::NotImplemented("status"))
    }

    /// Keep a queued job from starting.
    async fn hold(&self, id: &str) -> Result<()> {
        let _ = id;
        Err(AdapterError::NotImplemented("hold"))
    }

    /// Let a held job run.
    async fn release(&self, id: &str) -> Result<()> {
        let _ = id;
        Err(AdapterError::NotImplemented("release"))
    }

    /// Remove a job, killing it if it is running.
    async fn delete(&self, id: &str) -> Result<()> {
        let _ = id;
        Err(AdapterError::NotImplemented("delete"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unimplemented;

    impl Adapter for Unimplemented {}

    struct FixedJobs(Vec<Info>);

    #[async_trait]
    impl Adapter for FixedJobs {
        async fn info_all(&self) -> Result<Vec<Info>> {
            Ok(self.0.clone())
        }
    }

    fn owned(id: &str, owner: &str) -> Info {
        Info {
            id: id.to_string(),
            job_owner: Some(owner.to_string()),
            ..Default::default()
        }
    }

    fn ids(jobs: &[Info]) -> Vec<&str> {
        jobs.iter().map(|j| j.id.as_str()).collect()
    }

    fn fixture() -> FixedJobs {
        FixedJobs(vec![
            owned("1", "bob"),
            owned("2", "sam"),
            owned("1", "bob"),
            owned("3", "jon"),
        ])
    }

    #[tokio::test]
    async fn test_unimplemented_operations() {
        let adapter = Unimplemented;
        let script = Script::new("hostname");

        assert_eq!(
            adapter.submit(&script, &Dependencies::none()).await,
            Err(AdapterError::NotImplemented("submit"))
        );
        assert_eq!(
            adapter.info_all().await,
            Err(AdapterError::NotImplemented("info_all"))
        );
        assert_eq!(
            adapter.info("id").await,
            Err(AdapterError::NotImplemented("info"))
        );
        assert_eq!(
            adapter.status("id").await,
            Err(AdapterError::NotImplemented("status"))
        );
        assert_eq!(
            adapter.hold("id").await,
            Err(AdapterError::NotImplemented("hold"))
        );
        assert_eq!(
            adapter.release("id").await,
            Err(AdapterError::NotImplemented("release"))
        );
        assert_eq!(
            adapter.delete("id").await,
            Err(AdapterError::NotImplemented("delete"))
        );
    }

    #[tokio::test]
    async fn test_info_where_owner_no_match() {
        let jobs = fixture().info_where_owner(&["nobody"]).await.unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_info_where_owner_single() {
        let jobs = fixture().info_where_owner(&["bob"]).await.unwrap();
        assert_eq!(ids(&jobs), vec!["1", "1"]);
    }

    #[tokio::test]
    async fn test_info_where_owner_keeps_order_and_duplicates() {
        let jobs = fixture().info_where_owner(&["bob", "sam"]).await.unwrap();
        assert_eq!(ids(&jobs), vec!["1", "2", "1"]);
        let owners: Vec<_> = jobs.iter().filter_map(|j| j.job_owner.as_deref()).collect();
        assert_eq!(owners, vec!["bob", "sam", "bob"]);
    }

    #[tokio::test]
    async fn test_info_where_owner_propagates_errors() {
        let result = Unimplemented.info_where_owner(&["bob"]).await;
        assert_eq!(result, Err(AdapterError::NotImplemented("info_all")));
    }

    #[test]
    fn test_dependencies_builder() {
        let deps = Dependencies::none().afterok(["1.server", "2.server"]);
        assert!(!deps.is_empty());
        assert_eq!(deps.afterok, vec!["1.server", "2.server"]);
        assert!(Dependencies::none().is_empty());
    }

    #[test]
    fn test_adapter_is_object_safe() {
        let adapters: Vec<Box<dyn Adapter>> = vec![Box::new(Unimplemented), Box::new(fixture())];
        assert_eq!(adapters.len(), 2);
    }
}
