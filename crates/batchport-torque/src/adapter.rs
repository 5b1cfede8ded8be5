//! Torque implementation of the adapter contract.

use crate::client::{TorqueClient, TorqueError};
use crate::translate::{record_to_info, submit_request};
use async_trait::async_trait;
use batchport_core::{Adapter, AdapterError, Dependencies, Info, Result, Script, Status, require_id};

/// Adapter for a Torque resource manager.
///
/// Holds nothing but the client, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct TorqueAdapter<C> {
    client: C,
}

impl<C: TorqueClient> TorqueAdapter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run a control request, treating the benign failures as success.
    fn control(
        &self,
        operation: &str,
        result: std::result::Result<(), TorqueError>,
        absorb_invalid_state: bool,
    ) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(TorqueError::UnknownJob { id, .. }) => {
                tracing::debug!("{} on unknown job {}; treating as done", operation, id);
                Ok(())
            }
            Err(TorqueError::InvalidState { id, .. }) if absorb_invalid_state => {
                tracing::debug!("{} on finished job {}; treating as done", operation, id);
                Ok(())
            }
            Err(e) => Err(into_adapter_error(e)),
        }
    }
}

fn into_adapter_error(error: TorqueError) -> AdapterError {
    AdapterError::adapter(error.to_string())
}

#[async_trait]
impl<C: TorqueClient> Adapter for TorqueAdapter<C> {
    async fn submit(&self, script: &Script, dependencies: &Dependencies) -> Result<String> {
        let request = submit_request(script, dependencies)?;
        let id = self
            .client
            .submit(&request)
            .await
            .map_err(into_adapter_error)?;
        tracing::debug!("Submitted job {}", id);
        Ok(id)
    }

    async fn info_all(&self) -> Result<Vec<Info>> {
        let records = self
            .client
            .fetch(None, &[])
            .await
            .map_err(into_adapter_error)?;
        Ok(records.iter().map(record_to_info).collect())
    }

    async fn info(&self, id: &str) -> Result<Info> {
        let id = require_id(id)?;
        let records = match self.client.fetch(Some(id), &[]).await {
            Ok(records) => records,
            Err(TorqueError::UnknownJob { .. }) => {
                tracing::debug!("Job {} unknown to server; reporting completed", id);
                return Ok(Info::completed(id));
            }
            Err(e) => return Err(into_adapter_error(e)),
        };

        // array jobs and short ids can return more than one record
        let record = records
            .iter()
            .find(|r| r.id == id)
            .or_else(|| records.first());

        Ok(match record {
            Some(record) => record_to_info(record),
            None => Info::completed(id),
        })
    }

    async fn status(&self, id: &str) -> Result<Status> {
        let id = require_id(id)?;
        match self.client.fetch(Some(id), &["job_state"]).await {
            Ok(records) => Ok(records
                .iter()
                .find(|r| r.id == id)
                .or_else(|| records.first())
                .map(|r| r.state().to_status())
                .unwrap_or(Status::Completed)),
            Err(TorqueError::UnknownJob { .. }) => {
                tracing::debug!("Job {} unknown to server; reporting completed", id);
                Ok(Status::Completed)
            }
            Err(e) => Err(into_adapter_error(e)),
        }
    }

    async fn hold(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let result = self.client.hold(id).await;
        self.control("hold", result, false)
    }

    async fn release(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let result = self.client.release(id).await;
        self.control("release", result, false)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let result = self.client.delete(id).await;
        self.control("delete", result, true)
    }
}
