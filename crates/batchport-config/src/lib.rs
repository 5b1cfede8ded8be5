//! Cluster configuration and the adapter factory.
//!
//! A cluster is described by a small JSON file:
//!
//! ```json
//! { "adapter": "torque", "host": "torque-server", "bin": "/opt/torque/bin", "lib": "/opt/torque/lib" }
//! ```

use batchport_core::Adapter;
use batchport_torque::{CommandClient, TorqueAdapter};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required config field: {0}")]
    MissingField(&'static str),
}

/// Resource managers an adapter can be built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    #[default]
    Torque,
}

/// How to reach one cluster's resource manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub adapter: AdapterKind,
    /// Batch server host
    #[serde(default)]
    pub host: String,
    /// Directory with the client tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<Utf8PathBuf>,
    /// Directory with the client libraries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<Utf8PathBuf>,
}

impl ClusterConfig {
    pub fn torque(host: impl Into<String>) -> Self {
        Self {
            adapter: AdapterKind::Torque,
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

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField("host"));
        }
        Ok(())
    }
}

/// Read a cluster configuration from a JSON file.
pub fn load_config(path: &Utf8Path) -> Result<ClusterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ClusterConfig = serde_json::from_str(&content)?;
    config.validate()?;
    tracing::debug!("Loaded {:?} config for {} from {}", config.adapter, config.host, path);
    Ok(config)
}

/// Build the adapter a configuration describes.
pub fn build_adapter(config: &ClusterConfig) -> Result<Box<dyn Adapter>, ConfigError> {
    config.validate()?;
    match config.adapter {
        AdapterKind::Torque => {
            let mut client = CommandClient::new(config.host.trim());
            if let Some(bin) = &config.bin {
                client = client.with_bin(bin.clone());
            }
            if let Some(lib) = &config.lib {
                client = client.with_lib(lib.clone());
            }
            Ok(Box::new(TorqueAdapter::new(client)))
        }
    }
}
