//! Error handling for adapter operations.

use thiserror::Error;

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors surfaced by an adapter.
///
/// Backends never leak their native error types; whatever the resource
/// manager reported is carried as plain text in [`AdapterError::Adapter`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// A required input was missing or malformed. Raised before any remote call.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// The adapter does not provide this operation.
    #[error("Adapter did not define #{0}")]
    NotImplemented(&'static str),

    /// The resource manager rejected or failed the request.
    #[error("{0}")]
    Adapter(String),
}

impl AdapterError {
    /// Wrap a native error message.
    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter(message.into())
    }
}

/// Reject empty job ids before talking to the resource manager.
pub fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AdapterError::Validation("job id must not be empty".into()));
    }
    Ok(id)
}
