//! Job model and adapter contract for batchport.
//!
//! Callers describe jobs with [`Script`] and get [`Info`] / [`Status`] back
//! from any resource manager binding that implements [`Adapter`].

pub mod adapter;
pub mod error;
pub mod info;
pub mod script;
pub mod status;

pub use adapter::{Adapter, Dependencies};
pub use error::{AdapterError, Result, require_id};
pub use info::{AllocatedNode, Info};
pub use script::{NodeRequest, NodeSpec, Script};
pub use status::Status;
