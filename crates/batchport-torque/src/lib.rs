//! PBS/Torque integration for batchport.
//!
//! [`TorqueAdapter`] translates between the abstract job model and Torque
//! job attributes. It talks to the batch server through any
//! [`TorqueClient`]; [`CommandClient`] drives the qsub/qstat/qhold/qrls/qdel
//! tools.

pub mod adapter;
pub mod batch;
pub mod client;
pub mod qstat;
pub mod qsub;
pub mod translate;
pub mod types;

pub use adapter::TorqueAdapter;
pub use batch::CommandClient;
pub use client::{TorqueClient, TorqueError};
pub use types::{JobRecord, SubmitRequest, TorqueNative, TorqueState};
