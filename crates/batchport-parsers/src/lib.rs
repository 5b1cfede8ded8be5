//! Shared parsing utilities for batch scheduler vocabularies.
//!
//! Duration strings, timestamps and node allocation lists come back from
//! every resource manager in a slightly different shape. The helpers here
//! turn them into plain integers and strings for the adapter crates.

pub mod command;
pub mod nodes;
pub mod time;

pub use command::{CommandError, CommandOutput, run_command, run_command_with_input};
pub use nodes::{NodeAllocation, parse_nodes};
pub use time::{
    duration_to_seconds, format_execution_time, parse_torque_timestamp, seconds_to_duration,
};
