//! Bridge error types

use crate::dispatch::Task;
use thiserror::Error;
use uuid::Uuid;

/// Contract violations detected by the bridge
///
/// None of these are recoverable inside a run; the adapter decides whether
/// to abort the host or report them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Simulation start received while run {run_id} is still active")]
    AlreadyActive { run_id: Uuid },

    #[error("Task '{task}' invoked with no active model (start of simulation not received)")]
    NoActiveModel { task: Task },

    #[error("Unknown system task: '{0}'")]
    UnknownTask(String),

    #[error("No lifecycle manager installed in the plugin slot")]
    NotInstalled,
}
