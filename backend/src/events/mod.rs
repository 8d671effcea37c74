//! Lifecycle event logging
//!
//! Every transition of the lifecycle manager and every task it dispatches is
//! recorded as a [`BridgeEvent`]. The log is what tests and the replay CLI
//! inspect to see what the bridge did, independent of the model.

pub mod log;
pub mod types;

pub use log::EventLog;
pub use types::BridgeEvent;
