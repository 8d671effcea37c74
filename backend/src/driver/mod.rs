//! Driver interface
//!
//! The host talks to the bridge through [`Driver`]; the bridge talks back
//! through [`HostControl`]. Real simulators reach the driver through the
//! `vpi` entry points, tests and the replay CLI through
//! [`SimulatedHost`](crate::harness::SimulatedHost).

use crate::dispatch::Task;
use crate::lifecycle::{BridgeError, EndOutcome};

/// Host-facing side of the bridge
pub trait Driver {
    /// Start-of-simulation event
    fn on_start(&mut self) -> Result<(), BridgeError>;

    /// End-of-simulation event. Never fails; while Idle it is a no-op.
    fn on_end(&mut self) -> EndOutcome;

    /// A system task invoked by the design
    fn on_task(&mut self, task: Task) -> Result<(), BridgeError>;

    /// A system task invoked by name (`tick` or `$tick`)
    fn on_task_named(&mut self, name: &str) -> Result<(), BridgeError> {
        let task = name.parse()?;
        self.on_task(task)
    }

    /// Clock callback registered by the design instead of calling `$tick`
    fn on_clock_callback(&mut self) -> Result<(), BridgeError> {
        self.on_task(Task::Tick)
    }
}

/// Control directives the bridge may send to the host
pub trait HostControl {
    /// Ask the host to finish the simulation
    fn request_finish(&mut self);
}
