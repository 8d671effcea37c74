//! External model collaborator
//!
//! The bridge never looks inside the model. It only needs the six
//! operations below and owns the model's lifetime: creation goes through a
//! [`ModelFactory`], release is `Drop`.

pub mod recording;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use recording::{CallTrace, RecordingModel};

/// Capability set the bridge requires from the simulation model
///
/// All operations are synchronous and treated as infallible; any failure
/// policy belongs to the implementor.
pub trait SimModel {
    /// Initialize register state
    fn init_registers(&mut self);

    /// Initialize top-level inputs
    fn init_inputs(&mut self);

    /// Initialize top-level outputs
    fn init_outputs(&mut self);

    /// Initialize internal signals
    fn init_signals(&mut self);

    /// Initialize inter-process channels. Requires signals to be initialized.
    fn init_channels(&mut self);

    /// Advance the model by one clock cycle
    fn advance_one_cycle(&mut self);
}

/// Creates a fresh model each time a simulation starts
pub trait ModelFactory {
    fn create(&mut self) -> Box<dyn SimModel>;
}

impl<F> ModelFactory for F
where
    F: FnMut() -> Box<dyn SimModel>,
{
    fn create(&mut self) -> Box<dyn SimModel> {
        self()
    }
}

/// One collaborator operation, as observed from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCall {
    Registers,
    Inputs,
    Outputs,
    Signals,
    Channels,
    Cycle,
}

impl ModelCall {
    /// Apply this operation to a model
    pub fn apply(self, model: &mut dyn SimModel) {
        match self {
            ModelCall::Registers => model.init_registers(),
            ModelCall::Inputs => model.init_inputs(),
            ModelCall::Outputs => model.init_outputs(),
            ModelCall::Signals => model.init_signals(),
            ModelCall::Channels => model.init_channels(),
            ModelCall::Cycle => model.advance_one_cycle(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModelCall::Registers => "registers",
            ModelCall::Inputs => "inputs",
            ModelCall::Outputs => "outputs",
            ModelCall::Signals => "signals",
            ModelCall::Channels => "channels",
            ModelCall::Cycle => "cycle",
        }
    }
}

impl fmt::Display for ModelCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
