//! Per-run simulation context

use crate::model::SimModel;
use std::fmt;
use uuid::Uuid;

/// Everything that lives exactly as long as one simulation run
///
/// Owned by the [`LifecycleManager`](super::LifecycleManager) and lent to
/// task handlers by mutable reference. Dropping it releases the model.
pub struct SimulationContext {
    run_id: Uuid,
    model: Box<dyn SimModel>,
    cycles: u64,
}

impl SimulationContext {
    pub fn new(model: Box<dyn SimModel>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            model,
            cycles: 0,
        }
    }

    /// Unique id of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Cycles advanced so far in this run
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn model_mut(&mut self) -> &mut dyn SimModel {
        self.model.as_mut()
    }

    pub(crate) fn record_cycle(&mut self) {
        self.cycles += 1;
    }
}

impl fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationContext")
            .field("run_id", &self.run_id)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}
