//! Recording model
//!
//! A [`SimModel`] that does nothing except remember what was asked of it.
//! The simulated host, the Python harness and the replay CLI all use it to
//! observe the bridge from the collaborator's side.
//!
//! # Example
//!
//! ```rust
//! use vpi_bridge_core_rs::model::{CallTrace, ModelCall, ModelFactory, SimModel};
//!
//! let trace = CallTrace::new();
//! let mut factory = trace.factory();
//!
//! let mut model = factory.create();
//! model.init_signals();
//! model.advance_one_cycle();
//! drop(model);
//!
//! assert_eq!(trace.calls(), vec![ModelCall::Signals, ModelCall::Cycle]);
//! assert_eq!(trace.allocations(), 1);
//! assert_eq!(trace.releases(), 1);
//! ```

use super::{ModelCall, SimModel};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct TraceState {
    calls: Vec<ModelCall>,
    allocations: usize,
    releases: usize,
}

/// Shared view of every call made to models created from it
///
/// Cloning yields another handle to the same trace.
#[derive(Debug, Clone, Default)]
pub struct CallTrace {
    inner: Rc<RefCell<TraceState>>,
}

impl CallTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory producing [`RecordingModel`]s bound to this trace
    pub fn factory(&self) -> impl FnMut() -> Box<dyn SimModel> {
        let trace = self.clone();
        move || Box::new(RecordingModel::new(trace.clone())) as Box<dyn SimModel>
    }

    /// Every call recorded so far, across all models, in order
    pub fn calls(&self) -> Vec<ModelCall> {
        self.inner.borrow().calls.clone()
    }

    /// Number of models created
    pub fn allocations(&self) -> usize {
        self.inner.borrow().allocations
    }

    /// Number of models dropped
    pub fn releases(&self) -> usize {
        self.inner.borrow().releases
    }

    /// Models currently alive
    pub fn live(&self) -> usize {
        let state = self.inner.borrow();
        state.allocations - state.releases
    }

    /// Forget recorded calls, keeping allocation counters
    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    fn record(&self, call: ModelCall) {
        self.inner.borrow_mut().calls.push(call);
    }
}

/// Model that appends each operation to a [`CallTrace`]
#[derive(Debug)]
pub struct RecordingModel {
    trace: CallTrace,
}

impl RecordingModel {
    /// Create a model and count the allocation
    pub fn new(trace: CallTrace) -> Self {
        trace.inner.borrow_mut().allocations += 1;
        Self { trace }
    }
}

impl SimModel for RecordingModel {
    fn init_registers(&mut self) {
        self.trace.record(ModelCall::Registers);
    }

    fn init_inputs(&mut self) {
        self.trace.record(ModelCall::Inputs);
    }

    fn init_outputs(&mut self) {
        self.trace.record(ModelCall::Outputs);
    }

    fn init_signals(&mut self) {
        self.trace.record(ModelCall::Signals);
    }

    fn init_channels(&mut self) {
        self.trace.record(ModelCall::Channels);
    }

    fn advance_one_cycle(&mut self) {
        self.trace.record(ModelCall::Cycle);
    }
}

impl Drop for RecordingModel {
    fn drop(&mut self) {
        self.trace.inner.borrow_mut().releases += 1;
    }
}
