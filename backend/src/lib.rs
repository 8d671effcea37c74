//! VPI Bridge Core - Rust Engine
//!
//! Lifecycle bridge between an event-driven Verilog simulator and a
//! simulation model. The bridge owns the single model instance of a run,
//! creates it on start-of-simulation, releases it on end-of-simulation and
//! forwards the design's system tasks to it.
//!
//! # Architecture
//!
//! - **core**: Backend capability configuration
//! - **model**: Model capability trait and the recording model
//! - **lifecycle**: Start/end state machine owning the simulation context
//! - **dispatch**: The five system tasks and what they forward to
//! - **registrar**: One-time subscription of the lifecycle handlers
//! - **driver**: Host-facing interface implemented by the manager
//! - **harness**: Simulated host for replaying event sequences
//! - **events**: Structured log of everything the bridge did
//!
//! # Critical Invariants
//!
//! 1. At most one model is alive; each one is released exactly once
//! 2. `init_sigs` initializes signals strictly before channels
//! 3. The finish directive is never issued on backends that re-fire the
//!    end event, and never issued for an end event received while idle

// Module declarations
pub mod core;
pub mod dispatch;
pub mod driver;
pub mod events;
pub mod harness;
pub mod lifecycle;
pub mod model;
pub mod registrar;

// Re-exports for convenience
pub use crate::core::config::{Backend, BridgeConfig, ConfigError};
pub use dispatch::Task;
pub use driver::{Driver, HostControl};
pub use events::{BridgeEvent, EventLog};
pub use harness::{HostReport, HostScript, HostStep, SimulatedHost};
pub use lifecycle::{
    BridgeError, EndOutcome, FinishDirective, LifecycleManager, LifecycleState, SimulationContext,
};
pub use model::{CallTrace, ModelCall, ModelFactory, RecordingModel, SimModel};
pub use registrar::{register_lifecycle_callbacks, CallbackRegistry, Subscription};

// Raw VPI entry points (when feature enabled)
#[cfg(feature = "vpi")]
pub mod vpi;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn vpi_bridge_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::harness::PyHarness>()?;
    Ok(())
}
