//! PyO3 wrapper for the simulated host

use pyo3::prelude::*;

use crate::core::Backend;
use crate::dispatch::Task;
use crate::harness::{HostStep, SimulatedHost};
use crate::lifecycle::{LifecycleManager, LifecycleState};
use crate::model::CallTrace;
use crate::registrar::CallbackReason;

/// Python wrapper around a [`SimulatedHost`] with a recording model
///
/// # Example (from Python)
///
/// ```python
/// from vpi_bridge_core_rs import Harness
///
/// h = Harness("vsim", finish_refires_end=True)
/// h.compile()
/// h.start()
/// h.task("init_sigs")
/// h.task("tick")
/// h.end()
/// assert h.calls() == ["signals", "channels", "cycle"]
/// assert h.finish_directives() == 0
/// ```
#[pyclass(name = "Harness", unsendable)]
pub struct PyHarness {
    host: SimulatedHost<LifecycleManager>,
    trace: CallTrace,
}

#[pymethods]
impl PyHarness {
    /// Create a harness for a backend
    ///
    /// # Errors
    ///
    /// Raises ValueError for an unknown backend name
    #[new]
    #[pyo3(signature = (backend = "generic", finish_refires_end = false))]
    fn new(backend: &str, finish_refires_end: bool) -> PyResult<Self> {
        let backend: Backend = backend
            .parse()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e)))?;

        let (host, trace) = SimulatedHost::with_recording_model(backend.into());
        Ok(PyHarness {
            host: host.finish_refires_end(finish_refires_end),
            trace,
        })
    }

    /// Run compile-time checks (registers the lifecycle callbacks)
    fn compile(&mut self) {
        self.host.compile();
    }

    /// Fire start-of-simulation
    fn start(&mut self) {
        self.host.fire(CallbackReason::StartOfSimulation);
    }

    /// Fire end-of-simulation
    fn end(&mut self) {
        self.host.fire(CallbackReason::EndOfSimulation);
    }

    /// Invoke a system task by name (`"tick"` or `"$tick"`)
    ///
    /// # Errors
    ///
    /// Raises ValueError for an unknown task, RuntimeError once the run is
    /// invalid (e.g. a task before start)
    fn task(&mut self, name: &str) -> PyResult<()> {
        let task: Task = name
            .parse()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e)))?;
        self.host.invoke(task);
        self.check_run()
    }

    /// Fire the clock callback
    fn clock(&mut self) -> PyResult<()> {
        self.host.step(&HostStep::Clock);
        self.check_run()
    }

    /// Run a JSON list of steps, e.g. `'["compile", "start", {"task": "tick"}]'`
    fn run_steps(&mut self, json: &str) -> PyResult<()> {
        let steps: Vec<HostStep> = serde_json::from_str(json).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid steps: {}", e))
        })?;
        self.host.run(&steps);
        self.check_run()
    }

    /// Model calls recorded so far
    fn calls(&self) -> Vec<String> {
        self.trace.calls().iter().map(|c| c.to_string()).collect()
    }

    fn allocations(&self) -> usize {
        self.trace.allocations()
    }

    fn releases(&self) -> usize {
        self.trace.releases()
    }

    /// Finish directives the host received
    fn finish_directives(&self) -> usize {
        self.host.report().finish_directives
    }

    /// `"idle"` or `"active"`
    fn state(&self) -> &'static str {
        match self.host.driver().state() {
            LifecycleState::Idle => "idle",
            LifecycleState::Active => "active",
        }
    }
}

impl PyHarness {
    fn check_run(&self) -> PyResult<()> {
        match &self.host.report().aborted {
            Some(err) => Err(PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Simulation run invalid: {}",
                err
            ))),
            None => Ok(()),
        }
    }
}
