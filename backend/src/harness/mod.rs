//! Simulated host
//!
//! Replays host event sequences against any [`Driver`] without a real
//! simulator. It behaves like a VPI host in the ways that matter to the
//! bridge:
//!
//! - lifecycle events reach the driver only through subscriptions made by
//!   the registrar during [`HostStep::Compile`]; skip it and the driver never
//!   sees a start event
//! - a driver subscribed twice receives each lifecycle event twice
//! - with `finish_refires_end` set, a finish directive re-fires the
//!   end-of-simulation event, the way some backends do
//! - a failed task invalidates the run and stops the replay
//!
//! Re-fired events are queued and delivered after the current handler has
//! returned. More than [`MAX_REENTRANT_END_EVENTS`] re-fires in a row is
//! reported as a termination loop instead of hanging.
//!
//! # Example
//!
//! ```rust
//! use vpi_bridge_core_rs::harness::{HostStep, SimulatedHost};
//! use vpi_bridge_core_rs::{Backend, BridgeConfig, Task};
//!
//! let (mut host, trace) = SimulatedHost::with_recording_model(BridgeConfig::for_backend(Backend::Vsim));
//! let report = host.run(&[
//!     HostStep::Compile,
//!     HostStep::Start,
//!     HostStep::Task(Task::Tick),
//!     HostStep::End,
//! ]);
//!
//! assert!(report.aborted.is_none());
//! assert_eq!(report.finish_directives, 0);
//! assert_eq!(trace.releases(), 1);
//! ```

mod script;

pub use script::{HostScript, HostStep};

use crate::core::BridgeConfig;
use crate::dispatch::Task;
use crate::driver::{Driver, HostControl};
use crate::lifecycle::{BridgeError, LifecycleManager};
use crate::model::CallTrace;
use crate::registrar::{
    register_lifecycle_callbacks, CallbackReason, CallbackRegistry, LifecycleHook, Subscription,
};
use std::collections::VecDeque;

/// Re-fired end events tolerated before declaring a termination loop
pub const MAX_REENTRANT_END_EVENTS: usize = 16;

/// What happened during a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostReport {
    /// Finish directives the host received
    pub finish_directives: usize,
    /// Lifecycle callbacks delivered to the driver
    pub delivered_events: usize,
    /// Start events the driver rejected
    pub rejected_starts: usize,
    /// Error that invalidated the run
    pub aborted: Option<BridgeError>,
    /// Re-fired end events exceeded [`MAX_REENTRANT_END_EVENTS`]
    pub termination_loop: bool,
}

/// Host callback table
#[derive(Debug, Clone, Default)]
pub struct HostCallbacks {
    subscriptions: Vec<Subscription>,
    released_handles: usize,
}

impl HostCallbacks {
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Handles returned by `register` and already released
    pub fn released_handles(&self) -> usize {
        self.released_handles
    }

    fn hooks_for(&self, reason: CallbackReason) -> Vec<LifecycleHook> {
        self.subscriptions
            .iter()
            .filter(|s| s.reason == reason)
            .map(|s| s.hook)
            .collect()
    }
}

impl CallbackRegistry for HostCallbacks {
    type Handle = usize;

    fn register(&mut self, subscription: Subscription) -> usize {
        self.subscriptions.push(subscription);
        self.subscriptions.len() - 1
    }

    fn release_handle(&mut self, _handle: usize) {
        self.released_handles += 1;
    }
}

/// Host bookkeeping for finish directives
#[derive(Debug, Default)]
struct Terminator {
    finish_refires_end: bool,
    pending: VecDeque<CallbackReason>,
    refires: usize,
    finish_directives: usize,
}

impl HostControl for Terminator {
    fn request_finish(&mut self) {
        self.finish_directives += 1;
        if self.finish_refires_end {
            self.pending.push_back(CallbackReason::EndOfSimulation);
        }
    }
}

/// Event-loop stand-in driving a [`Driver`]
#[derive(Debug)]
pub struct SimulatedHost<D: Driver> {
    driver: D,
    callbacks: HostCallbacks,
    terminator: Terminator,
    report: HostReport,
}

impl SimulatedHost<LifecycleManager> {
    /// Host around a manager whose models record into the returned trace
    pub fn with_recording_model(config: BridgeConfig) -> (Self, CallTrace) {
        let trace = CallTrace::new();
        let manager = LifecycleManager::new(config, trace.factory());
        (Self::new(manager), trace)
    }

    /// Host configured the way a script asks for; steps are not run
    pub fn for_script(script: &HostScript) -> (Self, CallTrace) {
        let trace = CallTrace::new();
        let mut manager = LifecycleManager::new(script.config, trace.factory());
        if !script.record_task_events {
            manager = manager.without_task_events();
        }
        let host = Self::new(manager).finish_refires_end(script.finish_refires_end);
        (host, trace)
    }
}

impl<D: Driver> SimulatedHost<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            callbacks: HostCallbacks::default(),
            terminator: Terminator::default(),
            report: HostReport::default(),
        }
    }

    /// Make finish directives re-fire the end-of-simulation event
    pub fn finish_refires_end(mut self, refires: bool) -> Self {
        self.terminator.finish_refires_end = refires;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn callbacks(&self) -> &HostCallbacks {
        &self.callbacks
    }

    /// Report accumulated over every step run so far
    pub fn report(&self) -> &HostReport {
        &self.report
    }

    /// Run steps in order, stopping early if the run is invalidated
    pub fn run(&mut self, steps: &[HostStep]) -> HostReport {
        for step in steps {
            if self.report.aborted.is_some() {
                break;
            }
            self.step(step);
        }
        self.report.clone()
    }

    /// Run a single step
    pub fn step(&mut self, step: &HostStep) {
        match step {
            HostStep::Compile => self.compile(),
            HostStep::Start => self.fire(CallbackReason::StartOfSimulation),
            HostStep::End => self.fire(CallbackReason::EndOfSimulation),
            HostStep::Task(task) => self.invoke(*task),
            HostStep::Clock => {
                let result = self.driver.on_clock_callback();
                self.record_task_result(result);
            }
            HostStep::Repeat { times, step } => {
                for _ in 0..*times {
                    if self.report.aborted.is_some() {
                        break;
                    }
                    self.step(step);
                }
            }
        }
    }

    /// Compile-time checks: every task with a compile hook runs the registrar
    pub fn compile(&mut self) {
        for task in Task::ALL.into_iter().filter(|t| t.has_compile_hook()) {
            tracing::debug!(%task, "running compile-time check");
            register_lifecycle_callbacks(&mut self.callbacks);
        }
    }

    /// Fire a lifecycle event and everything it re-fires
    pub fn fire(&mut self, reason: CallbackReason) {
        self.terminator.pending.push_back(reason);
        self.terminator.refires = 0;

        while let Some(reason) = self.terminator.pending.pop_front() {
            for hook in self.callbacks.hooks_for(reason) {
                self.deliver(hook);
            }

            if reason == CallbackReason::EndOfSimulation && !self.terminator.pending.is_empty() {
                self.terminator.refires += 1;
                if self.terminator.refires > MAX_REENTRANT_END_EVENTS {
                    tracing::error!(refires = self.terminator.refires, "termination loop detected");
                    self.report.termination_loop = true;
                    self.terminator.pending.clear();
                }
            }
        }
        self.report.finish_directives = self.terminator.finish_directives;
    }

    /// Invoke a system task from the design
    pub fn invoke(&mut self, task: Task) {
        let result = self.driver.on_task(task);
        self.record_task_result(result);
    }

    fn deliver(&mut self, hook: LifecycleHook) {
        self.report.delivered_events += 1;
        match hook {
            LifecycleHook::OnSimulationStart => {
                if let Err(err) = self.driver.on_start() {
                    tracing::warn!(error = %err, "start event rejected");
                    self.report.rejected_starts += 1;
                }
            }
            LifecycleHook::OnSimulationEnd => {
                let outcome = self.driver.on_end();
                if outcome.finish_requested() {
                    self.terminator.request_finish();
                }
            }
        }
    }

    fn record_task_result(&mut self, result: Result<(), BridgeError>) {
        if let Err(err) = result {
            tracing::error!(error = %err, "run invalidated");
            self.report.aborted = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Backend;
    use crate::lifecycle::{EndOutcome, FinishDirective};
    use uuid::Uuid;

    /// Driver that always asks for a finish, like a bridge without an idle guard
    #[derive(Debug, Default)]
    struct AlwaysFinish {
        ends: usize,
    }

    impl Driver for AlwaysFinish {
        fn on_start(&mut self) -> Result<(), BridgeError> {
            Ok(())
        }

        fn on_end(&mut self) -> EndOutcome {
            self.ends += 1;
            EndOutcome::Released {
                run_id: Uuid::nil(),
                cycles: 0,
                finish: FinishDirective::Issue,
            }
        }

        fn on_task(&mut self, _task: Task) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    #[test]
    fn test_unguarded_driver_trips_loop_detection() {
        let mut host = SimulatedHost::new(AlwaysFinish::default()).finish_refires_end(true);
        let report = host.run(&[HostStep::Compile, HostStep::Start, HostStep::End]);

        assert!(report.termination_loop);
        assert_eq!(host.driver().ends, MAX_REENTRANT_END_EVENTS + 1);
    }

    #[test]
    fn test_guarded_manager_stops_refire_chain() {
        let (host, trace) =
            SimulatedHost::with_recording_model(BridgeConfig::for_backend(Backend::Vcs));
        let mut host = host.finish_refires_end(true);
        let report = host.run(&[HostStep::Compile, HostStep::Start, HostStep::End]);

        assert!(!report.termination_loop);
        assert_eq!(report.finish_directives, 1);
        // start, end, re-fired end
        assert_eq!(report.delivered_events, 3);
        assert_eq!(trace.releases(), 1);
    }

    #[test]
    fn test_no_compile_means_no_lifecycle_events() {
        let (mut host, trace) = SimulatedHost::with_recording_model(BridgeConfig::default());
        let report = host.run(&[HostStep::Start, HostStep::Task(Task::Tick)]);

        assert_eq!(report.delivered_events, 0);
        assert_eq!(
            report.aborted,
            Some(BridgeError::NoActiveModel { task: Task::Tick })
        );
        assert_eq!(trace.allocations(), 0);
    }

    #[test]
    fn test_compile_frees_registration_handles() {
        let (mut host, _trace) = SimulatedHost::with_recording_model(BridgeConfig::default());
        host.compile();

        assert_eq!(host.callbacks().subscriptions().len(), 2);
        assert_eq!(host.callbacks().released_handles(), 2);
    }
}
