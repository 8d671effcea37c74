//! Lifecycle manager implementation

use super::{BridgeError, SimulationContext};
use crate::core::BridgeConfig;
use crate::dispatch::{dispatch, Task};
use crate::driver::{Driver, HostControl};
use crate::events::{BridgeEvent, EventLog};
use crate::model::ModelFactory;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Whether a model instance is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Active,
}

/// What the adapter must do with the host after an end event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishDirective {
    /// Ask the host to finish
    Issue,
    /// Do nothing; the host is already finishing and would re-fire end
    Omit,
}

/// Result of handling an end-of-simulation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    /// The model was released
    Released {
        run_id: Uuid,
        cycles: u64,
        finish: FinishDirective,
    },
    /// Nothing was live; nothing was done
    AlreadyIdle,
}

impl EndOutcome {
    /// Whether the adapter must send the host a finish directive
    pub fn finish_requested(&self) -> bool {
        matches!(
            self,
            EndOutcome::Released {
                finish: FinishDirective::Issue,
                ..
            }
        )
    }

    pub fn released(&self) -> bool {
        matches!(self, EndOutcome::Released { .. })
    }
}

/// Owner of the per-run [`SimulationContext`]
///
/// # Example
///
/// ```rust
/// use vpi_bridge_core_rs::{Backend, BridgeConfig, Driver, LifecycleManager, LifecycleState, Task};
/// use vpi_bridge_core_rs::model::CallTrace;
///
/// let trace = CallTrace::new();
/// let mut manager = LifecycleManager::new(BridgeConfig::for_backend(Backend::Vcs), trace.factory());
///
/// manager.on_start().unwrap();
/// manager.on_task(Task::Tick).unwrap();
/// assert_eq!(manager.state(), LifecycleState::Active);
///
/// let outcome = manager.on_end();
/// assert!(outcome.finish_requested());
/// assert_eq!(trace.releases(), 1);
/// ```
pub struct LifecycleManager {
    config: BridgeConfig,
    factory: Box<dyn ModelFactory>,
    context: Option<SimulationContext>,
    event_log: EventLog,
    log_task_events: bool,
    allocations: usize,
    releases: usize,
    finish_directives: usize,
}

impl LifecycleManager {
    /// Create an Idle manager
    pub fn new<F>(config: BridgeConfig, factory: F) -> Self
    where
        F: ModelFactory + 'static,
    {
        Self {
            config,
            factory: Box::new(factory),
            context: None,
            event_log: EventLog::new(),
            log_task_events: true,
            allocations: 0,
            releases: 0,
            finish_directives: 0,
        }
    }

    /// Stop recording a [`BridgeEvent::TaskDispatched`] per task.
    ///
    /// Long runs tick millions of times; lifecycle events are still logged.
    pub fn without_task_events(mut self) -> Self {
        self.log_task_events = false;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        if self.context.is_some() {
            LifecycleState::Active
        } else {
            LifecycleState::Idle
        }
    }

    /// Live context, if Active
    pub fn context(&self) -> Option<&SimulationContext> {
        self.context.as_ref()
    }

    /// Live context, if Active
    pub fn context_mut(&mut self) -> Option<&mut SimulationContext> {
        self.context.as_mut()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Models created so far
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Models released so far
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// End events that asked for a finish directive
    pub fn finish_directives(&self) -> usize {
        self.finish_directives
    }

    /// Handle an end event and apply the finish directive to `host`
    ///
    /// Only safe when `host` does not re-enter this manager synchronously.
    /// Adapters for hosts that do should call [`Driver::on_end`] and issue
    /// the directive once the manager is no longer borrowed.
    pub fn on_simulation_end<H>(&mut self, host: &mut H) -> EndOutcome
    where
        H: HostControl + ?Sized,
    {
        let outcome = self.on_end();
        if outcome.finish_requested() {
            host.request_finish();
        }
        outcome
    }
}

impl Driver for LifecycleManager {
    fn on_start(&mut self) -> Result<(), BridgeError> {
        if let Some(ctx) = &self.context {
            let run_id = ctx.run_id();
            tracing::warn!(%run_id, "start of simulation while a run is active, keeping the live model");
            self.event_log
                .log(BridgeEvent::DuplicateStartRejected { run_id });
            return Err(BridgeError::AlreadyActive { run_id });
        }

        let ctx = SimulationContext::new(self.factory.create());
        let run_id = ctx.run_id();
        self.context = Some(ctx);
        self.allocations += 1;

        tracing::info!(%run_id, backend = %self.config.backend, "simulation started");
        self.event_log.log(BridgeEvent::SimulationStarted { run_id });
        Ok(())
    }

    fn on_end(&mut self) -> EndOutcome {
        let Some(ctx) = self.context.take() else {
            tracing::debug!("end of simulation while idle, ignoring");
            self.event_log.log(BridgeEvent::RedundantEndIgnored);
            return EndOutcome::AlreadyIdle;
        };

        let run_id = ctx.run_id();
        let cycles = ctx.cycles();
        drop(ctx);
        self.releases += 1;

        let finish = if self.config.termination_directive_is_reentrant_safe() {
            self.finish_directives += 1;
            FinishDirective::Issue
        } else {
            FinishDirective::Omit
        };

        tracing::info!(%run_id, cycles, ?finish, "simulation ended");
        self.event_log.log(BridgeEvent::SimulationEnded {
            run_id,
            cycles,
            finish_directive: finish,
        });

        EndOutcome::Released {
            run_id,
            cycles,
            finish,
        }
    }

    fn on_task(&mut self, task: Task) -> Result<(), BridgeError> {
        let Some(ctx) = self.context.as_mut() else {
            tracing::error!(%task, "task invoked before start of simulation");
            self.event_log.log(BridgeEvent::TaskRejected { task });
            return Err(BridgeError::NoActiveModel { task });
        };

        dispatch(task, ctx);

        if self.log_task_events {
            let event = BridgeEvent::TaskDispatched {
                run_id: ctx.run_id(),
                task,
                cycle: ctx.cycles(),
            };
            self.event_log.log(event);
        }
        Ok(())
    }
}

impl fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("config", &self.config)
            .field("context", &self.context)
            .field("allocations", &self.allocations)
            .field("releases", &self.releases)
            .field("finish_directives", &self.finish_directives)
            .finish_non_exhaustive()
    }
}
