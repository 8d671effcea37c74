//! Task dispatch
//!
//! The simulated design calls five system tasks. Each one forwards to the
//! model held by the current [`SimulationContext`]:
//!
//! | Task        | Model operations                         |
//! |-------------|------------------------------------------|
//! | `init_rsts` | `init_registers`                         |
//! | `init_ins`  | `init_inputs`                            |
//! | `init_outs` | `init_outputs`                           |
//! | `init_sigs` | `init_signals`, then `init_channels`     |
//! | `tick`      | `advance_one_cycle`                      |
//!
//! Ordering across tasks is up to the design; the only ordering the bridge
//! enforces is signals before channels inside `init_sigs`.

use crate::lifecycle::{BridgeError, SimulationContext};
use crate::model::ModelCall;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five system tasks the design can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    InitRsts,
    InitIns,
    InitOuts,
    InitSigs,
    Tick,
}

impl Task {
    /// All tasks in registration order
    pub const ALL: [Task; 5] = [
        Task::InitRsts,
        Task::InitIns,
        Task::InitOuts,
        Task::InitSigs,
        Task::Tick,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Task::InitRsts => "init_rsts",
            Task::InitIns => "init_ins",
            Task::InitOuts => "init_outs",
            Task::InitSigs => "init_sigs",
            Task::Tick => "tick",
        }
    }

    /// Name as written in the design (`$tick`, ...)
    pub fn system_task_name(self) -> &'static str {
        match self {
            Task::InitRsts => "$init_rsts",
            Task::InitIns => "$init_ins",
            Task::InitOuts => "$init_outs",
            Task::InitSigs => "$init_sigs",
            Task::Tick => "$tick",
        }
    }

    /// Model operations this task forwards to, in call order
    pub fn model_calls(self) -> &'static [ModelCall] {
        match self {
            Task::InitRsts => &[ModelCall::Registers],
            Task::InitIns => &[ModelCall::Inputs],
            Task::InitOuts => &[ModelCall::Outputs],
            Task::InitSigs => &[ModelCall::Signals, ModelCall::Channels],
            Task::Tick => &[ModelCall::Cycle],
        }
    }

    /// Whether the host runs a compile-time check for this task.
    ///
    /// `tick` is the anchor for lifecycle registration; any task checked
    /// exactly once at compile time would do.
    pub fn has_compile_hook(self) -> bool {
        matches!(self, Task::Tick)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix('$').unwrap_or(s);
        Task::ALL
            .into_iter()
            .find(|task| task.name() == bare)
            .ok_or_else(|| BridgeError::UnknownTask(s.to_string()))
    }
}

/// Forward a task to the live model
///
/// `tick` also advances the context's cycle counter.
pub fn dispatch(task: Task, ctx: &mut SimulationContext) {
    for call in task.model_calls() {
        call.apply(ctx.model_mut());
    }
    if task == Task::Tick {
        ctx.record_cycle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_spellings() {
        assert_eq!("tick".parse::<Task>().unwrap(), Task::Tick);
        assert_eq!("$init_sigs".parse::<Task>().unwrap(), Task::InitSigs);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "$finish".parse::<Task>().unwrap_err();
        assert!(matches!(err, BridgeError::UnknownTask(name) if name == "$finish"));
    }

    #[test]
    fn test_signals_precede_channels() {
        assert_eq!(
            Task::InitSigs.model_calls(),
            &[ModelCall::Signals, ModelCall::Channels]
        );
    }

    #[test]
    fn test_only_tick_has_compile_hook() {
        let hooked: Vec<Task> = Task::ALL.into_iter().filter(|t| t.has_compile_hook()).collect();
        assert_eq!(hooked, vec![Task::Tick]);
    }
}
