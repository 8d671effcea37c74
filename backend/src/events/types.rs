//! Bridge event types

use crate::dispatch::Task;
use crate::lifecycle::FinishDirective;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something the bridge did in response to the host
///
/// # Example
///
/// ```rust
/// use vpi_bridge_core_rs::events::BridgeEvent;
///
/// let event = BridgeEvent::RedundantEndIgnored;
/// assert_eq!(event.event_type(), "redundant_end_ignored");
/// assert_eq!(event.run_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Start event received while Idle; a model was created
    SimulationStarted { run_id: Uuid },

    /// Start event received while Active; the live model was kept
    DuplicateStartRejected { run_id: Uuid },

    /// End event received while Active; the model was released
    SimulationEnded {
        run_id: Uuid,
        cycles: u64,
        finish_directive: FinishDirective,
    },

    /// End event received while Idle (re-fired by the host's finish path)
    RedundantEndIgnored,

    /// Task forwarded to the model
    TaskDispatched { run_id: Uuid, task: Task, cycle: u64 },

    /// Task invoked with no live model
    TaskRejected { task: Task },
}

impl BridgeEvent {
    /// Snake-case discriminant, matching the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            BridgeEvent::SimulationStarted { .. } => "simulation_started",
            BridgeEvent::DuplicateStartRejected { .. } => "duplicate_start_rejected",
            BridgeEvent::SimulationEnded { .. } => "simulation_ended",
            BridgeEvent::RedundantEndIgnored => "redundant_end_ignored",
            BridgeEvent::TaskDispatched { .. } => "task_dispatched",
            BridgeEvent::TaskRejected { .. } => "task_rejected",
        }
    }

    /// Run the event belongs to, if it happened inside one
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            BridgeEvent::SimulationStarted { run_id }
            | BridgeEvent::DuplicateStartRejected { run_id }
            | BridgeEvent::SimulationEnded { run_id, .. }
            | BridgeEvent::TaskDispatched { run_id, .. } => Some(*run_id),
            BridgeEvent::RedundantEndIgnored | BridgeEvent::TaskRejected { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tag_matches_event_type() {
        let event = BridgeEvent::TaskDispatched {
            run_id: Uuid::nil(),
            task: Task::InitSigs,
            cycle: 3,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert_eq!(json["task"], "init_sigs");
    }
}
