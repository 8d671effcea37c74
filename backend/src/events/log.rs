//! In-memory event log

use super::BridgeEvent;
use uuid::Uuid;

/// Ordered record of [`BridgeEvent`]s
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<BridgeEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: BridgeEvent) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[BridgeEvent] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&BridgeEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events recorded inside a specific run
    pub fn events_for_run(&self, run_id: Uuid) -> Vec<&BridgeEvent> {
        self.events
            .iter()
            .filter(|e| e.run_id() == Some(run_id))
            .collect()
    }

    /// Run ids in the order the runs started
    pub fn run_ids(&self) -> Vec<Uuid> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BridgeEvent::SimulationStarted { run_id } => Some(*run_id),
                _ => None,
            })
            .collect()
    }

    /// Events from the most recent start of simulation onward
    ///
    /// Includes what the bridge logged after that run ended, such as ignored
    /// end-of-simulation callbacks. Empty if no run ever started.
    pub fn last_run(&self) -> &[BridgeEvent] {
        let start = self
            .events
            .iter()
            .rposition(|e| matches!(e, BridgeEvent::SimulationStarted { .. }));
        match start {
            Some(index) => &self.events[index..],
            None => &[],
        }
    }

    /// End-of-simulation callbacks that arrived with nothing to release
    pub fn redundant_ends(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BridgeEvent::RedundantEndIgnored))
            .count()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Task;
    use crate::lifecycle::FinishDirective;

    #[test]
    fn test_filters() {
        let run = Uuid::new_v4();
        let mut log = EventLog::new();
        log.log(BridgeEvent::SimulationStarted { run_id: run });
        log.log(BridgeEvent::RedundantEndIgnored);
        log.log(BridgeEvent::RedundantEndIgnored);

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_of_type("redundant_end_ignored").len(), 2);
        assert_eq!(log.events_for_run(run).len(), 1);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_last_run() {
        let mut log = EventLog::new();
        assert!(log.last_run().is_empty());

        log.log(BridgeEvent::RedundantEndIgnored);
        assert!(log.last_run().is_empty());

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        log.log(BridgeEvent::SimulationStarted { run_id: first });
        log.log(BridgeEvent::SimulationEnded {
            run_id: first,
            cycles: 2,
            finish_directive: FinishDirective::Issue,
        });
        log.log(BridgeEvent::SimulationStarted { run_id: second });
        log.log(BridgeEvent::TaskRejected { task: Task::Tick });
        log.log(BridgeEvent::RedundantEndIgnored);

        assert_eq!(log.run_ids(), vec![first, second]);
        assert_eq!(log.redundant_ends(), 2);
        assert_eq!(
            log.last_run(),
            &[
                BridgeEvent::SimulationStarted { run_id: second },
                BridgeEvent::TaskRejected { task: Task::Tick },
                BridgeEvent::RedundantEndIgnored,
            ]
        );
    }
}
