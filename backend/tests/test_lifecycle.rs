//! Tests for the lifecycle state machine
//!
//! Critical invariants tested:
//! - Allocations equal releases over a run
//! - End while idle never releases and never issues a finish directive
//! - The finish directive follows the backend capability

use vpi_bridge_core_rs::model::{CallTrace, ModelCall, SimModel};
use vpi_bridge_core_rs::{
    Backend, BridgeConfig, BridgeError, BridgeEvent, Driver, EndOutcome, FinishDirective,
    LifecycleManager, LifecycleState, Task,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_manager(backend: Backend) -> (LifecycleManager, CallTrace) {
    let trace = CallTrace::new();
    let manager = LifecycleManager::new(BridgeConfig::for_backend(backend), trace.factory());
    (manager, trace)
}

// ============================================================================
// Start / End
// ============================================================================

#[test]
fn test_start_allocates_once() {
    let (mut manager, trace) = create_manager(Backend::Vcs);

    manager.on_start().unwrap();

    assert_eq!(manager.state(), LifecycleState::Active);
    assert_eq!(manager.allocations(), 1);
    assert_eq!(trace.allocations(), 1);
    assert_eq!(trace.live(), 1);
    assert_eq!(manager.context().unwrap().cycles(), 0);
}

#[test]
fn test_end_releases_and_issues_finish() {
    let (mut manager, trace) = create_manager(Backend::Vcs);
    manager.on_start().unwrap();
    let run_id = manager.context().unwrap().run_id();

    let outcome = manager.on_end();

    assert_eq!(
        outcome,
        EndOutcome::Released {
            run_id,
            cycles: 0,
            finish: FinishDirective::Issue,
        }
    );
    assert_eq!(manager.state(), LifecycleState::Idle);
    assert_eq!(trace.releases(), 1);
    assert_eq!(manager.finish_directives(), 1);
}

#[test]
fn test_end_on_vsim_omits_finish() {
    let (mut manager, trace) = create_manager(Backend::Vsim);
    manager.on_start().unwrap();

    let outcome = manager.on_end();

    assert!(outcome.released());
    assert!(!outcome.finish_requested());
    assert_eq!(manager.finish_directives(), 0);
    assert_eq!(trace.releases(), 1);
}

#[test]
fn test_double_end_releases_once() {
    for backend in [Backend::Vcs, Backend::Vsim] {
        let (mut manager, trace) = create_manager(backend);
        manager.on_start().unwrap();

        let first = manager.on_end();
        let second = manager.on_end();

        assert!(first.released());
        assert_eq!(second, EndOutcome::AlreadyIdle);
        assert!(!second.finish_requested());
        assert_eq!(trace.allocations(), 1);
        assert_eq!(trace.releases(), 1);
        assert_eq!(manager.releases(), 1);
    }
}

#[test]
fn test_finish_issued_once_per_active_end() {
    let (mut manager, _trace) = create_manager(Backend::Icarus);

    for _ in 0..3 {
        manager.on_start().unwrap();
        manager.on_end();
        manager.on_end();
    }

    assert_eq!(manager.finish_directives(), 3);
    assert_eq!(manager.allocations(), 3);
    assert_eq!(manager.releases(), 3);
}

#[test]
fn test_restart_after_end_gets_new_run() {
    let (mut manager, trace) = create_manager(Backend::Generic);
    manager.on_start().unwrap();
    let first = manager.context().unwrap().run_id();
    manager.on_end();

    manager.on_start().unwrap();
    let second = manager.context().unwrap().run_id();

    assert_ne!(first, second);
    assert_eq!(trace.allocations(), 2);
    assert_eq!(trace.live(), 1);
}

#[test]
fn test_duplicate_start_rejected_without_leak() {
    let (mut manager, trace) = create_manager(Backend::Generic);
    manager.on_start().unwrap();
    let run_id = manager.context().unwrap().run_id();

    assert_eq!(
        manager.on_start(),
        Err(BridgeError::AlreadyActive { run_id })
    );

    manager.on_end();
    assert_eq!(trace.allocations(), 1);
    assert_eq!(trace.releases(), 1);
    assert_eq!(
        manager
            .event_log()
            .events_of_type("duplicate_start_rejected")
            .len(),
        1
    );
}

// ============================================================================
// Tasks and the context
// ============================================================================

#[test]
fn test_task_before_start_is_rejected() {
    let (mut manager, trace) = create_manager(Backend::Generic);

    let err = manager.on_task(Task::InitRsts).unwrap_err();

    assert_eq!(err, BridgeError::NoActiveModel { task: Task::InitRsts });
    assert!(trace.calls().is_empty());
    assert_eq!(
        manager.event_log().events(),
        &[BridgeEvent::TaskRejected { task: Task::InitRsts }]
    );
}

#[test]
fn test_task_after_end_is_rejected() {
    let (mut manager, trace) = create_manager(Backend::Generic);
    manager.on_start().unwrap();
    manager.on_end();

    assert!(manager.on_task(Task::Tick).is_err());
    assert!(trace.calls().is_empty());
}

#[test]
fn test_cycles_reported_at_end() {
    let (mut manager, _trace) = create_manager(Backend::Vsim);
    manager.on_start().unwrap();
    for _ in 0..5 {
        manager.on_task(Task::Tick).unwrap();
    }
    manager.on_task(Task::InitOuts).unwrap();

    match manager.on_end() {
        EndOutcome::Released { cycles, finish, .. } => {
            assert_eq!(cycles, 5);
            assert_eq!(finish, FinishDirective::Omit);
        }
        EndOutcome::AlreadyIdle => panic!("expected a release"),
    }
}

#[test]
fn test_event_log_records_run() {
    let (mut manager, _trace) = create_manager(Backend::Vcs);
    manager.on_start().unwrap();
    let run_id = manager.context().unwrap().run_id();
    manager.on_task(Task::InitSigs).unwrap();
    manager.on_task(Task::Tick).unwrap();
    manager.on_end();
    manager.on_end();

    let log = manager.event_log();
    assert_eq!(
        log.events(),
        &[
            BridgeEvent::SimulationStarted { run_id },
            BridgeEvent::TaskDispatched {
                run_id,
                task: Task::InitSigs,
                cycle: 0,
            },
            BridgeEvent::TaskDispatched {
                run_id,
                task: Task::Tick,
                cycle: 1,
            },
            BridgeEvent::SimulationEnded {
                run_id,
                cycles: 1,
                finish_directive: FinishDirective::Issue,
            },
            BridgeEvent::RedundantEndIgnored,
        ]
    );
    assert_eq!(log.events_for_run(run_id).len(), 4);
}

#[test]
fn test_last_run_covers_only_latest_run() {
    let (manager, _trace) = create_manager(Backend::Vsim);
    let mut manager = manager.without_task_events();

    manager.on_start().unwrap();
    let first = manager.context().unwrap().run_id();
    manager.on_end();
    manager.on_start().unwrap();
    let second = manager.context().unwrap().run_id();
    manager.on_task(Task::Tick).unwrap();
    manager.on_end();
    manager.on_end();

    let log = manager.event_log();
    assert_ne!(first, second);
    assert_eq!(log.run_ids(), vec![first, second]);
    assert_eq!(log.redundant_ends(), 1);
    assert_eq!(
        log.last_run(),
        &[
            BridgeEvent::SimulationStarted { run_id: second },
            BridgeEvent::SimulationEnded {
                run_id: second,
                cycles: 1,
                finish_directive: FinishDirective::Omit,
            },
            BridgeEvent::RedundantEndIgnored,
        ]
    );
}

#[test]
fn test_context_mut_reaches_model() {
    let (mut manager, trace) = create_manager(Backend::Generic);
    assert!(manager.context_mut().is_none());

    manager.on_start().unwrap();
    manager.context_mut().unwrap().model_mut().init_inputs();

    assert_eq!(trace.calls(), vec![ModelCall::Inputs]);
}
