//! Property tests over random host event sequences
//!
//! Whatever order the host fires events in, the bridge must never leak or
//! double-release a model, and must issue at most one finish directive per
//! released model (none on backends that re-fire the end event).

use proptest::prelude::*;
use vpi_bridge_core_rs::harness::{HostStep, SimulatedHost};
use vpi_bridge_core_rs::model::ModelCall;
use vpi_bridge_core_rs::{Backend, BridgeConfig, LifecycleState, Task};

fn lifecycle_step() -> impl Strategy<Value = HostStep> {
    prop_oneof![
        Just(HostStep::Start),
        Just(HostStep::End),
        Just(HostStep::Task(Task::InitRsts)),
        Just(HostStep::Task(Task::InitIns)),
        Just(HostStep::Task(Task::InitOuts)),
        Just(HostStep::Task(Task::InitSigs)),
        Just(HostStep::Task(Task::Tick)),
        Just(HostStep::Clock),
    ]
}

fn backend() -> impl Strategy<Value = Backend> {
    prop::sample::select(Backend::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_models_never_leak_or_double_release(
        backend in backend(),
        refires in any::<bool>(),
        steps in prop::collection::vec(lifecycle_step(), 0..40),
    ) {
        let (host, trace) = SimulatedHost::with_recording_model(BridgeConfig::for_backend(backend));
        let mut host = host.finish_refires_end(refires);

        let mut all = vec![HostStep::Compile];
        all.extend(steps);
        let report = host.run(&all);
        // Always close the run out
        host.step(&HostStep::End);

        prop_assert!(!report.termination_loop);
        prop_assert_eq!(trace.allocations(), trace.releases());
        prop_assert_eq!(trace.live(), 0);
        prop_assert_eq!(host.driver().state(), LifecycleState::Idle);

        let directives = host.report().finish_directives;
        if backend.finish_directive_is_reentrant_safe() {
            prop_assert_eq!(directives, trace.releases());
        } else {
            prop_assert_eq!(directives, 0);
        }
    }

    #[test]
    fn prop_init_sigs_always_pairs_signals_with_channels(
        steps in prop::collection::vec(lifecycle_step(), 0..40),
    ) {
        let (mut host, trace) = SimulatedHost::with_recording_model(BridgeConfig::default());
        host.step(&HostStep::Compile);
        host.step(&HostStep::Start);
        host.run(&steps);

        let calls = trace.calls();
        for (i, call) in calls.iter().enumerate() {
            if *call == ModelCall::Signals {
                prop_assert_eq!(calls.get(i + 1), Some(&ModelCall::Channels));
            }
            if *call == ModelCall::Channels {
                prop_assert!(i > 0 && calls[i - 1] == ModelCall::Signals);
            }
        }
    }
}
