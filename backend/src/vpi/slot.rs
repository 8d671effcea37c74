//! Plugin-wide manager slot
//!
//! VPI callbacks carry no context we control, so the manager lives in a
//! thread-local slot. The slot is only borrowed for the duration of a manager
//! call; host directives are issued after the borrow ends, because hosts may
//! re-fire end-of-simulation from inside the finish directive.

use crate::dispatch::Task;
use crate::driver::Driver;
use crate::lifecycle::{BridgeError, EndOutcome, LifecycleManager};
use std::cell::RefCell;

thread_local! {
    static MANAGER: RefCell<Option<LifecycleManager>> = const { RefCell::new(None) };
}

/// Put `manager` in the slot, replacing any previous one
pub fn install(manager: LifecycleManager) {
    MANAGER.with(|slot| *slot.borrow_mut() = Some(manager));
}

/// Take the manager out of the slot
pub fn uninstall() -> Option<LifecycleManager> {
    MANAGER.with(|slot| slot.borrow_mut().take())
}

/// Read the installed manager
pub fn inspect<R>(f: impl FnOnce(&LifecycleManager) -> R) -> Option<R> {
    MANAGER.with(|slot| slot.borrow().as_ref().map(f))
}

fn with_manager<R>(
    f: impl FnOnce(&mut LifecycleManager) -> Result<R, BridgeError>,
) -> Result<R, BridgeError> {
    MANAGER.with(|slot| match slot.borrow_mut().as_mut() {
        Some(manager) => f(manager),
        None => Err(BridgeError::NotInstalled),
    })
}

/// Start-of-simulation callback body
pub fn start_of_simulation() -> Result<(), BridgeError> {
    with_manager(|manager| manager.on_start())
}

/// System task body
pub fn run_task(task: Task) -> Result<(), BridgeError> {
    with_manager(|manager| manager.on_task(task))
}

/// Clock callback body
pub fn clock_edge() -> Result<(), BridgeError> {
    with_manager(|manager| manager.on_clock_callback())
}

/// End-of-simulation callback body
///
/// `finish` runs at most once, after the slot borrow has ended, and only when
/// the manager released a model on a backend that takes the directive.
/// With no manager installed this is a no-op.
pub fn end_of_simulation(finish: impl FnOnce()) -> EndOutcome {
    let outcome = MANAGER
        .with(|slot| slot.borrow_mut().as_mut().map(|manager| manager.on_end()))
        .unwrap_or(EndOutcome::AlreadyIdle);

    if outcome.finish_requested() {
        finish();
    }
    outcome
}
