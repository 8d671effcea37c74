//! VPI callbacks and system task routines

use super::sys::{
    cbValueChange, s_cb_data, s_vpi_systf_data, vpiFinish, vpiHandle, vpiSysTask, vpi_control,
    vpi_free_object, vpi_register_cb, vpi_register_systf, CbRoutine, TfRoutine, PLI_BYTE8,
    PLI_INT32,
};
use super::slot::{self, install};
use crate::core::BridgeConfig;
use crate::dispatch::Task;
use crate::lifecycle::{BridgeError, LifecycleManager};
use crate::model::ModelFactory;
use crate::registrar::{register_lifecycle_callbacks, CallbackRegistry, LifecycleHook, Subscription};
use std::ffi::CStr;
use std::fmt::Display;
use std::ptr;
use tracing_subscriber::EnvFilter;

/// Plugin startup: logging, config from the environment, task table
pub fn startup<F>(factory: F)
where
    F: ModelFactory + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Another plugin in the same simulator may already own the subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = BridgeConfig::from_env().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "invalid bridge config in environment, using defaults");
        BridgeConfig::default()
    });
    tracing::info!(
        backend = %config.backend,
        finish_directive = config.termination_directive_is_reentrant_safe(),
        "vpi bridge loaded"
    );

    install(LifecycleManager::new(config, factory).without_task_events());
    register_system_tasks();
}

/// Register `$init_rsts`, `$init_ins`, `$init_outs`, `$init_sigs`, `$tick`
pub fn register_system_tasks() {
    for task in Task::ALL {
        let compiletf = task
            .has_compile_hook()
            .then_some(tick_compiletf as TfRoutine);
        let mut data = s_vpi_systf_data {
            type_: vpiSysTask,
            sysfunctype: 0,
            tfname: system_task_cname(task).as_ptr().cast_mut(),
            calltf: Some(calltf_for(task)),
            compiletf,
            sizetf: None,
            user_data: ptr::null_mut(),
        };
        // SAFETY: `data` outlives the call and the name is a static string.
        unsafe {
            vpi_register_systf(&mut data);
        }
    }
}

fn system_task_cname(task: Task) -> &'static CStr {
    match task {
        Task::InitRsts => c"$init_rsts",
        Task::InitIns => c"$init_ins",
        Task::InitOuts => c"$init_outs",
        Task::InitSigs => c"$init_sigs",
        Task::Tick => c"$tick",
    }
}

fn calltf_for(task: Task) -> TfRoutine {
    match task {
        Task::InitRsts => init_rsts_calltf,
        Task::InitIns => init_ins_calltf,
        Task::InitOuts => init_outs_calltf,
        Task::InitSigs => init_sigs_calltf,
        Task::Tick => tick_calltf,
    }
}

/// The run is invalid; there is no way to hand an error back to the host
fn fatal(reason: &dyn Display) -> ! {
    tracing::error!(%reason, "fatal bridge error, aborting simulation");
    std::process::abort()
}

fn run_task(task: Task) -> PLI_INT32 {
    match slot::run_task(task) {
        Ok(()) => 0,
        Err(err) => fatal(&err),
    }
}

pub unsafe extern "C" fn init_rsts_calltf(_user_data: *mut PLI_BYTE8) -> PLI_INT32 {
    run_task(Task::InitRsts)
}

pub unsafe extern "C" fn init_ins_calltf(_user_data: *mut PLI_BYTE8) -> PLI_INT32 {
    run_task(Task::InitIns)
}

pub unsafe extern "C" fn init_outs_calltf(_user_data: *mut PLI_BYTE8) -> PLI_INT32 {
    run_task(Task::InitOuts)
}

pub unsafe extern "C" fn init_sigs_calltf(_user_data: *mut PLI_BYTE8) -> PLI_INT32 {
    run_task(Task::InitSigs)
}

pub unsafe extern "C" fn tick_calltf(_user_data: *mut PLI_BYTE8) -> PLI_INT32 {
    run_task(Task::Tick)
}

/// Compile-time check of `$tick`: subscribe the lifecycle callbacks
pub unsafe extern "C" fn tick_compiletf(_user_data: *mut PLI_BYTE8) -> PLI_INT32 {
    register_lifecycle_callbacks(&mut VpiCallbacks);
    0
}

pub unsafe extern "C" fn sim_start_cb(_cb_data: *mut s_cb_data) -> PLI_INT32 {
    match slot::start_of_simulation() {
        Ok(()) => 0,
        // Already logged by the manager; the live model is kept.
        Err(BridgeError::AlreadyActive { .. }) => 0,
        Err(err) => fatal(&err),
    }
}

pub unsafe extern "C" fn sim_end_cb(_cb_data: *mut s_cb_data) -> PLI_INT32 {
    // Runs after the slot borrow ends; the host may re-enter this callback.
    slot::end_of_simulation(|| {
        vpi_control(vpiFinish, 0 as PLI_INT32);
    });
    0
}

/// Value-change callback that advances one cycle, for designs that clock
/// the model from a callback instead of calling `$tick`.
pub unsafe extern "C" fn tick_cb(_cb_data: *mut s_cb_data) -> PLI_INT32 {
    match slot::clock_edge() {
        Ok(()) => 0,
        Err(err) => fatal(&err),
    }
}

/// Attach [`tick_cb`] to value changes of `clock`
///
/// # Safety
///
/// `clock` must be a valid handle to a net or reg in the running design.
pub unsafe fn register_clock_callback(clock: vpiHandle) -> vpiHandle {
    let mut data = s_cb_data {
        reason: cbValueChange,
        cb_rtn: Some(tick_cb as CbRoutine),
        obj: clock,
        time: ptr::null_mut(),
        value: ptr::null_mut(),
        index: 0,
        user_data: ptr::null_mut(),
    };
    vpi_register_cb(&mut data)
}

/// The host's callback table, seen through the registrar
struct VpiCallbacks;

impl CallbackRegistry for VpiCallbacks {
    type Handle = vpiHandle;

    fn register(&mut self, subscription: Subscription) -> vpiHandle {
        let routine: CbRoutine = match subscription.hook {
            LifecycleHook::OnSimulationStart => sim_start_cb,
            LifecycleHook::OnSimulationEnd => sim_end_cb,
        };
        let mut data = s_cb_data {
            reason: subscription.reason.vpi_code(),
            cb_rtn: Some(routine),
            obj: ptr::null_mut(),
            time: ptr::null_mut(),
            value: ptr::null_mut(),
            index: 0,
            user_data: ptr::null_mut(),
        };
        // SAFETY: the host copies the callback record during registration.
        unsafe { vpi_register_cb(&mut data) }
    }

    fn release_handle(&mut self, handle: vpiHandle) {
        if !handle.is_null() {
            // SAFETY: `handle` was just returned by vpi_register_cb.
            unsafe {
                vpi_free_object(handle);
            }
        }
    }
}
