//! Raw VPI plugin
//!
//! Entry points a Verilog simulator calls when this crate is loaded as a
//! VPI shared object. A downstream `cdylib` supplies the model and exports
//! the startup table:
//!
//! ```rust,ignore
//! use vpi_bridge_core_rs::model::SimModel;
//!
//! vpi_bridge_core_rs::export_vpi_bridge!(|| Box::new(MyModel::default()) as Box<dyn SimModel>);
//! ```
//!
//! The manager lives in a thread-local slot: every VPI callback runs on the
//! simulator's own thread.

pub mod entry;
pub mod slot;
pub mod sys;

pub use entry::{
    init_ins_calltf, init_outs_calltf, init_rsts_calltf, init_sigs_calltf,
    register_clock_callback, register_system_tasks, sim_end_cb, sim_start_cb, startup, tick_calltf, tick_cb,
    tick_compiletf,
};
pub use slot::{end_of_simulation, install, start_of_simulation, uninstall};

/// Export `vlog_startup_routines` for a model factory
#[macro_export]
macro_rules! export_vpi_bridge {
    ($factory:expr) => {
        #[allow(non_upper_case_globals)]
        #[no_mangle]
        pub static vlog_startup_routines: [Option<extern "C" fn()>; 2] =
            [Some(__vpi_bridge_startup), None];

        extern "C" fn __vpi_bridge_startup() {
            $crate::vpi::startup($factory);
        }
    };
}
