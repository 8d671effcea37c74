//! `vpi_user.h` subset
//!
//! Only the types, constants and functions the bridge touches. The
//! functions are resolved from the host simulator when the plugin loads.
//! Lifecycle callback reasons come from
//! [`CallbackReason::vpi_code`](crate::registrar::CallbackReason::vpi_code).

#![allow(non_camel_case_types, non_upper_case_globals)]

use std::ffi::{c_char, c_void};

pub type PLI_INT32 = i32;
pub type PLI_BYTE8 = c_char;
pub type vpiHandle = *mut c_void;

pub const vpiSysTask: PLI_INT32 = 1;
pub const vpiFinish: PLI_INT32 = 67;

pub const cbValueChange: PLI_INT32 = 1;

pub type CbRoutine = unsafe extern "C" fn(*mut s_cb_data) -> PLI_INT32;
pub type TfRoutine = unsafe extern "C" fn(*mut PLI_BYTE8) -> PLI_INT32;

#[repr(C)]
pub struct s_cb_data {
    pub reason: PLI_INT32,
    pub cb_rtn: Option<CbRoutine>,
    pub obj: vpiHandle,
    pub time: *mut c_void,
    pub value: *mut c_void,
    pub index: PLI_INT32,
    pub user_data: *mut PLI_BYTE8,
}

#[repr(C)]
pub struct s_vpi_systf_data {
    pub type_: PLI_INT32,
    pub sysfunctype: PLI_INT32,
    pub tfname: *mut PLI_BYTE8,
    pub calltf: Option<TfRoutine>,
    pub compiletf: Option<TfRoutine>,
    pub sizetf: Option<TfRoutine>,
    pub user_data: *mut PLI_BYTE8,
}

extern "C" {
    pub fn vpi_register_cb(cb_data_p: *mut s_cb_data) -> vpiHandle;
    pub fn vpi_register_systf(systf_data_p: *mut s_vpi_systf_data) -> vpiHandle;
    pub fn vpi_free_object(object: vpiHandle) -> PLI_INT32;
    pub fn vpi_control(operation: PLI_INT32, ...) -> PLI_INT32;
}
