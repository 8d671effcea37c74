//! FFI module for Python integration
//!
//! Exposes the simulated host so Python testbenches can replay lifecycle
//! sequences against the bridge and inspect what the model saw.

pub mod harness;
