//! Core configuration for the bridge

pub mod config;

pub use config::{Backend, BridgeConfig, ConfigError};
