//! Backend capability configuration
//!
//! Simulators disagree on what happens when a plugin asks the host to finish
//! from inside the end-of-simulation callback. Most hosts stop cleanly. Questa
//! and ModelSim (`vsim`) re-fire the end-of-simulation event and crash on the
//! second finish, so on that backend the directive must be omitted.
//!
//! The choice is a runtime value carried by [`BridgeConfig`], never a
//! compile-time branch, so the lifecycle logic stays backend-agnostic.
//!
//! # Example
//!
//! ```rust
//! use vpi_bridge_core_rs::{Backend, BridgeConfig};
//!
//! let config = BridgeConfig::for_backend(Backend::Vsim);
//! assert!(!config.termination_directive_is_reentrant_safe());
//!
//! let config: BridgeConfig = "vcs".parse::<Backend>().unwrap().into();
//! assert!(config.termination_directive_is_reentrant_safe());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the simulator backend
pub const BACKEND_ENV_VAR: &str = "VPI_BRIDGE_BACKEND";

/// Environment variable overriding the backend's finish-directive default
pub const FINISH_SAFE_ENV_VAR: &str = "VPI_BRIDGE_FINISH_SAFE";

/// Errors raised while loading a [`BridgeConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown simulator backend: '{0}'")]
    UnknownBackend(String),

    #[error("Invalid boolean for {var}: '{value}'")]
    InvalidFlag { var: String, value: String },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Known simulator backends
///
/// Serialized as the canonical snake_case name. Deserialization goes through
/// [`FromStr`], so config files accept the same aliases as the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Backend {
    /// Synopsys VCS
    Vcs,
    /// Questa / ModelSim
    Vsim,
    /// Icarus Verilog
    Icarus,
    /// Verilator with its VPI shim
    Verilator,
    /// Cadence Xcelium
    Xcelium,
    /// Any other VPI-compliant host
    #[default]
    Generic,
}

impl Backend {
    /// Every backend, in display order
    pub const ALL: [Backend; 6] = [
        Backend::Vcs,
        Backend::Vsim,
        Backend::Icarus,
        Backend::Verilator,
        Backend::Xcelium,
        Backend::Generic,
    ];

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Backend::Vcs => "vcs",
            Backend::Vsim => "vsim",
            Backend::Icarus => "icarus",
            Backend::Verilator => "verilator",
            Backend::Xcelium => "xcelium",
            Backend::Generic => "generic",
        }
    }

    /// Whether issuing a finish directive from the end-of-simulation
    /// callback is safe on this backend.
    ///
    /// `vsim` re-fires the end event on finish and segfaults on the second
    /// finish, so it is the only backend where this is `false`.
    pub fn finish_directive_is_reentrant_safe(self) -> bool {
        !matches!(self, Backend::Vsim)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vcs" => Ok(Backend::Vcs),
            "vsim" | "questa" | "modelsim" => Ok(Backend::Vsim),
            "icarus" | "iverilog" => Ok(Backend::Icarus),
            "verilator" => Ok(Backend::Verilator),
            "xcelium" | "xrun" => Ok(Backend::Xcelium),
            "generic" | "" => Ok(Backend::Generic),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Bridge configuration supplied by whatever adapts the bridge to a host
///
/// # Fields
///
/// * `backend` - Simulator the plugin is loaded into
/// * `finish_directive_override` - Forces the finish directive on or off
///   regardless of the backend default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_directive_override: Option<bool>,
}

impl BridgeConfig {
    /// Config for a backend with its default capability
    pub fn for_backend(backend: Backend) -> Self {
        Self {
            backend,
            finish_directive_override: None,
        }
    }

    /// Force the finish directive on (`true`) or off (`false`)
    pub fn with_finish_directive(mut self, safe: bool) -> Self {
        self.finish_directive_override = Some(safe);
        self
    }

    /// Whether the end handler should issue the host finish directive
    pub fn termination_directive_is_reentrant_safe(&self) -> bool {
        self.finish_directive_override
            .unwrap_or_else(|| self.backend.finish_directive_is_reentrant_safe())
    }

    /// Parse a config from a JSON document
    ///
    /// Missing fields fall back to defaults, so `{}` is the generic backend.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Build a config from the process environment
    ///
    /// Reads [`BACKEND_ENV_VAR`] and [`FINISH_SAFE_ENV_VAR`]. Unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup
    ///
    /// # Example
    ///
    /// ```rust
    /// use vpi_bridge_core_rs::{Backend, BridgeConfig};
    ///
    /// let config = BridgeConfig::from_lookup(|var| match var {
    ///     "VPI_BRIDGE_BACKEND" => Some("questa".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.backend, Backend::Vsim);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup(BACKEND_ENV_VAR) {
            Some(value) => value.parse()?,
            None => Backend::default(),
        };

        let finish_directive_override = match lookup(FINISH_SAFE_ENV_VAR) {
            Some(value) => Some(parse_flag(FINISH_SAFE_ENV_VAR, &value)?),
            None => None,
        };

        Ok(Self {
            backend,
            finish_directive_override,
        })
    }
}

impl TryFrom<String> for Backend {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Backend> for BridgeConfig {
    fn from(backend: Backend) -> Self {
        Self::for_backend(backend)
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_vsim_omits_finish() {
        for backend in Backend::ALL {
            assert_eq!(
                backend.finish_directive_is_reentrant_safe(),
                backend != Backend::Vsim,
                "unexpected capability for {}",
                backend
            );
        }
    }

    #[test]
    fn test_parse_flag_rejects_garbage() {
        let err = parse_flag(FINISH_SAFE_ENV_VAR, "maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));
    }
}
