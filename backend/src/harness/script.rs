//! Host event scripts
//!
//! Scripts are plain JSON so scenarios can be written by hand:
//!
//! ```json
//! {
//!   "config": { "backend": "vsim" },
//!   "finish_refires_end": true,
//!   "steps": [
//!     "compile",
//!     "start",
//!     { "task": "init_sigs" },
//!     { "repeat": { "times": 3, "step": { "task": "tick" } } },
//!     "end"
//!   ]
//! }
//! ```

use crate::core::{BridgeConfig, ConfigError};
use crate::dispatch::Task;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One thing the host does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStep {
    /// Compile-time checks (runs the registrar via `$tick`)
    Compile,
    /// Fire start-of-simulation
    Start,
    /// Fire end-of-simulation
    End,
    /// The design calls a system task
    Task(Task),
    /// A clock callback fires
    Clock,
    /// Run `step` `times` times
    Repeat { times: usize, step: Box<HostStep> },
}

impl HostStep {
    /// Shorthand for `Repeat`
    pub fn repeat(times: usize, step: HostStep) -> Self {
        HostStep::Repeat {
            times,
            step: Box::new(step),
        }
    }
}

/// A complete replay scenario
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostScript {
    #[serde(default)]
    pub config: BridgeConfig,

    #[serde(default)]
    pub finish_refires_end: bool,

    /// Keep a `TaskDispatched` event per task. Off by default; scenarios can
    /// repeat ticks far beyond what the log should hold.
    #[serde(default)]
    pub record_task_events: bool,

    pub steps: Vec<HostStep>,
}

impl HostScript {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Backend;

    #[test]
    fn test_parse_documented_script() {
        let script = HostScript::from_json_str(
            r#"{
                "config": { "backend": "vsim" },
                "finish_refires_end": true,
                "steps": [
                    "compile",
                    "start",
                    { "task": "init_sigs" },
                    { "repeat": { "times": 3, "step": { "task": "tick" } } },
                    "end"
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(script.config.backend, Backend::Vsim);
        assert!(script.finish_refires_end);
        assert!(!script.record_task_events);
        assert_eq!(
            script.steps,
            vec![
                HostStep::Compile,
                HostStep::Start,
                HostStep::Task(Task::InitSigs),
                HostStep::repeat(3, HostStep::Task(Task::Tick)),
                HostStep::End,
            ]
        );
    }

    #[test]
    fn test_steps_are_required() {
        assert!(HostScript::from_json_str("{}").is_err());
    }
}
