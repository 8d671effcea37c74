//! Lifecycle callback manager
//!
//! Owns the one model instance of a simulation run. The host's
//! start-of-simulation event creates it, the end-of-simulation event releases
//! it, and every task in between reaches it through the
//! [`SimulationContext`].
//!
//! # State Machine
//!
//! ```text
//!            start                     end
//!   Idle ───────────▶ Active ───────────────────▶ Idle
//!    │                  │                           + finish directive
//!    │ end (no-op)      │ start (rejected,          (unless the backend
//!    ▼                  ▼  model kept)               re-fires end on finish)
//!   Idle              Active
//! ```
//!
//! # Critical Invariants
//!
//! 1. At most one model is alive at any time
//! 2. Every allocated model is released exactly once
//! 3. An end event while Idle never releases and never issues a directive

pub mod context;
pub mod error;
pub mod manager;

pub use context::SimulationContext;
pub use error::BridgeError;
pub use manager::{EndOutcome, FinishDirective, LifecycleManager, LifecycleState};
