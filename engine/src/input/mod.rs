//! Input Module
//!
//! Platform-agnostic trigger handling. Raw device polling is done by the
//! host application; this module only consumes decoded per-tick edges.
//!
//! # Example
//!
//! ```rust,ignore
//! use launch_arm_engine::input::{TriggerEdges, TriggerState, TriggerAction};
//!
//! let mut trigger = TriggerState::new();
//! trigger.update(TriggerEdges::press());
//! if trigger.update(TriggerEdges::release()) == Some(TriggerAction::Fire) {
//!     // launch
//! }
//! ```

pub mod trigger;

pub use trigger::{TriggerAction, TriggerEdges, TriggerPhase, TriggerState};
