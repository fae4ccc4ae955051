//! Game Module
//!
//! The launch arm itself: configuration, the operator rig binding, and the
//! launcher / anchor systems built on top of the engine's physics and input.

pub mod config;
pub mod error;
pub mod rig;
pub mod systems;

pub use config::{ConfigError, LaunchArmConfig};
pub use error::LaunchArmError;
pub use rig::{NodeId, ReferenceRig, RigError, TransformStore, mirror_pose};
pub use systems::{
    Anchor, AnchorEvent, AnchorId, AnchorState, LaunchOutcome, Launcher, RecallBroadcast,
    RecallOutcome, RecordingSpawner, SpawnService, SurfaceProbe, SurfaceQuery, SurfaceTarget,
    TickReport,
};
