//! Game systems: self-contained modules that own state and logic.

pub mod anchor;
pub mod launcher;
pub mod recall_broadcast;
pub mod segment;
pub mod spawner;
pub mod surface_probe;

pub use anchor::{Anchor, AnchorEvent, AnchorId, AnchorState};
pub use launcher::{LaunchOutcome, Launcher, RecallOutcome, TickReport};
pub use recall_broadcast::{RecallBroadcast, SubscriptionId};
pub use segment::PoseSegment;
pub use spawner::{EntityHandle, RecordingSpawner, SpawnRequest, SpawnService, SpawnedEntity};
pub use surface_probe::{SurfaceProbe, SurfaceQuery, SurfaceTarget};
