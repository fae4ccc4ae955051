//! Launch Arm Engine Library
//!
//! A launchable anchor arm: the operator fires an anchor at a surface, the
//! anchor flies there and aligns to the surface normal, mirrors the
//! operator's hand gesture while attached, and flies back on recall.
//!
//! # Modules
//!
//! - [`physics`] - Transforms and ray queries against layered surfaces
//! - [`input`] - Press-to-aim / release-to-fire trigger edges
//! - [`game`] - Launcher, anchor state machine, rig binding, configuration
//!
//! # Example
//!
//! ```ignore
//! use launch_arm_engine::game::{LaunchArmConfig, Launcher, RecordingSpawner, TransformStore};
//! use launch_arm_engine::input::TriggerEdges;
//! use launch_arm_engine::physics::{SurfaceMask, SurfaceSet, Transform};
//! use glam::Vec3;
//!
//! let mut world = SurfaceSet::new();
//! world.add_plane(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, SurfaceMask::GRAPPLE);
//!
//! let mut scene = TransformStore::new();
//! scene.insert("operator_root", Transform::IDENTITY);
//! scene.insert("operator_hand", Transform::from_position(Vec3::new(0.3, 1.2, 0.4)));
//!
//! let config = LaunchArmConfig::default();
//! let mut launcher = Launcher::new(config, &scene, RecordingSpawner::default())?;
//!
//! let aim = Transform::looking_along(Vec3::ZERO, Vec3::Z);
//! launcher.tick(1.0 / 60.0, aim, TriggerEdges::tap(), &world, &scene);
//! ```

pub mod input;
pub mod physics;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export commonly used physics types
pub use physics::{HitInfo, SurfaceMask, SurfaceSet, Transform};
// Re-export commonly used input types
pub use input::{TriggerEdges, TriggerState};
