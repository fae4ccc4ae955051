//! Physics module for the launch arm
//!
//! Spatial queries and rigid transforms. No physics engine dependency: the
//! arm only needs ray casts against static surfaces and frame conversions.
//!
//! # Unit System
//!
//! **1 unit = 1 meter**, rotations as unit quaternions.
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types (Vec3, Quat) re-exported from glam
//! - [`transform`] - Rigid transforms, look rotations, relative poses
//! - [`collision`] - Ray-AABB / ray-plane queries over layered surfaces

pub mod collision;
pub mod transform;
pub mod types;

// Re-export commonly used types at the physics module level
pub use collision::{
    HitInfo, Surface, SurfaceId, SurfaceMask, SurfaceSet, aabb_surface_normal,
    ray_aabb_entry, ray_aabb_intersect, ray_plane_intersect,
};
pub use transform::{FORWARD, Transform, UP, look_rotation};
pub use types::{Quat, Vec3};
