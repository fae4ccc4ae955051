//! Rigid transforms
//!
//! Position + rotation pairs with the handful of frame conversions the arm
//! needs: world/local point conversion and root-relative pose transfer.
//!
//! # Conventions
//!
//! - Right-handed, +Y up
//! - **Forward is +Z**: a rotation's forward axis is `rotation * Vec3::Z`
//! - No scale; anchors and rigs are rigid

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local forward axis.
pub const FORWARD: Vec3 = Vec3::Z;

/// Local up axis.
pub const UP: Vec3 = Vec3::Y;

/// Rotation whose forward axis (+Z) points along `forward`, keeping `up`
/// as close to the local +Y as possible.
///
/// Falls back to another reference axis when `forward` is parallel to `up`,
/// and returns identity for a zero `forward`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(z) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };

    let reference = if z.cross(up).length_squared() > 1e-8 {
        up
    } else if z.cross(Vec3::Y).length_squared() > 1e-8 {
        Vec3::Y
    } else {
        Vec3::Z
    };

    let x = reference.cross(z).normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// A rigid world-space transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World-space position (meters)
    pub position: Vec3,
    /// World-space rotation (unit quaternion)
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Origin, no rotation.
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a transform from position and rotation.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Transform at `position` whose forward axis points along `direction`.
    pub fn looking_along(position: Vec3, direction: Vec3) -> Self {
        Self::new(position, look_rotation(direction, UP))
    }

    /// World-space forward axis.
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    /// World-space up axis.
    pub fn up(&self) -> Vec3 {
        self.rotation * UP
    }

    /// Local point to world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// World point to local space.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Inverse transform (world to local).
    pub fn inverse(&self) -> Transform {
        let inv_rot = self.rotation.inverse();
        Transform::new(inv_rot * -self.position, inv_rot)
    }

    /// Pose of `child` expressed in this transform's local frame.
    pub fn relative_to_self(&self, child: &Transform) -> Transform {
        Transform::new(
            self.inverse_transform_point(child.position),
            self.rotation.inverse() * child.rotation,
        )
    }

    /// Apply a local pose on top of this transform (`self * local`).
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform::new(
            self.transform_point(local.position),
            (self.rotation * local.rotation).normalize(),
        )
    }
}
