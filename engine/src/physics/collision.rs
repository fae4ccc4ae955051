//! Collision detection module
//!
//! Ray queries against the static surfaces an anchor can latch onto.
//! Surfaces are axis-aligned boxes or infinite planes, each tagged with a
//! [`SurfaceMask`] layer so a probe can ignore geometry it must not attach to.
//!
//! # Ray-AABB Intersection
//!
//! The slab method is used for ray-AABB intersection, which finds the
//! intersection points by computing entry and exit times for each axis.
//!
//! # Example
//!
//! ```ignore
//! use launch_arm_engine::physics::collision::{SurfaceSet, SurfaceMask};
//! use glam::Vec3;
//!
//! let mut world = SurfaceSet::new();
//! world.add_box(Vec3::new(-5.0, -5.0, 10.0), Vec3::new(5.0, 5.0, 11.0), SurfaceMask::GRAPPLE);
//!
//! if let Some(hit) = world.ray_cast(Vec3::ZERO, Vec3::Z, 100.0, SurfaceMask::GRAPPLE) {
//!     println!("Hit at {:?} facing {:?}", hit.position, hit.normal);
//! }
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Layer bits used to filter which surfaces a ray may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceMask(pub u32);

impl SurfaceMask {
    /// Matches nothing.
    pub const NONE: SurfaceMask = SurfaceMask(0);
    /// Matches every layer.
    pub const ALL: SurfaceMask = SurfaceMask(u32::MAX);
    /// Default layer for generic level geometry.
    pub const DEFAULT: SurfaceMask = SurfaceMask(1);
    /// Layer for surfaces an anchor may attach to.
    pub const GRAPPLE: SurfaceMask = SurfaceMask(1 << 1);

    /// True if the two masks share at least one layer.
    pub fn intersects(self, other: SurfaceMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for SurfaceMask {
    fn default() -> Self {
        SurfaceMask::GRAPPLE
    }
}

impl std::ops::BitOr for SurfaceMask {
    type Output = SurfaceMask;

    fn bitor(self, rhs: SurfaceMask) -> SurfaceMask {
        SurfaceMask(self.0 | rhs.0)
    }
}

/// Index of a surface inside a [`SurfaceSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub usize);

/// Information about a ray-surface collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// World-space position where the collision occurred
    pub position: Vec3,
    /// Surface normal at the hit point (normalized)
    pub normal: Vec3,
    /// Which surface was hit
    pub surface: SurfaceId,
    /// Distance from ray origin to hit point
    pub distance: f32,
}

impl HitInfo {
    /// Creates a new HitInfo with the given parameters.
    pub fn new(position: Vec3, normal: Vec3, surface: SurfaceId, distance: f32) -> Self {
        Self {
            position,
            normal,
            surface,
            distance,
        }
    }
}

/// Entry time, exit time and entry axis of a ray against an AABB's slabs.
fn slab_times(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<(f32, f32, usize)> {
    // Near-zero components get a huge inverse so their slab spans everything
    let inv = |d: f32| if d.abs() > 1e-10 { 1.0 / d } else { f32::MAX * d.signum() };
    let inv_dir = Vec3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z));

    let t1 = (aabb_min - ray_origin) * inv_dir;
    let t2 = (aabb_max - ray_origin) * inv_dir;

    let t_near = t1.min(t2);
    let t_far = t1.max(t2);

    let t_min = t_near.max_element();
    let t_max = t_far.min_element();
    if !(t_max >= t_min && t_max >= 0.0) {
        return None;
    }

    let axis = if t_near.x >= t_near.y && t_near.x >= t_near.z {
        0
    } else if t_near.y >= t_near.z {
        1
    } else {
        2
    };
    Some((t_min, t_max, axis))
}

/// Performs ray-AABB (Axis-Aligned Bounding Box) intersection test using the slab method.
///
/// The slab method works by finding the intersection of the ray with each pair of
/// axis-aligned planes that make up the AABB. If the ray enters and exits the AABB
/// at valid times (t_enter < t_exit and t_exit > 0), there is an intersection.
///
/// # Arguments
///
/// * `ray_origin` - Starting point of the ray
/// * `ray_dir` - Direction of the ray (must be normalized)
/// * `aabb_min` - Minimum corner of the AABB
/// * `aabb_max` - Maximum corner of the AABB
///
/// # Returns
///
/// * `Some(t)` - Distance along the ray to the intersection point (t >= 0)
/// * `None` - No intersection or intersection is behind the ray origin
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    let (t_min, t_max, _) = slab_times(ray_origin, ray_dir, aabb_min, aabb_max)?;
    if t_min >= 0.0 {
        Some(t_min)
    } else {
        // Ray starts inside the AABB
        Some(t_max)
    }
}

/// Ray versus the outside of an AABB: entry distance and the entered face's
/// outward normal.
///
/// The face comes from the slab that bounds the entry time, so flat
/// (zero-thickness) boxes still report the side the ray came from. A ray that
/// starts inside the box does not hit it.
pub fn ray_aabb_entry(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<(f32, Vec3)> {
    let (t_min, _, axis) = slab_times(ray_origin, ray_dir, aabb_min, aabb_max)?;
    if t_min < 0.0 {
        return None;
    }
    let mut normal = Vec3::ZERO;
    normal[axis] = -ray_dir[axis].signum();
    Some((t_min, normal))
}

/// Computes the surface normal for a point on an AABB surface.
///
/// Determines which face of the AABB the point is on and returns the outward normal.
/// A flat axis has no inside, so it reports its positive face; use
/// [`ray_aabb_entry`] when the approach side matters.
pub fn aabb_surface_normal(point: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec3 {
    let center = (aabb_min + aabb_max) * 0.5;
    let half_extents = (aabb_max - aabb_min) * 0.5;
    let offset = point - center;
    let normalized = Vec3::select(
        half_extents.cmpgt(Vec3::ZERO),
        offset / half_extents.max(Vec3::splat(f32::MIN_POSITIVE)),
        offset.signum(),
    );

    // Closest face is the one with the largest normalized coordinate
    let abs_normalized = normalized.abs();

    if abs_normalized.x >= abs_normalized.y && abs_normalized.x >= abs_normalized.z {
        Vec3::new(normalized.x.signum(), 0.0, 0.0)
    } else if abs_normalized.y >= abs_normalized.z {
        Vec3::new(0.0, normalized.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, normalized.z.signum())
    }
}

/// Ray versus infinite plane.
///
/// Planes are one-sided: a ray approaching from behind (moving along the
/// normal) does not hit.
///
/// # Returns
///
/// * `Some(t)` - Distance along the ray to the plane (t >= 0)
/// * `None` - Parallel, back-facing, or behind the origin
pub fn ray_plane_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<f32> {
    let denom = ray_dir.dot(plane_normal);
    if denom > -1e-6 {
        return None;
    }
    let t = (plane_point - ray_origin).dot(plane_normal) / denom;
    (t >= 0.0).then_some(t)
}

/// Geometry a [`SurfaceSet`] can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    /// Axis-aligned box given by its min and max corners
    Box { min: Vec3, max: Vec3 },
    /// One-sided infinite plane
    Plane { point: Vec3, normal: Vec3 },
}

impl Surface {
    /// Distance and outward normal of the first intersection, if any.
    ///
    /// Boxes the ray starts inside are not reported.
    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        match *self {
            Surface::Box { min, max } => ray_aabb_entry(origin, direction, min, max),
            Surface::Plane { point, normal } => {
                ray_plane_intersect(origin, direction, point, normal).map(|t| (t, normal))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SurfaceEntry {
    surface: Surface,
    mask: SurfaceMask,
}

/// A flat collection of layered surfaces supporting closest-hit raycasts.
///
/// Brute-force iteration; the worlds an arm probes are small.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSet {
    surfaces: Vec<SurfaceEntry>,
}

impl SurfaceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an axis-aligned box. Corners are reordered if given swapped.
    pub fn add_box(&mut self, a: Vec3, b: Vec3, mask: SurfaceMask) -> SurfaceId {
        self.push(
            Surface::Box {
                min: a.min(b),
                max: a.max(b),
            },
            mask,
        )
    }

    /// Adds a one-sided plane through `point` facing `normal`.
    pub fn add_plane(&mut self, point: Vec3, normal: Vec3, mask: SurfaceMask) -> SurfaceId {
        self.push(
            Surface::Plane {
                point,
                normal: normal.normalize_or(Vec3::Y),
            },
            mask,
        )
    }

    fn push(&mut self, surface: Surface, mask: SurfaceMask) -> SurfaceId {
        self.surfaces.push(SurfaceEntry { surface, mask });
        SurfaceId(self.surfaces.len() - 1)
    }

    /// Returns the surface registered under `id`.
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id.0).map(|entry| &entry.surface)
    }

    /// Returns the number of surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns true if no surfaces were added.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Casts a ray against every surface whose layer matches `filter` and
    /// returns the closest hit within `max_dist`.
    ///
    /// # Arguments
    ///
    /// * `origin` - Ray starting position
    /// * `direction` - Ray direction (normalized internally; zero never hits)
    /// * `max_dist` - Maximum distance to check for intersections
    /// * `filter` - Only surfaces sharing a layer with this mask are tested
    pub fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_dist: f32,
        filter: SurfaceMask,
    ) -> Option<HitInfo> {
        let direction = direction.try_normalize()?;
        let mut closest: Option<HitInfo> = None;
        let mut closest_dist = max_dist;

        for (index, entry) in self.surfaces.iter().enumerate() {
            if !entry.mask.intersects(filter) {
                continue;
            }
            if let Some((t, normal)) = entry.surface.intersect(origin, direction) {
                if t <= closest_dist && normal.is_finite() {
                    closest = Some(HitInfo::new(
                        origin + direction * t,
                        normal,
                        SurfaceId(index),
                        t,
                    ));
                    closest_dist = t;
                }
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_aabb_from_front() {
        let origin = Vec3::new(0.0, 0.0, -5.0);
        let dir = Vec3::new(0.0, 0.0, 1.0);
        let aabb_min = Vec3::new(-1.0, -1.0, -1.0);
        let aabb_max = Vec3::new(1.0, 1.0, 1.0);

        let t = ray_aabb_intersect(origin, dir, aabb_min, aabb_max).unwrap();
        assert!((t - 4.0).abs() < 0.001, "Expected t=4.0, got t={}", t);
    }

    #[test]
    fn test_ray_misses_aabb() {
        let origin = Vec3::new(0.0, 5.0, -5.0);
        let dir = Vec3::new(0.0, 0.0, 1.0);
        let aabb_min = Vec3::new(-1.0, -1.0, -1.0);
        let aabb_max = Vec3::new(1.0, 1.0, 1.0);

        assert!(ray_aabb_intersect(origin, dir, aabb_min, aabb_max).is_none());
    }

    #[test]
    fn test_ray_starts_inside_aabb() {
        let dir = Vec3::new(0.0, 0.0, 1.0);
        let aabb_min = Vec3::new(-1.0, -1.0, -1.0);
        let aabb_max = Vec3::new(1.0, 1.0, 1.0);

        let t = ray_aabb_intersect(Vec3::ZERO, dir, aabb_min, aabb_max).unwrap();
        // Should hit the exit face at z=1
        assert!((t - 1.0).abs() < 0.001, "Expected t=1.0, got t={}", t);
    }

    #[test]
    fn test_ray_aabb_behind_origin() {
        let origin = Vec3::new(0.0, 0.0, 5.0);
        let dir = Vec3::new(0.0, 0.0, 1.0);

        let result = ray_aabb_intersect(origin, dir, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(result.is_none());
    }

    #[test]
    fn test_surface_normal_faces() {
        let aabb_min = Vec3::new(-1.0, -1.0, -1.0);
        let aabb_max = Vec3::new(1.0, 1.0, 1.0);

        assert_eq!(aabb_surface_normal(Vec3::new(1.0, 0.0, 0.0), aabb_min, aabb_max), Vec3::X);
        assert_eq!(aabb_surface_normal(Vec3::new(0.0, -1.0, 0.0), aabb_min, aabb_max), Vec3::NEG_Y);
        assert_eq!(aabb_surface_normal(Vec3::new(0.2, 0.1, -1.0), aabb_min, aabb_max), Vec3::NEG_Z);
    }

    #[test]
    fn test_surface_normal_on_flat_box_is_finite() {
        let panel_min = Vec3::new(-5.0, -5.0, 10.0);
        let panel_max = Vec3::new(5.0, 5.0, 10.0);

        let normal = aabb_surface_normal(Vec3::new(1.0, 2.0, 10.0), panel_min, panel_max);
        assert_eq!(normal, Vec3::Z);
    }

    #[test]
    fn test_entry_face_comes_from_entering_slab() {
        let aabb_min = Vec3::splat(-1.0);
        let aabb_max = Vec3::splat(1.0);

        let (t, normal) = ray_aabb_entry(Vec3::new(-5.0, 0.2, 0.0), Vec3::X, aabb_min, aabb_max).unwrap();
        assert_eq!(t, 4.0);
        assert_eq!(normal, Vec3::NEG_X);

        let (_, normal) = ray_aabb_entry(Vec3::new(0.0, 5.0, 0.3), Vec3::NEG_Y, aabb_min, aabb_max).unwrap();
        assert_eq!(normal, Vec3::Y);
    }

    #[test]
    fn test_entry_ignores_box_containing_origin() {
        let hit = ray_aabb_entry(Vec3::ZERO, Vec3::Z, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_thin_panel_faces_the_ray_from_either_side() {
        let mut world = SurfaceSet::new();
        world.add_box(Vec3::new(-5.0, -5.0, 10.0), Vec3::new(5.0, 5.0, 10.0), SurfaceMask::GRAPPLE);

        let hit = world.ray_cast(Vec3::ZERO, Vec3::Z, 100.0, SurfaceMask::GRAPPLE).unwrap();
        assert_eq!(hit.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(hit.normal, Vec3::NEG_Z);

        let hit = world
            .ray_cast(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z, 100.0, SurfaceMask::GRAPPLE)
            .unwrap();
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_surface_set_skips_box_around_origin() {
        let mut world = SurfaceSet::new();
        // Operator stands inside a trigger volume; the wall behind it is hit
        world.add_box(Vec3::splat(-2.0), Vec3::splat(2.0), SurfaceMask::GRAPPLE);
        world.add_box(Vec3::new(-5.0, -5.0, 10.0), Vec3::new(5.0, 5.0, 11.0), SurfaceMask::GRAPPLE);

        let hit = world.ray_cast(Vec3::ZERO, Vec3::Z, 100.0, SurfaceMask::GRAPPLE).unwrap();
        assert_eq!(hit.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(hit.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_plane_is_one_sided() {
        let point = Vec3::new(0.0, 0.0, 10.0);
        let normal = Vec3::NEG_Z;

        let t = ray_plane_intersect(Vec3::ZERO, Vec3::Z, point, normal).unwrap();
        assert_eq!(t, 10.0);

        // From behind
        assert!(ray_plane_intersect(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z, point, normal).is_none());
        // Parallel
        assert!(ray_plane_intersect(Vec3::ZERO, Vec3::X, point, normal).is_none());
    }

    #[test]
    fn test_surface_set_closest_hit_wins() {
        let mut world = SurfaceSet::new();
        let far = world.add_box(Vec3::new(-1.0, -1.0, 20.0), Vec3::new(1.0, 1.0, 21.0), SurfaceMask::GRAPPLE);
        let near = world.add_box(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 11.0), SurfaceMask::GRAPPLE);

        let hit = world.ray_cast(Vec3::ZERO, Vec3::Z, 100.0, SurfaceMask::GRAPPLE).unwrap();
        assert_eq!(hit.surface, near);
        assert_ne!(hit.surface, far);
        assert_eq!(hit.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(hit.normal, Vec3::NEG_Z);
        assert_eq!(hit.distance, 10.0);
    }

    #[test]
    fn test_surface_set_respects_mask_and_range() {
        let mut world = SurfaceSet::new();
        world.add_box(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 6.0), SurfaceMask::DEFAULT);
        world.add_plane(Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z, SurfaceMask::GRAPPLE);

        // The default-layer box is skipped, the plane is hit
        let hit = world.ray_cast(Vec3::ZERO, Vec3::Z, 100.0, SurfaceMask::GRAPPLE).unwrap();
        assert_eq!(hit.position, Vec3::new(0.0, 0.0, 50.0));

        // Plane is out of range
        assert!(world.ray_cast(Vec3::ZERO, Vec3::Z, 40.0, SurfaceMask::GRAPPLE).is_none());

        // Both layers: box is closer
        let hit = world
            .ray_cast(Vec3::ZERO, Vec3::Z, 100.0, SurfaceMask::GRAPPLE | SurfaceMask::DEFAULT)
            .unwrap();
        assert_eq!(hit.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_zero_direction_never_hits() {
        let mut world = SurfaceSet::new();
        world.add_plane(Vec3::ZERO, Vec3::Y, SurfaceMask::ALL);
        assert!(world.ray_cast(Vec3::Y, Vec3::ZERO, 100.0, SurfaceMask::ALL).is_none());
    }

    #[test]
    fn test_hit_info_new() {
        let hit = HitInfo::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, SurfaceId(4), 5.0);
        assert_eq!(hit.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(hit.normal, Vec3::Y);
        assert_eq!(hit.surface, SurfaceId(4));
        assert_eq!(hit.distance, 5.0);
    }
}
