//! Surface probe.
//!
//! Casts the launcher's forward ray against attachable geometry. A miss is a
//! normal outcome (the operator is pointing at open air) and is simply
//! reported as `None`; the caller probes again next tick.

use glam::Vec3;

use crate::game::config::ProbeConfig;
use crate::physics::{HitInfo, SurfaceMask, SurfaceSet};

/// Where an anchor would land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTarget {
    /// Hit point on the surface
    pub point: Vec3,
    /// Outward surface normal (normalized)
    pub normal: Vec3,
}

impl From<HitInfo> for SurfaceTarget {
    fn from(hit: HitInfo) -> Self {
        Self {
            point: hit.position,
            normal: hit.normal,
        }
    }
}

/// Anything that can answer a filtered ray query.
pub trait SurfaceQuery {
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: SurfaceMask,
    ) -> Option<HitInfo>;
}

impl SurfaceQuery for SurfaceSet {
    fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: SurfaceMask,
    ) -> Option<HitInfo> {
        SurfaceSet::ray_cast(self, origin, direction, max_distance, filter)
    }
}

/// Stateless forward probe.
pub fn probe<W: SurfaceQuery + ?Sized>(
    world: &W,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    filter: SurfaceMask,
) -> Option<SurfaceTarget> {
    world
        .ray_cast(origin, direction, max_distance, filter)
        .map(SurfaceTarget::from)
}

/// Configured probe that remembers the latest result.
#[derive(Debug, Clone, Default)]
pub struct SurfaceProbe {
    config: ProbeConfig,
    last: Option<SurfaceTarget>,
}

impl SurfaceProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config, last: None }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe with the configured range and mask without touching the cache.
    pub fn probe<W: SurfaceQuery + ?Sized>(
        &self,
        world: &W,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<SurfaceTarget> {
        probe(
            world,
            origin,
            direction,
            self.config.max_distance,
            self.config.surface_mask,
        )
    }

    /// Probe and store the result as the latest.
    pub fn refresh<W: SurfaceQuery + ?Sized>(
        &mut self,
        world: &W,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<SurfaceTarget> {
        self.last = self.probe(world, origin, direction);
        if self.last.is_none() {
            tracing::trace!("[probe] no surface within {}m", self.config.max_distance);
        }
        self.last
    }

    /// Result of the most recent [`SurfaceProbe::refresh`].
    pub fn last_result(&self) -> Option<SurfaceTarget> {
        self.last
    }
}
