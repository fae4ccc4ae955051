//! Anchor spawn boundary.
//!
//! The launcher never builds render objects itself. It asks a
//! [`SpawnService`] for an entity from a template, pushes the anchor's pose to
//! it every tick, and despawns it once the anchor is gone.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::physics::Transform;

/// Opaque handle to an engine-side entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u64);

/// Parameters for one spawn call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest<'a> {
    /// Template / prefab identifier
    pub template: &'a str,
    /// Initial world position
    pub position: Vec3,
    /// Initial world rotation
    pub rotation: Quat,
}

/// Object-creation service provided by the host engine.
pub trait SpawnService {
    /// Create an entity and return its handle.
    fn spawn(&mut self, request: SpawnRequest<'_>) -> EntityHandle;

    /// Destroy an entity previously returned by [`SpawnService::spawn`].
    fn despawn(&mut self, handle: EntityHandle);

    /// Push the latest root and mirrored-limb poses to the entity.
    fn sync_pose(&mut self, _handle: EntityHandle, _root: &Transform, _limb: &Transform) {}
}

impl<T: SpawnService + ?Sized> SpawnService for &mut T {
    fn spawn(&mut self, request: SpawnRequest<'_>) -> EntityHandle {
        (**self).spawn(request)
    }

    fn despawn(&mut self, handle: EntityHandle) {
        (**self).despawn(handle)
    }

    fn sync_pose(&mut self, handle: EntityHandle, root: &Transform, limb: &Transform) {
        (**self).sync_pose(handle, root, limb)
    }
}

/// One entity tracked by [`RecordingSpawner`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedEntity {
    pub template: String,
    pub root: Transform,
    pub limb: Transform,
}

/// In-memory [`SpawnService`] that records every call.
///
/// Used by the headless simulator and by tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpawner {
    next_handle: u64,
    live: HashMap<EntityHandle, SpawnedEntity>,
    /// Total spawn calls
    pub spawn_count: usize,
    /// Total despawn calls
    pub despawn_count: usize,
    /// Final state of the most recently despawned entity
    pub last_despawned: Option<SpawnedEntity>,
}

impl RecordingSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities spawned and not yet despawned.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Last known state of a live entity.
    pub fn get(&self, handle: EntityHandle) -> Option<&SpawnedEntity> {
        self.live.get(&handle)
    }
}

impl SpawnService for RecordingSpawner {
    fn spawn(&mut self, request: SpawnRequest<'_>) -> EntityHandle {
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.spawn_count += 1;
        let pose = Transform::new(request.position, request.rotation);
        self.live.insert(
            handle,
            SpawnedEntity {
                template: request.template.to_string(),
                root: pose,
                limb: pose,
            },
        );
        handle
    }

    fn despawn(&mut self, handle: EntityHandle) {
        if let Some(entity) = self.live.remove(&handle) {
            self.despawn_count += 1;
            self.last_despawned = Some(entity);
        }
    }

    fn sync_pose(&mut self, handle: EntityHandle, root: &Transform, limb: &Transform) {
        if let Some(entity) = self.live.get_mut(&handle) {
            entity.root = *root;
            entity.limb = *limb;
        }
    }
}
