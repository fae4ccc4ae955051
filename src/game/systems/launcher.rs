//! Launcher: the interaction lock around a single anchor.
//!
//! The launcher decides whether a launch or recall is legal right now, owns
//! at most one live [`Anchor`], and destroys it once the anchor reports that
//! its recall finished. The lock is the presence of a live anchor, so the two
//! can never disagree.
//!
//! # Tick order
//!
//! 1. Drain the completion channel (release the lock for last tick's recall)
//! 2. Refresh the surface probe from the operator's aim
//! 3. Feed trigger edges; a fire becomes [`Launcher::launch`]
//! 4. Advance the anchor's active segment
//! 5. Drain the completion channel again (same-tick delivery)
//! 6. Mirror the operator limb and sync the entity pose
//!
//! # Launch semantics
//!
//! - Nothing live: probe hit spawns an anchor, miss does nothing
//! - Anchor attached: launch doubles as recall
//! - Anchor traveling or recalling: ignored

use futures::channel::oneshot;
use glam::Vec3;

use super::anchor::{Anchor, AnchorId, AnchorState};
use super::recall_broadcast::RecallBroadcast;
use super::spawner::{EntityHandle, SpawnRequest, SpawnService};
use super::surface_probe::{SurfaceProbe, SurfaceQuery, SurfaceTarget};
use crate::game::LaunchArmError;
use crate::game::config::LaunchArmConfig;
use crate::game::rig::{ReferenceRig, TransformStore};
use crate::input::{TriggerAction, TriggerEdges, TriggerState};
use crate::physics::Transform;

/// Result of [`Launcher::launch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A new anchor was spawned and is traveling
    Spawned(AnchorId),
    /// The attached anchor was asked to come back instead
    RecallIssued(AnchorId),
    /// An anchor is in flight; nothing changed
    Busy(AnchorState),
    /// The probe found no attachable surface
    NoTarget,
}

/// Result of [`Launcher::recall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallOutcome {
    /// The attached anchor started flying back
    Recalling(AnchorId),
    /// No live anchor
    NoAnchor,
    /// Live anchor is not attached; nothing changed
    NotAttached(AnchorState),
}

/// What happened during one [`Launcher::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Outcome of a trigger fire this tick, if the trigger fired
    pub fired: Option<LaunchOutcome>,
    /// Anchor destroyed this tick after finishing its recall
    pub destroyed: Option<AnchorId>,
}

#[derive(Debug)]
struct LiveAnchor {
    anchor: Anchor,
    entity: EntityHandle,
    completion: oneshot::Receiver<AnchorId>,
}

/// Gatekeeper for launching and recalling a single anchor.
pub struct Launcher<S: SpawnService> {
    config: LaunchArmConfig,
    spawner: S,
    probe: SurfaceProbe,
    trigger: TriggerState,
    rig: ReferenceRig,
    broadcast: RecallBroadcast,
    launch_point: Transform,
    live: Option<LiveAnchor>,
}

impl<S: SpawnService> Launcher<S> {
    /// Validate the config and bind the operator rig.
    ///
    /// Refuses to activate if the rig nodes are absent from `scene`.
    pub fn new(
        config: LaunchArmConfig,
        scene: &TransformStore,
        spawner: S,
    ) -> Result<Self, LaunchArmError> {
        config.validate()?;
        let rig = ReferenceRig::resolve(&config.rig, scene)?;
        tracing::info!(
            "[launcher] ready: template `{}`, range {}m",
            config.launcher.anchor_template,
            config.probe.max_distance
        );
        Ok(Self {
            probe: SurfaceProbe::new(config.probe.clone()),
            config,
            spawner,
            trigger: TriggerState::new(),
            rig,
            broadcast: RecallBroadcast::global().clone(),
            launch_point: Transform::IDENTITY,
            live: None,
        })
    }

    /// Publish recall completions on `broadcast` instead of the global one.
    pub fn with_broadcast(mut self, broadcast: RecallBroadcast) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn config(&self) -> &LaunchArmConfig {
        &self.config
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    pub fn spawner_mut(&mut self) -> &mut S {
        &mut self.spawner
    }

    /// True from launch until the spawned anchor finishes its recall.
    pub fn is_locked(&self) -> bool {
        self.live.is_some()
    }

    /// The live anchor, if any.
    pub fn live_anchor(&self) -> Option<&Anchor> {
        self.live.as_ref().map(|live| &live.anchor)
    }

    /// Where anchors spawn from and return to.
    pub fn launch_point(&self) -> &Transform {
        &self.launch_point
    }

    /// Latest probe result.
    pub fn last_probe(&self) -> Option<SurfaceTarget> {
        self.probe.last_result()
    }

    /// Whether a launch right now would spawn an anchor.
    pub fn can_launch(&self) -> bool {
        !self.is_locked() && self.probe.last_result().is_some()
    }

    /// Segment from the launch point to the live anchor, for drawing a tether.
    pub fn tether(&self) -> Option<(Vec3, Vec3)> {
        self.live
            .as_ref()
            .map(|live| (self.launch_point.position, live.anchor.position()))
    }

    /// Move the launch point and refresh the probe along its forward axis.
    pub fn aim<W: SurfaceQuery + ?Sized>(&mut self, launch_point: Transform, world: &W) {
        self.launch_point = launch_point;
        self.probe
            .refresh(world, launch_point.position, launch_point.forward());
    }

    /// Launch from `origin` along `direction`.
    ///
    /// Recalls an attached anchor instead; ignored while one is in flight.
    pub fn launch<W: SurfaceQuery + ?Sized>(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        world: &W,
    ) -> LaunchOutcome {
        self.aim(Transform::looking_along(origin, direction), world);

        if let Some(live) = &self.live {
            let state = live.anchor.state();
            if state == AnchorState::Attached {
                return match self.recall() {
                    RecallOutcome::Recalling(id) => LaunchOutcome::RecallIssued(id),
                    _ => LaunchOutcome::Busy(state),
                };
            }
            tracing::info!(
                "[launcher] launch ignored, {} is {}",
                live.anchor.id(),
                state
            );
            return LaunchOutcome::Busy(state);
        }

        let Some(target) = self.probe.last_result() else {
            tracing::debug!("[launcher] launch ignored, no surface in range");
            return LaunchOutcome::NoTarget;
        };

        let id = self.spawn_anchor(target);
        LaunchOutcome::Spawned(id)
    }

    fn spawn_anchor(&mut self, target: SurfaceTarget) -> AnchorId {
        let id = AnchorId::next();
        let spawn_pose = self.launch_point;
        let entity = self.spawner.spawn(SpawnRequest {
            template: &self.config.launcher.anchor_template,
            position: spawn_pose.position,
            rotation: spawn_pose.rotation,
        });

        let (sender, completion) = oneshot::channel();
        let mut anchor = Anchor::new(id, spawn_pose, self.config.anchor.clone(), self.rig, sender)
            .with_root_offset(self.config.rig.anchor_root_offset)
            .with_broadcast(self.broadcast.clone());
        anchor.launch_to(target.point, target.normal);

        tracing::info!(
            "[launcher] launched {} toward {:?} (normal {:?})",
            id,
            target.point,
            target.normal
        );
        self.live = Some(LiveAnchor {
            anchor,
            entity,
            completion,
        });
        id
    }

    /// Ask the attached anchor to fly back to the launch point.
    pub fn recall(&mut self) -> RecallOutcome {
        let Some(live) = self.live.as_mut() else {
            tracing::info!("[launcher] recall ignored, no anchor out");
            return RecallOutcome::NoAnchor;
        };
        let state = live.anchor.state();
        if state != AnchorState::Attached {
            tracing::info!(
                "[launcher] recall ignored, {} is {}",
                live.anchor.id(),
                state
            );
            return RecallOutcome::NotAttached(state);
        }

        let home = self.launch_point;
        live.anchor.request_recall(home.position, home.forward());
        tracing::info!("[launcher] recalling {}", live.anchor.id());
        RecallOutcome::Recalling(live.anchor.id())
    }

    /// Feed trigger edges. A completed press/release fires [`Launcher::launch`]
    /// along the current launch point.
    pub fn handle_input<W: SurfaceQuery + ?Sized>(
        &mut self,
        edges: TriggerEdges,
        world: &W,
    ) -> Option<LaunchOutcome> {
        match self.trigger.update(edges)? {
            TriggerAction::Fire => {
                let origin = self.launch_point.position;
                let direction = self.launch_point.forward();
                Some(self.launch(origin, direction, world))
            }
        }
    }

    /// Run one simulation tick.
    ///
    /// `aim` is the launch point this tick; `scene` must already hold this
    /// tick's operator poses.
    pub fn tick<W: SurfaceQuery + ?Sized>(
        &mut self,
        dt: f32,
        aim: Transform,
        input: TriggerEdges,
        world: &W,
        scene: &TransformStore,
    ) -> TickReport {
        let mut report = TickReport {
            destroyed: self.poll_recall_complete(),
            ..TickReport::default()
        };

        self.aim(aim, world);
        report.fired = self.handle_input(input, world);

        if let Some(live) = self.live.as_mut() {
            live.anchor.update(dt);
        }
        if let Some(id) = self.poll_recall_complete() {
            report.destroyed = Some(id);
        }

        if let Some(live) = self.live.as_mut() {
            live.anchor.late_update(scene);
            self.spawner.sync_pose(
                live.entity,
                live.anchor.transform(),
                live.anchor.limb_pose(),
            );
        }
        report
    }

    /// Release the lock and destroy the anchor if its recall has finished.
    ///
    /// Completions for any other anchor id are ignored.
    pub fn poll_recall_complete(&mut self) -> Option<AnchorId> {
        let live = self.live.as_mut()?;
        let finished = match live.completion.try_recv() {
            Ok(Some(id)) if id == live.anchor.id() => id,
            Ok(Some(other)) => {
                tracing::warn!(
                    "[launcher] ignoring completion for {} while {} is live",
                    other,
                    live.anchor.id()
                );
                return None;
            }
            Ok(None) => return None,
            Err(oneshot::Canceled) => {
                tracing::warn!("[launcher] {} dropped its completion signal", live.anchor.id());
                return None;
            }
        };

        if let Some(live) = self.live.take() {
            self.spawner
                .sync_pose(live.entity, live.anchor.transform(), live.anchor.limb_pose());
            self.spawner.despawn(live.entity);
        }
        tracing::info!("[launcher] {} destroyed, lock released", finished);
        Some(finished)
    }
}

impl<S: SpawnService> Drop for Launcher<S> {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            self.spawner.despawn(live.entity);
        }
    }
}
