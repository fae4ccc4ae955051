//! Launched anchor state machine.
//!
//! One anchor instance flies out to a surface, aligns its forward axis to the
//! surface normal, mirrors the operator's hand while attached, and flies back
//! when recalled.
//!
//! ```text
//! Idle ──launch_to──▶ Traveling ──segment done──▶ Attached
//!                                                    │ request_recall
//!                                                    ▼
//!                         Recalled ◀──segment done── Recalling
//! ```
//!
//! Exactly one [`PoseSegment`] is active at a time. Requests that arrive while
//! a segment runs are dropped, never queued. Recall is only honored from
//! `Attached`. Reaching `Recalled` sends the completion signal and publishes
//! the broadcast once; the sender is consumed so it cannot fire again.
//!
//! # Per-tick order
//!
//! - [`Anchor::update`] advances the active segment (early in the tick)
//! - [`Anchor::late_update`] mirrors the operator limb once all operator
//!   poses for the tick are final

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::channel::oneshot;
use glam::Vec3;

use super::recall_broadcast::RecallBroadcast;
use super::segment::PoseSegment;
use crate::game::config::AnchorConfig;
use crate::game::rig::{ReferenceRig, TransformStore};
use crate::physics::{Transform, UP, look_rotation};

static NEXT_ANCHOR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique anchor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(u64);

impl AnchorId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        AnchorId(NEXT_ANCHOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Anchor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    /// Spawned, no flight started yet
    Idle,
    /// Flying to the target surface
    Traveling,
    /// On the surface, mirroring the operator limb
    Attached,
    /// Flying back to the launcher
    Recalling,
    /// Recall finished; waiting for the launcher to destroy it
    Recalled,
}

impl fmt::Display for AnchorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnchorState::Idle => "idle",
            AnchorState::Traveling => "traveling",
            AnchorState::Attached => "attached",
            AnchorState::Recalling => "recalling",
            AnchorState::Recalled => "recalled",
        };
        f.write_str(name)
    }
}

/// Reported by [`Anchor::update`] when a segment completes this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEvent {
    /// Outbound flight landed
    Attached,
    /// Return flight finished
    Recalled,
}

/// A single launched anchor.
#[derive(Debug)]
pub struct Anchor {
    id: AnchorId,
    state: AnchorState,
    transform: Transform,
    limb_pose: Transform,
    segment: Option<PoseSegment>,
    timing: AnchorConfig,
    rig: ReferenceRig,
    root_offset: Transform,
    completion: Option<oneshot::Sender<AnchorId>>,
    broadcast: Option<RecallBroadcast>,
}

impl Anchor {
    /// Create an idle anchor at `spawn_pose`.
    ///
    /// `completion` fires with this anchor's id when its recall finishes.
    pub fn new(
        id: AnchorId,
        spawn_pose: Transform,
        timing: AnchorConfig,
        rig: ReferenceRig,
        completion: oneshot::Sender<AnchorId>,
    ) -> Self {
        Self {
            id,
            state: AnchorState::Idle,
            transform: spawn_pose,
            limb_pose: spawn_pose,
            segment: None,
            timing,
            rig,
            root_offset: Transform::IDENTITY,
            completion: Some(completion),
            broadcast: None,
        }
    }

    /// Local offset of the mirroring root relative to the anchor transform.
    pub fn with_root_offset(mut self, offset: Transform) -> Self {
        self.root_offset = offset;
        self
    }

    /// Also publish on `broadcast` when the recall finishes.
    pub fn with_broadcast(mut self, broadcast: RecallBroadcast) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub fn id(&self) -> AnchorId {
        self.id
    }

    pub fn state(&self) -> AnchorState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == AnchorState::Attached
    }

    /// True from the recall request until destruction.
    pub fn is_recalling(&self) -> bool {
        matches!(self.state, AnchorState::Recalling | AnchorState::Recalled)
    }

    /// True while a travel or recall segment is running.
    pub fn is_in_flight(&self) -> bool {
        self.segment.is_some()
    }

    /// Anchor root transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Mirrored limb pose, updated in [`Anchor::late_update`].
    pub fn limb_pose(&self) -> &Transform {
        &self.limb_pose
    }

    /// Active segment, if any.
    pub fn segment(&self) -> Option<&PoseSegment> {
        self.segment.as_ref()
    }

    /// Start the outbound flight toward `point`, facing along `normal`.
    ///
    /// Only honored from `Idle`. Returns whether the flight started.
    pub fn launch_to(&mut self, point: Vec3, normal: Vec3) -> bool {
        if self.state != AnchorState::Idle {
            tracing::debug!("[anchor] {} ignoring launch while {}", self.id, self.state);
            return false;
        }
        self.begin_segment(
            point,
            normal,
            self.timing.travel_duration,
            self.timing.rotation_duration,
        );
        self.state = AnchorState::Traveling;
        tracing::debug!("[anchor] {} traveling to {:?}", self.id, point);
        true
    }

    /// Fly back to `point`, ending with forward along `direction`.
    ///
    /// Only honored while `Attached`; otherwise dropped. Returns whether the
    /// recall started.
    pub fn request_recall(&mut self, point: Vec3, direction: Vec3) -> bool {
        if self.state != AnchorState::Attached || self.segment.is_some() {
            tracing::debug!("[anchor] {} ignoring recall while {}", self.id, self.state);
            return false;
        }
        self.begin_segment(
            point,
            direction,
            self.timing.recall_duration,
            self.timing.recall_rotation_duration,
        );
        self.state = AnchorState::Recalling;
        tracing::debug!("[anchor] {} recalling to {:?}", self.id, point);
        true
    }

    fn begin_segment(&mut self, point: Vec3, facing: Vec3, move_duration: f32, turn_duration: f32) {
        let end = Transform::new(point, look_rotation(facing, UP));
        self.segment = Some(PoseSegment::new(
            self.transform,
            end,
            move_duration,
            turn_duration,
        ));
    }

    /// Advance the active segment by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> Option<AnchorEvent> {
        let segment = self.segment.as_mut()?;
        self.transform = segment.advance(dt);
        if !segment.is_finished() {
            return None;
        }
        self.segment = None;

        match self.state {
            AnchorState::Traveling => {
                self.state = AnchorState::Attached;
                tracing::info!("[anchor] {} attached at {:?}", self.id, self.transform.position);
                Some(AnchorEvent::Attached)
            }
            AnchorState::Recalling => {
                self.state = AnchorState::Recalled;
                self.notify_recalled();
                Some(AnchorEvent::Recalled)
            }
            // Segments only run in the two flight states
            _ => None,
        }
    }

    fn notify_recalled(&mut self) {
        tracing::info!("[anchor] {} recall complete", self.id);
        if let Some(sender) = self.completion.take() {
            if sender.send(self.id).is_err() {
                tracing::debug!("[anchor] {} launcher stopped listening", self.id);
            }
        }
        if let Some(broadcast) = &self.broadcast {
            broadcast.publish();
        }
    }

    /// Mirror the operator limb onto the anchor. No-op unless attached.
    pub fn late_update(&mut self, scene: &TransformStore) {
        if self.state != AnchorState::Attached {
            return;
        }
        let root = self.transform.compose(&self.root_offset);
        match self.rig.mirror_onto(scene, &root) {
            Some(limb) => self.limb_pose = limb,
            None => {
                tracing::warn!("[anchor] {} operator rig missing, holding last pose", self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::RigBinding;
    use crate::physics::FORWARD;
    use glam::Quat;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    const DT: f32 = 1.0 / 60.0;

    fn scene() -> TransformStore {
        let mut scene = TransformStore::new();
        scene.insert("operator_root", Transform::IDENTITY);
        scene.insert(
            "operator_hand",
            Transform::new(Vec3::new(0.2, 1.0, 0.5), Quat::from_rotation_x(0.25)),
        );
        scene
    }

    fn anchor(scene: &TransformStore) -> (Anchor, oneshot::Receiver<AnchorId>) {
        let rig = ReferenceRig::resolve(&RigBinding::default(), scene).unwrap();
        let (tx, rx) = oneshot::channel();
        let anchor = Anchor::new(AnchorId::next(), Transform::IDENTITY, AnchorConfig::default(), rig, tx);
        (anchor, rx)
    }

    fn run(anchor: &mut Anchor, seconds: f32) {
        let steps = (seconds / DT).ceil() as usize + 1;
        for _ in 0..steps {
            anchor.update(DT);
        }
    }

    #[test]
    fn test_unvalidated_nan_timing_still_arrives() {
        let scene = scene();
        let rig = ReferenceRig::resolve(&RigBinding::default(), &scene).unwrap();
        let (tx, _rx) = oneshot::channel();
        let timing = AnchorConfig {
            travel_duration: f32::NAN,
            rotation_duration: f32::NAN,
            ..AnchorConfig::default()
        };
        let mut anchor = Anchor::new(AnchorId::next(), Transform::IDENTITY, timing, rig, tx);

        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(anchor.update(DT), Some(AnchorEvent::Attached));
        assert_eq!(anchor.position(), Vec3::new(0.0, 0.0, 10.0));
        assert!(anchor.transform().position.is_finite());
    }

    #[test]
    fn test_starts_idle() {
        let scene = scene();
        let (anchor, _rx) = anchor(&scene);
        assert_eq!(anchor.state(), AnchorState::Idle);
        assert!(!anchor.is_in_flight());
    }

    #[test]
    fn test_travel_lands_exactly_on_target() {
        let scene = scene();
        let (mut anchor, _rx) = anchor(&scene);

        assert!(anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z));
        assert_eq!(anchor.state(), AnchorState::Traveling);

        run(&mut anchor, 1.0);

        assert_eq!(anchor.state(), AnchorState::Attached);
        assert_eq!(anchor.position(), Vec3::new(0.0, 0.0, 10.0));
        assert!((anchor.transform().rotation * FORWARD).abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_attached_event_fires_once() {
        let scene = scene();
        let (mut anchor, _rx) = anchor(&scene);
        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);

        let mut events = Vec::new();
        for _ in 0..200 {
            if let Some(event) = anchor.update(DT) {
                events.push(event);
            }
        }
        assert_eq!(events, vec![AnchorEvent::Attached]);
    }

    #[test]
    fn test_second_launch_ignored_while_traveling() {
        let scene = scene();
        let (mut anchor, _rx) = anchor(&scene);
        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        anchor.update(0.25);
        let segment = *anchor.segment().unwrap();

        assert!(!anchor.launch_to(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_X));
        assert_eq!(*anchor.segment().unwrap(), segment);
    }

    #[test]
    fn test_recall_ignored_unless_attached() {
        let scene = scene();
        let (mut anchor, _rx) = anchor(&scene);

        // Idle
        assert!(!anchor.request_recall(Vec3::ZERO, Vec3::Z));
        assert_eq!(anchor.state(), AnchorState::Idle);

        // Traveling
        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        anchor.update(0.5);
        assert!(!anchor.request_recall(Vec3::ZERO, Vec3::Z));
        assert_eq!(anchor.state(), AnchorState::Traveling);

        // Recalling
        run(&mut anchor, 1.0);
        assert!(anchor.request_recall(Vec3::ZERO, Vec3::Z));
        let segment = *anchor.segment().unwrap();
        assert!(!anchor.request_recall(Vec3::new(9.0, 9.0, 9.0), Vec3::X));
        assert_eq!(*anchor.segment().unwrap(), segment);
    }

    #[test]
    fn test_recall_round_trip_signals_exactly_once() {
        let scene = scene();
        let (anchor, mut rx) = anchor(&scene);
        let broadcast = RecallBroadcast::new();
        let published = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&published);
        broadcast.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let mut anchor = anchor.with_broadcast(broadcast.clone());

        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        run(&mut anchor, 1.0);
        assert!(anchor.is_attached());

        let home = Vec3::new(0.0, 1.0, 0.5);
        assert!(anchor.request_recall(home, Vec3::Z));
        assert!(anchor.is_recalling());
        assert_eq!(rx.try_recv().unwrap(), None);

        let mut recalled_events = 0;
        for _ in 0..600 {
            if anchor.update(DT) == Some(AnchorEvent::Recalled) {
                recalled_events += 1;
            }
        }

        assert_eq!(recalled_events, 1);
        assert_eq!(anchor.state(), AnchorState::Recalled);
        assert_eq!(anchor.position(), home);
        assert_eq!(anchor.transform().rotation, look_rotation(Vec3::Z, UP));
        assert_eq!(rx.try_recv().unwrap(), Some(anchor.id()));
        assert_eq!(published.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mirroring_only_while_attached() {
        let mut scene = scene();
        let (mut anchor, _rx) = anchor(&scene);
        let idle_limb = *anchor.limb_pose();

        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        anchor.update(0.5);
        anchor.late_update(&scene);
        assert_eq!(*anchor.limb_pose(), idle_limb);

        run(&mut anchor, 1.0);
        anchor.late_update(&scene);
        // Operator hand (0.2, 1.0, 0.5) re-expressed on the wall-facing anchor
        assert!(anchor.limb_pose().position.abs_diff_eq(Vec3::new(-0.2, 1.0, 9.5), 1e-5));

        // Moving the operator hand moves the mirrored limb
        let hand = scene.find("operator_hand").unwrap();
        scene.set(hand, Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));
        anchor.late_update(&scene);
        assert!(anchor.limb_pose().position.abs_diff_eq(Vec3::new(0.0, 2.0, 10.0), 1e-5));

        // Frozen once recalling
        anchor.request_recall(Vec3::ZERO, Vec3::Z);
        let frozen = *anchor.limb_pose();
        scene.set(hand, Transform::from_position(Vec3::new(1.0, 1.0, 1.0)));
        anchor.late_update(&scene);
        assert_eq!(*anchor.limb_pose(), frozen);
    }

    #[test]
    fn test_missing_rig_node_holds_last_pose() {
        let mut scene = scene();
        let (mut anchor, _rx) = anchor(&scene);
        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        run(&mut anchor, 1.0);
        anchor.late_update(&scene);
        let before = *anchor.limb_pose();

        scene.remove("operator_hand");
        anchor.late_update(&scene);
        assert_eq!(*anchor.limb_pose(), before);
    }

    #[test]
    fn test_root_offset_shifts_mirroring_frame() {
        let scene = scene();
        let (anchor, _rx) = anchor(&scene);
        let mut anchor = anchor.with_root_offset(Transform::from_position(Vec3::new(0.0, -1.0, 0.0)));
        anchor.launch_to(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        run(&mut anchor, 1.0);
        anchor.late_update(&scene);
        assert!(anchor.limb_pose().position.abs_diff_eq(Vec3::new(-0.2, 0.0, 9.5), 1e-5));
    }

    #[test]
    fn test_anchor_ids_are_unique() {
        let a = AnchorId::next();
        let b = AnchorId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
