//! Pose Segment
//!
//! One bounded flight of the anchor: position lerps from a captured start to
//! a destination over `move_duration`, rotation slerps over `turn_duration`.
//! The two clocks are independent; the segment is finished once both have
//! run out. Fractions are clamped to `[0, 1]` and a saturated fraction
//! returns the destination value itself, so arrival is exact.

use glam::{Quat, Vec3};

use crate::physics::Transform;

/// Clamped progress fraction for `elapsed` seconds of a `duration` long clock.
///
/// Non-positive and non-finite durations complete immediately.
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if !duration.is_finite() || duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

fn lerp_exact(start: Vec3, end: Vec3, t: f32) -> Vec3 {
    if t <= 0.0 {
        start
    } else if t >= 1.0 {
        end
    } else {
        start.lerp(end, t)
    }
}

fn slerp_exact(start: Quat, end: Quat, t: f32) -> Quat {
    if t <= 0.0 {
        start
    } else if t >= 1.0 {
        end
    } else {
        start.slerp(end, t)
    }
}

/// A single position-lerp + rotation-slerp pair.
///
/// Start and destination are captured at construction and never change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSegment {
    start: Transform,
    end: Transform,
    move_duration: f32,
    turn_duration: f32,
    elapsed: f32,
}

impl PoseSegment {
    /// Begin a segment from `start` to `end`.
    pub fn new(start: Transform, end: Transform, move_duration: f32, turn_duration: f32) -> Self {
        Self {
            start,
            end,
            move_duration,
            turn_duration,
            elapsed: 0.0,
        }
    }

    pub fn start(&self) -> &Transform {
        &self.start
    }

    pub fn end(&self) -> &Transform {
        &self.end
    }

    /// Seconds since the segment began.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Pose with position at fraction `move_t` and rotation at `turn_t`.
    pub fn sample_split(&self, move_t: f32, turn_t: f32) -> Transform {
        Transform::new(
            lerp_exact(self.start.position, self.end.position, move_t),
            slerp_exact(self.start.rotation, self.end.rotation, turn_t),
        )
    }

    /// Pose with both channels at fraction `t`.
    pub fn sample(&self, t: f32) -> Transform {
        self.sample_split(t, t)
    }

    /// Pose after `elapsed` seconds on each channel's own clock.
    pub fn sample_at(&self, elapsed: f32) -> Transform {
        self.sample_split(
            progress(elapsed, self.move_duration),
            progress(elapsed, self.turn_duration),
        )
    }

    /// Current pose.
    pub fn current(&self) -> Transform {
        self.sample_at(self.elapsed)
    }

    /// Advance by `dt` seconds and return the new pose.
    ///
    /// Negative `dt` is treated as zero so progress never runs backward.
    pub fn advance(&mut self, dt: f32) -> Transform {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.current()
    }

    /// True once both position and rotation have arrived.
    pub fn is_finished(&self) -> bool {
        progress(self.elapsed, self.move_duration) >= 1.0
            && progress(self.elapsed, self.turn_duration) >= 1.0
    }
}
