//! Launch Trigger Input
//!
//! Turns the two decoded per-tick edge signals ("launch pressed" and
//! "launch released") into a single fire command. Pressing starts aiming,
//! releasing while aiming fires. A release with no matching press is dropped.
//!
//! Device polling lives outside the crate; callers either feed edges directly
//! or derive them from a held level with [`TriggerEdges::from_levels`].

/// Edge signals for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerEdges {
    /// Trigger went down this tick
    pub pressed: bool,
    /// Trigger went up this tick
    pub released: bool,
}

impl TriggerEdges {
    /// No edges this tick.
    pub const NONE: TriggerEdges = TriggerEdges {
        pressed: false,
        released: false,
    };

    /// Only a press edge.
    pub const fn press() -> Self {
        Self {
            pressed: true,
            released: false,
        }
    }

    /// Only a release edge.
    pub const fn release() -> Self {
        Self {
            pressed: false,
            released: true,
        }
    }

    /// Press and release within the same tick (a tap).
    pub const fn tap() -> Self {
        Self {
            pressed: true,
            released: true,
        }
    }

    /// Derive edges from the held state last tick and this tick.
    pub const fn from_levels(was_down: bool, is_down: bool) -> Self {
        Self {
            pressed: is_down && !was_down,
            released: was_down && !is_down,
        }
    }
}

/// Trigger phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerPhase {
    #[default]
    Idle,
    /// Held; the operator is pointing at a target
    Aiming,
}

/// Command produced by the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Trigger released after aiming
    Fire,
}

/// Press-to-aim, release-to-fire trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerState {
    phase: TriggerPhase,
}

impl TriggerState {
    /// Create an idle trigger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    /// True while the trigger is held.
    pub fn is_aiming(&self) -> bool {
        self.phase == TriggerPhase::Aiming
    }

    /// Feed this tick's edges.
    ///
    /// Press is processed before release so a same-tick tap fires.
    pub fn update(&mut self, edges: TriggerEdges) -> Option<TriggerAction> {
        if edges.pressed {
            self.phase = TriggerPhase::Aiming;
        }
        if edges.released && self.phase == TriggerPhase::Aiming {
            self.phase = TriggerPhase::Idle;
            return Some(TriggerAction::Fire);
        }
        None
    }

    /// Drop any in-progress aim.
    pub fn reset(&mut self) {
        self.phase = TriggerPhase::Idle;
    }
}
