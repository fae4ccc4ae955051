//! Launch Arm Configuration
//!
//! Centralized tuning for the probe, the anchor's flight timing, the spawn
//! template and the operator rig binding. Loaded from JSON; every field has a
//! default so partial files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::{SurfaceMask, Transform};

/// Errors raised while loading or validating a [`LaunchArmConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Forward ray used to find an attachable surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum ray length (meters)
    pub max_distance: f32,
    /// Layers the anchor may attach to
    pub surface_mask: SurfaceMask,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            surface_mask: SurfaceMask::GRAPPLE,
        }
    }
}

/// Flight timing for the anchor.
///
/// Position and rotation run on separate clocks; each pair must be positive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Seconds for the outbound position lerp
    pub travel_duration: f32,
    /// Seconds for the outbound rotation slerp
    pub rotation_duration: f32,
    /// Seconds for the return position lerp
    pub recall_duration: f32,
    /// Seconds for the return rotation slerp
    pub recall_rotation_duration: f32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            travel_duration: 1.0,
            rotation_duration: 0.5,
            recall_duration: 1.0,
            recall_rotation_duration: 0.5,
        }
    }
}

/// Launcher-side settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Template identifier passed to the spawn service
    pub anchor_template: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            anchor_template: "launched_arm".to_string(),
        }
    }
}

/// Names of the operator nodes the anchor mirrors, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigBinding {
    /// Operator root node (body / play-space origin)
    pub operator_root: String,
    /// Operator limb node whose root-relative pose is mirrored
    pub operator_limb: String,
    /// Anchor's mirroring root, local to the anchor transform
    pub anchor_root_offset: Transform,
}

impl Default for RigBinding {
    fn default() -> Self {
        Self {
            operator_root: "operator_root".to_string(),
            operator_limb: "operator_hand".to_string(),
            anchor_root_offset: Transform::IDENTITY,
        }
    }
}

/// Complete launch arm configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchArmConfig {
    pub probe: ProbeConfig,
    pub anchor: AnchorConfig,
    pub launcher: LauncherConfig,
    pub rig: RigBinding,
}

impl LaunchArmConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: LaunchArmConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!("[config] loaded launch arm config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make the arm misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("probe.max_distance", self.probe.max_distance)?;
        if self.probe.surface_mask == SurfaceMask::NONE {
            return Err(invalid("probe.surface_mask", "mask matches no surfaces"));
        }

        positive("anchor.travel_duration", self.anchor.travel_duration)?;
        positive("anchor.rotation_duration", self.anchor.rotation_duration)?;
        positive("anchor.recall_duration", self.anchor.recall_duration)?;
        positive(
            "anchor.recall_rotation_duration",
            self.anchor.recall_rotation_duration,
        )?;

        if self.launcher.anchor_template.trim().is_empty() {
            return Err(invalid("launcher.anchor_template", "must not be empty"));
        }
        if self.rig.operator_root.trim().is_empty() {
            return Err(invalid("rig.operator_root", "must not be empty"));
        }
        if self.rig.operator_limb.trim().is_empty() {
            return Err(invalid("rig.operator_limb", "must not be empty"));
        }
        if !self.rig.anchor_root_offset.position.is_finite()
            || !self.rig.anchor_root_offset.rotation.is_normalized()
        {
            return Err(invalid(
                "rig.anchor_root_offset",
                "needs a finite position and unit rotation",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a positive finite number, got {value}"),
        })
    }
}
