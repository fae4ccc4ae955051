//! Top-level error for bringing a launcher online.

use thiserror::Error;

use crate::game::config::ConfigError;
use crate::game::rig::RigError;

/// Why a [`Launcher`](crate::game::Launcher) refused to activate.
#[derive(Debug, Error)]
pub enum LaunchArmError {
    #[error("configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("operator rig unavailable: {0}")]
    Rig(#[from] RigError),
}
