//! Config Module
//!
//! Centralized configuration for the launch arm.

pub mod arm_config;

pub use arm_config::{
    AnchorConfig, ConfigError, LaunchArmConfig, LauncherConfig, ProbeConfig, RigBinding,
};
