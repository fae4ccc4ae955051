//! Physics type re-exports from glam
//!
//! This module provides the core mathematical types used throughout
//! the arm, re-exported from the glam library.

pub use glam::{Mat3, Quat, Vec3};
