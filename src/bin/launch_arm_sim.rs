//! Launch Arm Simulator - headless scripted run
//!
//! Run with: `cargo run --bin launch-arm-sim [config.json]`
//!
//! Fires an anchor at a wall, waves the operator's hand while it is attached,
//! recalls it, then launches again at a side wall. Set `RUST_LOG=debug` to
//! see every state transition.

use std::path::Path;

use glam::{Quat, Vec3};
use launch_arm_engine::game::{
    LaunchArmConfig, LaunchArmError, Launcher, RecallBroadcast, RecordingSpawner, TransformStore,
};
use launch_arm_engine::input::TriggerEdges;
use launch_arm_engine::physics::{SurfaceMask, SurfaceSet, Transform};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DT: f32 = 1.0 / 60.0;
const SIM_SECONDS: f32 = 8.0;

/// Trigger script: (time in seconds, edges)
const SCRIPT: &[(f32, TriggerEdges)] = &[
    (0.25, TriggerEdges::press()),
    (0.50, TriggerEdges::release()),
    // Hand waving while attached, then press+release again to recall
    (3.00, TriggerEdges::tap()),
    // Turn toward the side wall and fire once the arm is home
    (5.50, TriggerEdges::tap()),
];

fn build_world() -> SurfaceSet {
    let mut world = SurfaceSet::new();
    world.add_box(
        Vec3::new(-5.0, -5.0, 10.0),
        Vec3::new(5.0, 5.0, 11.0),
        SurfaceMask::GRAPPLE,
    );
    world.add_plane(Vec3::new(8.0, 0.0, 0.0), Vec3::NEG_X, SurfaceMask::GRAPPLE);
    // Floor is walkable but not attachable
    world.add_plane(Vec3::ZERO, Vec3::Y, SurfaceMask::DEFAULT);
    world
}

fn hand_pose(time: f32) -> Transform {
    let wave = (time * 3.0).sin() * 0.4;
    Transform::new(
        Vec3::new(0.3 + wave * 0.5, 1.2, 0.4),
        Quat::from_rotation_z(wave),
    )
}

fn aim_at(time: f32) -> Transform {
    let direction = if time < 5.0 { Vec3::Z } else { Vec3::X };
    Transform::looking_along(Vec3::new(0.0, 1.0, 0.0), direction)
}

fn edges_at(tick: usize) -> TriggerEdges {
    SCRIPT
        .iter()
        .find(|(at, _)| (at / DT).round() as usize == tick)
        .map_or(TriggerEdges::NONE, |(_, edges)| *edges)
}

fn main() -> Result<(), LaunchArmError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => LaunchArmConfig::load(Path::new(&path))?,
        None => LaunchArmConfig::default(),
    };

    let world = build_world();
    let mut scene = TransformStore::new();
    let root = scene.insert(config.rig.operator_root.clone(), Transform::IDENTITY);
    let hand = scene.insert(config.rig.operator_limb.clone(), hand_pose(0.0));

    let _listener = RecallBroadcast::global().subscribe(|| {
        tracing::info!("[sim] recall broadcast received");
    });

    let mut launcher = Launcher::new(config, &scene, RecordingSpawner::new())?;

    let ticks = (SIM_SECONDS / DT) as usize;
    for tick in 0..ticks {
        let time = tick as f32 * DT;
        scene.set(root, Transform::IDENTITY);
        scene.set(hand, hand_pose(time));

        let report = launcher.tick(DT, aim_at(time), edges_at(tick), &world, &scene);
        if let Some(outcome) = report.fired {
            tracing::info!("[sim] t={time:.2}s fired: {outcome:?}");
        }
        if let Some(id) = report.destroyed {
            tracing::info!("[sim] t={time:.2}s {id} returned");
        }
        if tick % 30 == 0 {
            if let Some((from, to)) = launcher.tether() {
                tracing::debug!("[sim] t={time:.2}s tether {from:?} -> {to:?}");
            }
        }
    }

    let spawner = launcher.spawner();
    tracing::info!(
        "[sim] done: {} spawned, {} despawned, locked={}",
        spawner.spawn_count,
        spawner.despawn_count,
        launcher.is_locked()
    );
    Ok(())
}
