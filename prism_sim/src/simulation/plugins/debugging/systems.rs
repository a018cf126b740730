// prism_sim/src/simulation/plugins/debugging/systems.rs

use bevy::prelude::*;

use super::components::ShowDebugGizmos;
use crate::simulation::core::transforms::point_to_bevy_vec3;
use crate::simulation::plugins::sensors::lidar::{PrismLidar, SweepBuffer};

/// Points closer than this are drawn red, farther ones fade to blue.
const COLOR_NEAR_M: f32 = 1.0;
const COLOR_FAR_M: f32 = 20.0;

// =========================================================================
// == Toggle Systems (Hotkeys) ==
// =========================================================================

/// Toggles the `ShowDebugGizmos` component on all LiDAR sensors with the F3 key.
pub fn toggle_lidar_visuals(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    query: Query<(Entity, Option<&ShowDebugGizmos>), With<PrismLidar>>,
) {
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }

    // If any were on, turn them all off. If all were off, turn them all on.
    let are_any_on = query.iter().any(|(_, gizmo_opt)| gizmo_opt.is_some());
    for (entity, gizmo_opt) in &query {
        match (are_any_on, gizmo_opt.is_some()) {
            (true, true) => {
                commands.entity(entity).remove::<ShowDebugGizmos>();
            }
            (false, false) => {
                commands.entity(entity).insert(ShowDebugGizmos);
            }
            _ => {}
        }
    }
    info!(
        "[Debug] Toggled LiDAR point visuals {}",
        if are_any_on { "OFF" } else { "ON" }
    );
}

// =========================================================================
// == Drawing Systems ==
// =========================================================================

/// Draws the latest full sweep of every LiDAR with `ShowDebugGizmos`,
/// colored by distance from the sensor.
pub fn draw_scan_points(
    mut gizmos: Gizmos,
    sensor_query: Query<(&SweepBuffer, &GlobalTransform), With<ShowDebugGizmos>>,
) {
    for (sweep, transform) in &sensor_query {
        let origin = transform.translation();
        for point in sweep.points() {
            let p = point_to_bevy_vec3(point);
            gizmos
                .sphere(Isometry3d::from_translation(p), 0.03, range_color(p.distance(origin)))
                .resolution(4);
        }
    }
}

fn range_color(range: f32) -> Color {
    let t = ((range - COLOR_NEAR_M) / (COLOR_FAR_M - COLOR_NEAR_M)).clamp(0.0, 1.0);
    Color::srgb(1.0 - t, 0.3, t)
}
