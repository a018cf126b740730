// prism_sim/src/simulation/plugins/debugging/mod.rs

use bevy::prelude::*;

// --- Sub-modules for organization ---
mod components;
mod systems;

// Re-export the public component for use in other plugins (like sensor spawners).
pub use components::ShowDebugGizmos;

use crate::prelude::AppState;

/// Point-cloud visualization. Needs a window and a renderer.
pub struct DebuggingPlugin;

impl Plugin for DebuggingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                // Global hotkey toggles
                systems::toggle_lidar_visuals,
                // The actual drawing
                systems::draw_scan_points,
            )
                .run_if(in_state(AppState::Running)),
        );
    }
}
