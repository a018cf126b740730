// prism_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::sensors::lidar::PrismLidarPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the prism_sim crate.
pub mod prelude;

// This module contains all the simulation-specific logic.
pub mod cli;
pub mod simulation;

pub use crate::simulation::plugins::debugging::DebuggingPlugin;

/// The main plugin that brings together all the simulation parts.
///
/// Insert a `ScenarioConfig` resource before adding it. Works with or
/// without a renderer; add `DebuggingPlugin` as well to see the points.
pub struct PrismSimulationPlugin;

impl Plugin for PrismSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Clock, PRNG, states and the system set graph.
            SimulationSetupPlugin,
            // Static obstacles and the scene snapshot the sensors cast against.
            WorldSpawnerPlugin,
            // The spinning-prism LiDAR.
            PrismLidarPlugin,
        ));
    }
}
