// prism_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. Entities are spawned from the scenario and the
    /// scene snapshot is taken.
    #[default]
    SceneBuilding,

    /// The scene is built. The main simulation loop is now running.
    Running,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Spawn static obstacles with their shapes and reflectivity.
    World,

    /// Pass 2: Freeze the spawned obstacles into the scene the sensors cast against.
    Snapshot,

    /// Pass 3: Spawn sensors. They need the snapshot.
    Sensors,

    /// Pass 4: Leave SceneBuilding.
    Finalize,
}

// =========================================================================
// == Main Simulation Sets ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Launches this tick's scan units. Runs in `Update`.
    ScheduleScans,

    /// Joins the scan units and publishes point clouds. Runs in `PostUpdate`,
    /// so everything in `Update` overlaps with the casting.
    CompleteScans,

    /// Consumers of the published point clouds. Runs in `PostUpdate`.
    Consumers,

    /// Checks the run limit, then advances the simulation clock. Runs in `Last`.
    Clock,
}
