// prism_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the entire prism_core prelude so you can easily access
// pure types like `ScanPipeline`, `ScanFrame`, `ObjectHandle`, etc.
pub use prism_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::{
    LidarSection, ObstacleConfig, Pose, ScenarioConfig, ScenarioError, ShapeConfig, Simulation,
};
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::components::{Reflectivity, SceneShape};
pub use crate::simulation::core::events::BevyPointCloudMessage;

pub use crate::simulation::plugins::sensors::lidar::{PrismLidar, PrismLidarPlugin, SweepBuffer};
pub use crate::simulation::plugins::world::scene::SceneSnapshot;
