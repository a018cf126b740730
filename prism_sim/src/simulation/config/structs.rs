// prism_sim/src/simulation/config/structs.rs

use std::path::PathBuf;

use bevy::prelude::{Resource, Transform};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use parry3d_f64::shape::SharedShape;
use prism_core::config::LidarConfig;
use serde::{Deserialize, Serialize};

use super::serde_helpers;
use crate::simulation::core::transforms::isometry_to_bevy_transform;

/// Thickness of the slab a `plane` obstacle is modelled with.
pub const PLANE_THICKNESS: f64 = 0.1;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// The root of a scenario TOML file.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: Simulation,

    #[serde(default)]
    pub lidar: LidarSection,

    // The TOML has `[[obstacles]]`, which becomes a Vec of ObstacleConfig structs.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Host ticks per second. Simulated time advances `1 / rate_hz` per tick.
    pub rate_hz: u32,
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Stop after this much simulated time. Runs forever when unset.
    pub duration_seconds: Option<f64>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            rate_hz: 50,
            seed: None,
            duration_seconds: None,
        }
    }
}

impl Simulation {
    /// The tick budget implied by `duration_seconds`.
    pub fn max_ticks(&self) -> Option<u64> {
        self.duration_seconds
            .map(|seconds| (seconds * self.rate_hz as f64).round().max(0.0) as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LidarSection {
    pub name: String,
    /// Mounting pose in the world.
    #[serde(default)]
    pub pose: Pose,
    /// CSV of per-second mirror offsets. Relative paths are resolved against
    /// the scenario file. Without a table the mirror stays at rest.
    pub mirror_table: Option<PathBuf>,
    /// Draw the returned points from the first frame on.
    #[serde(default)]
    pub debug_visuals: bool,
    #[serde(default)]
    pub sensor: LidarConfig,
}

impl Default for LidarSection {
    fn default() -> Self {
        Self {
            name: "mid360".to_string(),
            pose: Pose::default(),
            mirror_table: None,
            debug_visuals: false,
            sensor: LidarConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleConfig {
    pub name: String,
    pub shape: ShapeConfig,
    #[serde(default)]
    pub pose: Pose,
    /// Percent. Obstacles without one get the concrete default.
    pub reflectivity: Option<f64>,
}

/// Collision shapes a scenario can place. Dimensions are half-sizes in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    Cuboid { half_extents: [f64; 3] },
    /// Upright along the local Y axis.
    Cylinder { half_height: f64, radius: f64 },
    /// A ground slab spanning local X and Z, `PLANE_THICKNESS` thick.
    Plane { half_extents: [f64; 2] },
}

impl ShapeConfig {
    pub fn dimensions(&self) -> Vec<f64> {
        match *self {
            ShapeConfig::Cuboid { half_extents } => half_extents.to_vec(),
            ShapeConfig::Cylinder {
                half_height,
                radius,
            } => vec![half_height, radius],
            ShapeConfig::Plane { half_extents } => half_extents.to_vec(),
        }
    }

    pub fn to_shared_shape(&self) -> SharedShape {
        match *self {
            ShapeConfig::Cuboid { half_extents: [x, y, z] } => SharedShape::cuboid(x, y, z),
            ShapeConfig::Cylinder {
                half_height,
                radius,
            } => SharedShape::cylinder(half_height, radius),
            ShapeConfig::Plane { half_extents: [x, z] } => {
                SharedShape::cuboid(x, PLANE_THICKNESS / 2.0, z)
            }
        }
    }

    /// Full size along X, Y and Z, for building a matching render mesh.
    pub fn full_size(&self) -> [f64; 3] {
        match *self {
            ShapeConfig::Cuboid { half_extents: [x, y, z] } => [2.0 * x, 2.0 * y, 2.0 * z],
            ShapeConfig::Cylinder {
                half_height,
                radius,
            } => [2.0 * radius, 2.0 * half_height, 2.0 * radius],
            ShapeConfig::Plane { half_extents: [x, z] } => [2.0 * x, PLANE_THICKNESS, 2.0 * z],
        }
    }
}

// =========================================================================
// == Helper Structs for Nested Configuration ==
// =========================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    #[serde(with = "serde_helpers::vec3_from_array", default = "Vector3::zeros")]
    pub translation: Vector3<f64>,

    #[serde(with = "serde_helpers::quat_from_euler_deg", default = "UnitQuaternion::identity")]
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn to_bevy_transform(&self) -> Transform {
        isometry_to_bevy_transform(&self.to_isometry())
    }
}
