// prism_sim/src/simulation/core/components.rs

use bevy::prelude::Component;
use parry3d_f64::shape::SharedShape;

/// Reflectivity of a scene object in percent, read when the scene snapshot
/// is taken.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Reflectivity(pub f64);

impl Default for Reflectivity {
    /// Bare concrete.
    fn default() -> Self {
        Self(20.0)
    }
}

/// Collision geometry of a static scene object, in its local frame.
#[derive(Component, Clone)]
pub struct SceneShape(pub SharedShape);
