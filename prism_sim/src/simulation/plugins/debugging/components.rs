// prism_sim/src/simulation/plugins/debugging/components.rs

use bevy::prelude::Component;

/// A marker component that enables debug visualizations for the entity it's attached to.
///
/// `draw_scan_points` only draws the sweeps of LiDARs carrying it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ShowDebugGizmos;
