// prism_sim/src/simulation/core/events.rs
use bevy::prelude::{Entity, Event};
// Import the pure data struct from the core library
use prism_core::messages::ScanFrame;

/// Published once per completed tick by every LiDAR.
#[derive(Event, Clone, Debug)]
pub struct BevyPointCloudMessage {
    pub sensor: Entity,
    pub frame: ScanFrame,
}
