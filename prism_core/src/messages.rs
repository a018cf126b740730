// prism_core/src/messages.rs

use std::sync::Arc;

use nalgebra::Point3;

use crate::scan::ScanSection;
use crate::types::SensorPose;

/// What the host hands to `ScanPipeline::schedule` every tick.
#[derive(Debug, Clone, Copy)]
pub struct ScanTick {
    /// Simulated time in seconds; drives the mirror rotation lookup.
    pub timestamp: f64,
    /// Sensor pose in the world at `timestamp`.
    pub pose: SensorPose,
}

/// The immutable result of one tick: the accepted returns of one section.
#[derive(Debug, Clone)]
pub struct ScanFrame {
    /// Sequence number of the tick that produced this frame, starting at 0.
    pub tick: u64,
    pub timestamp: f64,
    pub section: ScanSection,
    /// World-space points. Order carries no meaning.
    pub points: Arc<[Point3<f64>]>,
}

impl ScanFrame {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `true` for the last section of a sweep.
    pub fn completes_sweep(&self) -> bool {
        self.section.index == self.section.total_sections
    }
}
