// prism_core/src/error.rs

use thiserror::Error;

/// Everything that can stop a LiDAR sensor from being constructed.
///
/// All variants are startup-time failures: once a `ScanPipeline` exists, the
/// per-tick path never fails on bad data, it falls back to defaults instead.
#[derive(Debug, Error)]
pub enum LidarError {
    #[error("invalid ray grid: {azimuth_steps} azimuth x {elevation_steps} elevation steps ({reason})")]
    InvalidGrid {
        azimuth_steps: usize,
        elevation_steps: usize,
        reason: &'static str,
    },

    #[error("scan rate {scan_rate_hz} Hz over simulation rate {simulation_rate_hz} Hz yields zero rays per tick for a grid of {grid_size}")]
    EmptySection {
        grid_size: usize,
        scan_rate_hz: u32,
        simulation_rate_hz: u32,
    },

    #[error("{ray_count} rays per tick does not evenly divide the grid of {grid_size} directions")]
    IndivisibleSections { grid_size: usize, ray_count: usize },

    #[error("invalid sensor parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("mirror rotation table is empty")]
    EmptyMirrorTable,

    #[error("mirror rotation table row {row} has {columns} column(s), expected at least 2")]
    MalformedMirrorRow { row: usize, columns: usize },

    #[error("mirror rotation table row {row} holds a non-numeric value {value:?}")]
    InvalidMirrorValue { row: usize, value: String },

    #[error("failed to parse mirror rotation table: {0}")]
    MirrorTableParse(#[from] csv::Error),

    #[error("failed to read mirror rotation table: {0}")]
    Io(#[from] std::io::Error),
}

/// Misuse of the two-phase `schedule`/`complete` protocol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("a scan is already in flight; complete() must run before the next schedule()")]
    NotIdle,

    #[error("no scan has been scheduled for this tick")]
    NothingScheduled,

    #[error("the scan worker terminated without returning its buffers")]
    WorkerLost,
}

pub type Result<T, E = LidarError> = std::result::Result<T, E>;
