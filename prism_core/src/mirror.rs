// prism_core/src/mirror.rs

//! The rotating prism inside the sensor bends every ray by a slowly varying
//! azimuth/elevation bias. The bias is recorded once per second and replayed
//! here by linear interpolation.

use std::fmt::Debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::config::MirrorOutOfRange;
use crate::error::{LidarError, Result};

/// Mirror bias at one instant, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MirrorRotationSample {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl MirrorRotationSample {
    pub fn new(azimuth_deg: f64, elevation_deg: f64) -> Self {
        Self {
            azimuth_deg,
            elevation_deg,
        }
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            azimuth_deg: self.azimuth_deg + (other.azimuth_deg - self.azimuth_deg) * t,
            elevation_deg: self.elevation_deg + (other.elevation_deg - self.elevation_deg) * t,
        }
    }
}

/// Anything that can report the mirror bias at a given simulation time.
pub trait MirrorRotationProvider: Send + Sync + Debug {
    /// `time` is in seconds since the start of the simulation.
    fn sample(&self, time: f64) -> MirrorRotationSample;
}

/// A mirror that never moves. Useful when no recording is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMirror(pub MirrorRotationSample);

impl MirrorRotationProvider for StaticMirror {
    fn sample(&self, _time: f64) -> MirrorRotationSample {
        self.0
    }
}

/// A recorded mirror pattern: row `n` holds the bias at `t = n` seconds.
#[derive(Debug)]
pub struct MirrorRotationTable {
    rows: Vec<MirrorRotationSample>,
    out_of_range: MirrorOutOfRange,
    warned_out_of_range: AtomicBool,
}

impl MirrorRotationTable {
    pub fn new(rows: Vec<MirrorRotationSample>, out_of_range: MirrorOutOfRange) -> Result<Self> {
        if rows.is_empty() {
            return Err(LidarError::EmptyMirrorTable);
        }
        Ok(Self {
            rows,
            out_of_range,
            warned_out_of_range: AtomicBool::new(false),
        })
    }

    pub fn from_path(path: impl AsRef<Path>, out_of_range: MirrorOutOfRange) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(File::open(path)?, out_of_range)?;
        info!(
            "Loaded mirror rotation table '{}' covering {} s",
            path.display(),
            table.span_seconds()
        );
        Ok(table)
    }

    /// Parses headerless CSV text with `azimuth_deg,elevation_deg` per line.
    /// Extra columns are ignored and blank lines are skipped.
    pub fn from_reader(reader: impl Read, out_of_range: MirrorOutOfRange) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.len() < 2 {
                return Err(LidarError::MalformedMirrorRow {
                    row,
                    columns: record.len(),
                });
            }
            let parse = |column: usize| -> Result<f64> {
                record[column]
                    .parse::<f64>()
                    .map_err(|_| LidarError::InvalidMirrorValue {
                        row,
                        value: record[column].to_string(),
                    })
            };
            rows.push(MirrorRotationSample::new(parse(0)?, parse(1)?));
        }

        Self::new(rows, out_of_range)
    }

    pub fn rows(&self) -> &[MirrorRotationSample] {
        &self.rows
    }

    /// Time of the last recorded row, in seconds.
    pub fn span_seconds(&self) -> f64 {
        (self.rows.len() - 1) as f64
    }

    fn row(&self, second: usize) -> &MirrorRotationSample {
        match self.out_of_range {
            MirrorOutOfRange::Clamp => &self.rows[second.min(self.rows.len() - 1)],
            MirrorOutOfRange::Wrap => &self.rows[second % self.rows.len()],
        }
    }

    fn note_out_of_range(&self, time: f64) {
        if !self.warned_out_of_range.swap(true, Ordering::Relaxed) {
            warn!(
                "Mirror rotation queried at t = {:.3} s, outside the recorded 0..={} s; applying {:?} policy",
                time,
                self.span_seconds(),
                self.out_of_range
            );
        }
    }
}

impl MirrorRotationProvider for MirrorRotationTable {
    fn sample(&self, time: f64) -> MirrorRotationSample {
        let span = self.span_seconds();
        if !(0.0..=span).contains(&time) {
            self.note_out_of_range(time);
        }

        let time = match self.out_of_range {
            MirrorOutOfRange::Clamp => time.clamp(0.0, span),
            // One period spans every row plus the segment from the last row back to the first.
            MirrorOutOfRange::Wrap => time.rem_euclid(self.rows.len() as f64),
        };
        if time.is_nan() {
            return self.rows[0];
        }

        let prev_second = time.floor();
        let fraction = time - prev_second;
        let prev = prev_second as usize;
        if fraction == 0.0 {
            return *self.row(prev);
        }
        self.row(prev).lerp(self.row(prev + 1), fraction)
    }
}
