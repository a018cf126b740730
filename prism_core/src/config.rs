// prism_core/src/config.rs

//! Sensor parameters. The defaults describe a Livox MID-360 running inside a
//! 50 Hz simulation.

use serde::{Deserialize, Serialize};

use crate::error::{LidarError, Result};

/// What the mirror rotation provider does when asked for a time outside the
/// recorded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorOutOfRange {
    /// Hold the first/last recorded row.
    #[default]
    Clamp,
    /// Treat the table as one period of a repeating pattern.
    Wrap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LidarConfig {
    pub azimuth_steps: usize,
    /// Number of rays in each vertical line.
    pub elevation_steps: usize,
    /// Lower edge of the vertical field of view before shrinkage, in degrees.
    pub min_elevation_deg: f64,
    /// Upper edge of the vertical field of view before shrinkage, in degrees.
    pub max_elevation_deg: f64,
    /// Pulled in from both edges of the vertical field of view, in degrees.
    pub fov_shrinkage_deg: f64,
    /// Standard deviation of the per-ray angular jitter, in degrees.
    pub angular_noise_deg: f64,
    /// Standard deviation of the per-ray range offset, in meters.
    pub range_noise_m: f64,
    pub min_range_m: f64,
    pub max_range_m: f64,
    /// `C` in the acceptance threshold `C * r^k`.
    pub acceptance_constant: f64,
    /// `k` in the acceptance threshold `C * r^k`.
    pub acceptance_exponent: f64,
    /// Full sweeps per second.
    pub scan_rate_hz: u32,
    /// Host ticks per second.
    pub simulation_rate_hz: u32,
    /// Base of every per-ray noise seed. `None` lets the host pick one.
    pub master_seed: Option<u64>,
    pub mirror_out_of_range: MirrorOutOfRange,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            azimuth_steps: 360,
            elevation_steps: 40,
            min_elevation_deg: -7.22,
            max_elevation_deg: 55.22,
            fov_shrinkage_deg: 1.72,
            angular_noise_deg: 0.15,
            range_noise_m: 0.03,
            min_range_m: 0.1,
            max_range_m: 85.0,
            acceptance_constant: 15.23,
            acceptance_exponent: 0.369,
            scan_rate_hz: 10,
            simulation_rate_hz: 50,
            master_seed: None,
            mirror_out_of_range: MirrorOutOfRange::Clamp,
        }
    }
}

impl LidarConfig {
    /// The vertical field of view actually swept, after shrinkage: `(min, max)`.
    pub fn effective_elevation_deg(&self) -> (f64, f64) {
        (
            self.min_elevation_deg + self.fov_shrinkage_deg,
            self.max_elevation_deg - self.fov_shrinkage_deg,
        )
    }

    pub fn grid_size(&self) -> usize {
        self.azimuth_steps * self.elevation_steps
    }

    /// Checks every scalar parameter. Grid and section arithmetic is checked by
    /// `RayGrid::build` and `ScanSectioner::new`, which own those rules.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("min_elevation_deg", self.min_elevation_deg),
            ("max_elevation_deg", self.max_elevation_deg),
            ("fov_shrinkage_deg", self.fov_shrinkage_deg),
            ("angular_noise_deg", self.angular_noise_deg),
            ("range_noise_m", self.range_noise_m),
            ("min_range_m", self.min_range_m),
            ("max_range_m", self.max_range_m),
            ("acceptance_constant", self.acceptance_constant),
            ("acceptance_exponent", self.acceptance_exponent),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(LidarError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }

        for (name, value) in [
            ("angular_noise_deg", self.angular_noise_deg),
            ("range_noise_m", self.range_noise_m),
            ("min_range_m", self.min_range_m),
        ] {
            if value < 0.0 {
                return Err(LidarError::InvalidParameter {
                    name,
                    value,
                    reason: "must not be negative",
                });
            }
        }

        if self.max_range_m <= self.min_range_m {
            return Err(LidarError::InvalidParameter {
                name: "max_range_m",
                value: self.max_range_m,
                reason: "must exceed min_range_m",
            });
        }

        let (min_el, max_el) = self.effective_elevation_deg();
        if min_el > max_el {
            return Err(LidarError::InvalidParameter {
                name: "fov_shrinkage_deg",
                value: self.fov_shrinkage_deg,
                reason: "shrinkage inverts the vertical field of view",
            });
        }

        if self.scan_rate_hz == 0 {
            return Err(LidarError::InvalidParameter {
                name: "scan_rate_hz",
                value: 0.0,
                reason: "must be positive",
            });
        }
        if self.simulation_rate_hz == 0 {
            return Err(LidarError::InvalidParameter {
                name: "simulation_rate_hz",
                value: 0.0,
                reason: "must be positive",
            });
        }

        Ok(())
    }
}
