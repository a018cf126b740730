// prism_core/src/scan/grid.rs

use nalgebra::{UnitQuaternion, Vector3};
use num_traits::Float;

use crate::error::{LidarError, Result};

/// The sensor's fixed scan pattern: one unit direction per
/// (azimuth step, elevation step), in the sensor's local frame.
///
/// The local frame is right-handed with +Y up and +Z forward. Azimuth step 0
/// looks down +Z and yaw grows towards +X; a positive elevation tilts the ray
/// towards +Y. Directions are stored azimuth-major, so every vertical line
/// of `elevation_steps` rays is contiguous.
#[derive(Debug, Clone)]
pub struct RayGrid {
    azimuth_steps: usize,
    elevation_steps: usize,
    min_elevation_deg: f64,
    max_elevation_deg: f64,
    directions: Vec<Vector3<f64>>,
}

impl RayGrid {
    pub fn build(
        azimuth_steps: usize,
        elevation_steps: usize,
        min_elevation_deg: f64,
        max_elevation_deg: f64,
    ) -> Result<Self> {
        if azimuth_steps == 0 {
            return Err(LidarError::InvalidGrid {
                azimuth_steps,
                elevation_steps,
                reason: "at least one azimuth step is required",
            });
        }
        // The elevation lerp divides by `elevation_steps - 1`.
        if elevation_steps < 2 {
            return Err(LidarError::InvalidGrid {
                azimuth_steps,
                elevation_steps,
                reason: "at least two elevation steps are required",
            });
        }

        let mut directions = Vec::with_capacity(azimuth_steps * elevation_steps);
        for az in 0..azimuth_steps {
            let yaw = (az as f64 / azimuth_steps as f64 * 360.0).to_radians();
            for el in 0..elevation_steps {
                let t = el as f64 / (elevation_steps - 1) as f64;
                let elevation = lerp(min_elevation_deg, max_elevation_deg, t).to_radians();
                directions.push(yaw_pitch(yaw, -elevation) * Vector3::z());
            }
        }

        let directions = directions.into_iter().map(|d| d.normalize()).collect();

        Ok(Self {
            azimuth_steps,
            elevation_steps,
            min_elevation_deg,
            max_elevation_deg,
            directions,
        })
    }

    /// Flattened position of `(az, el)` in `directions()`.
    pub fn index(&self, az: usize, el: usize) -> usize {
        az * self.elevation_steps + el
    }

    pub fn direction(&self, az: usize, el: usize) -> Vector3<f64> {
        self.directions[self.index(az, el)]
    }

    pub fn directions(&self) -> &[Vector3<f64>] {
        &self.directions
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn azimuth_steps(&self) -> usize {
        self.azimuth_steps
    }

    pub fn elevation_steps(&self) -> usize {
        self.elevation_steps
    }

    /// `(min, max)` elevation the grid was built with, in degrees.
    pub fn elevation_limits_deg(&self) -> (f64, f64) {
        (self.min_elevation_deg, self.max_elevation_deg)
    }
}

/// Yaw about +Y applied after pitch about +X, roll fixed at zero.
///
/// Shared with the ray generator so that the grid, the mirror bias and the
/// angular jitter all agree on what "yaw" and "pitch" mean.
pub(crate) fn yaw_pitch(yaw: f64, pitch: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch)
}

fn lerp<T: Float>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test_case(360, 40, -5.5, 53.5 ; "mid360")]
    #[test_case(4, 2, -10.0, 10.0 ; "tiny")]
    #[test_case(7, 3, 0.0, 0.0 ; "flat fan")]
    #[test_case(1, 90, -89.0, 89.0 ; "single meridian")]
    fn every_direction_is_unit_length(az: usize, el: usize, min: f64, max: f64) {
        let grid = RayGrid::build(az, el, min, max).unwrap();
        assert_eq!(grid.len(), az * el);
        for a in 0..az {
            for e in 0..el {
                let len = grid.direction(a, e).norm();
                assert!((len - 1.0).abs() < 1e-5, "({a}, {e}) has length {len}");
            }
        }
    }

    #[test]
    fn rejects_single_elevation_row() {
        assert!(matches!(
            RayGrid::build(360, 1, -5.0, 5.0),
            Err(LidarError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn rejects_zero_azimuth_steps() {
        assert!(RayGrid::build(0, 4, -5.0, 5.0).is_err());
    }

    #[test]
    fn first_ray_is_forward_at_minimum_elevation() {
        let grid = RayGrid::build(4, 3, -30.0, 30.0).unwrap();
        let dir = grid.direction(0, 0);
        let el = (-30.0_f64).to_radians();
        assert_abs_diff_eq!(dir.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dir.y, el.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(dir.z, el.cos(), epsilon = 1e-12);

        // Middle row of a 3-row grid lies on the horizon.
        assert_abs_diff_eq!(grid.direction(0, 1), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn quarter_turn_in_azimuth_faces_plus_x() {
        let grid = RayGrid::build(4, 2, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(grid.direction(1, 0), Vector3::x(), epsilon = 1e-12);
        assert_abs_diff_eq!(grid.direction(2, 0), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn index_is_azimuth_major() {
        let grid = RayGrid::build(4, 2, 0.0, 10.0).unwrap();
        assert_eq!(grid.index(0, 1), 1);
        assert_eq!(grid.index(1, 0), 2);
        assert_eq!(grid.directions()[grid.index(3, 1)], grid.direction(3, 1));
    }
}
