// prism_core/src/generator.rs

use nalgebra::{Vector2, Vector3};
use rand::distributions::Distribution;
use rayon::prelude::*;

use crate::config::LidarConfig;
use crate::mirror::MirrorRotationSample;
use crate::noise::{ray_rng, PolarGaussian};
use crate::scan::grid::yaw_pitch;
use crate::types::{RayCastRequest, SensorPose};

/// Everything a ray task reads besides its own base direction. Shared
/// read-only by all tasks of a tick.
#[derive(Debug, Clone, Copy)]
pub struct RayGenerationInput {
    pub pose: SensorPose,
    pub mirror: MirrorRotationSample,
    /// Monotonic tick counter; selects the noise stream.
    pub tick: u64,
    /// Grid index of the first direction in the active slice.
    pub first_ray_index: usize,
}

/// Produces world-space cast requests with angular jitter, plus an
/// independent range-noise sample per ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoisyRayGenerator {
    angular_sigma_rad: f64,
    range_sigma: f64,
    min_range: f64,
    max_range: f64,
    master_seed: u64,
}

impl NoisyRayGenerator {
    pub fn new(config: &LidarConfig, master_seed: u64) -> Self {
        Self {
            angular_sigma_rad: config.angular_noise_deg.to_radians(),
            range_sigma: config.range_noise_m,
            min_range: config.min_range_m,
            max_range: config.max_range_m,
            master_seed,
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Fills `requests[i]` and `range_noise[i]` from `directions[i]`, one
    /// parallel task per ray.
    pub fn generate(
        &self,
        directions: &[Vector3<f64>],
        input: &RayGenerationInput,
        requests: &mut [RayCastRequest],
        range_noise: &mut [f64],
    ) {
        debug_assert_eq!(directions.len(), requests.len());
        debug_assert_eq!(directions.len(), range_noise.len());

        requests
            .par_iter_mut()
            .zip(range_noise.par_iter_mut())
            .zip(directions.par_iter())
            .enumerate()
            .for_each(|(i, ((request, noise), direction))| {
                let (ray, offset) = self.noisy_ray(direction, input.first_ray_index + i, input);
                *request = ray;
                *noise = offset;
            });
    }

    /// One ray task. A pure function of the master seed, `ray_index` and `input`.
    pub fn noisy_ray(
        &self,
        direction: &Vector3<f64>,
        ray_index: usize,
        input: &RayGenerationInput,
    ) -> (RayCastRequest, f64) {
        let mut rng = ray_rng(self.master_seed, ray_index as u64, input.tick);

        let sensor_dir = input.pose.rotation * direction;

        let bias = yaw_pitch(
            input.mirror.azimuth_deg.to_radians(),
            -input.mirror.elevation_deg.to_radians(),
        );

        let angular: Vector2<f64> = PolarGaussian.sample(&mut rng);
        let jitter = yaw_pitch(
            angular.x * self.angular_sigma_rad,
            angular.y * self.angular_sigma_rad,
        );

        let world_dir = ((bias * jitter) * sensor_dir).normalize();

        let range: Vector2<f64> = PolarGaussian.sample(&mut rng);
        let range_offset = range.x * self.range_sigma;

        // Start just outside the sensor housing.
        let origin = input.pose.translation.vector + world_dir * self.min_range;

        (
            RayCastRequest {
                origin: origin.into(),
                direction: world_dir,
                max_range: self.max_range,
            },
            range_offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::RayGrid;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Isometry3, Translation3, UnitQuaternion};

    fn quiet_config() -> LidarConfig {
        LidarConfig {
            angular_noise_deg: 0.0,
            range_noise_m: 0.0,
            min_range_m: 0.1,
            max_range_m: 50.0,
            ..Default::default()
        }
    }

    fn input(pose: SensorPose, mirror: MirrorRotationSample) -> RayGenerationInput {
        RayGenerationInput {
            pose,
            mirror,
            tick: 5,
            first_ray_index: 0,
        }
    }

    #[test]
    fn zero_noise_returns_the_base_direction() {
        let grid = RayGrid::build(8, 4, -10.0, 30.0).unwrap();
        let generator = NoisyRayGenerator::new(&quiet_config(), 99);
        let input = input(Isometry3::identity(), MirrorRotationSample::default());

        let mut requests = vec![RayCastRequest::default(); grid.len()];
        let mut noise = vec![1.0; grid.len()];
        generator.generate(grid.directions(), &input, &mut requests, &mut noise);

        for (request, base) in requests.iter().zip(grid.directions()) {
            assert_abs_diff_eq!(request.direction, *base, epsilon = 1e-12);
            assert_abs_diff_eq!(request.origin.coords, base * 0.1, epsilon = 1e-12);
            assert_eq!(request.max_range, 50.0);
        }
        assert!(noise.iter().all(|n| *n == 0.0));
    }

    #[test]
    fn output_is_reproducible_for_a_seed() {
        let grid = RayGrid::build(36, 4, -10.0, 30.0).unwrap();
        let generator = NoisyRayGenerator::new(&LidarConfig::default(), 1234);
        let input = RayGenerationInput {
            pose: Isometry3::translation(1.0, 2.0, 3.0),
            mirror: MirrorRotationSample::new(3.0, -1.5),
            tick: 17,
            first_ray_index: 40,
        };

        let run = || {
            let mut requests = vec![RayCastRequest::default(); grid.len()];
            let mut noise = vec![0.0; grid.len()];
            generator.generate(grid.directions(), &input, &mut requests, &mut noise);
            (requests, noise)
        };

        let (first_requests, first_noise) = run();
        let (second_requests, second_noise) = run();
        assert_eq!(first_requests, second_requests);
        assert_eq!(first_noise, second_noise);

        // The parallel path agrees with the single-ray function.
        let (single, offset) = generator.noisy_ray(&grid.directions()[3], 43, &input);
        assert_eq!(single, first_requests[3]);
        assert_eq!(offset, first_noise[3]);
    }

    #[test]
    fn noise_is_small_and_changes_between_ticks() {
        let generator = NoisyRayGenerator::new(&LidarConfig::default(), 7);
        let base = Vector3::z();
        let at_tick = |tick| {
            let input = RayGenerationInput {
                tick,
                ..input(Isometry3::identity(), MirrorRotationSample::default())
            };
            generator.noisy_ray(&base, 0, &input)
        };

        let (first, first_offset) = at_tick(1);
        let (second, second_offset) = at_tick(2);
        assert_ne!(first.direction, second.direction);
        assert_ne!(first_offset, second_offset);

        // 0.15 degree sigma: anything beyond a few degrees would be a bug.
        for request in [first, second] {
            assert_abs_diff_eq!(request.direction.norm(), 1.0, epsilon = 1e-12);
            assert!(request.direction.angle(&base) < 2.0_f64.to_radians());
        }
    }

    #[test]
    fn sensor_pose_and_mirror_bias_rotate_the_ray() {
        let generator = NoisyRayGenerator::new(&quiet_config(), 0);
        let yaw_left = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 90f64.to_radians());
        let pose = Isometry3::from_parts(Translation3::new(0.0, 1.0, 1.0), yaw_left);

        let (request, _) =
            generator.noisy_ray(&Vector3::z(), 0, &input(pose, MirrorRotationSample::default()));
        assert_abs_diff_eq!(request.direction, Vector3::x(), epsilon = 1e-12);
        assert_abs_diff_eq!(
            request.origin.coords,
            Vector3::new(0.1, 1.0, 1.0),
            epsilon = 1e-12
        );

        // A positive elevation bias lifts a horizontal ray.
        let (lifted, _) = generator.noisy_ray(
            &Vector3::z(),
            0,
            &input(Isometry3::identity(), MirrorRotationSample::new(0.0, 30.0)),
        );
        let el = 30f64.to_radians();
        assert_abs_diff_eq!(lifted.direction, Vector3::new(0.0, el.sin(), el.cos()), epsilon = 1e-12);
    }
}
