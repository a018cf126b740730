// prism_core/src/acceptance.rs

//! Turns raw intersections into points the sensor would actually report.

use nalgebra::Point3;
use rayon::prelude::*;

use crate::reflectivity::ReflectivityIndex;
use crate::types::{RayCastRequest, RayCastResult};

/// Power-law range limit: a return from a surface of reflectivity `r`
/// (0..=1) registers only if it is closer than `constant * r^exponent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitAcceptanceModel {
    pub constant: f64,
    pub exponent: f64,
}

impl HitAcceptanceModel {
    pub fn new(constant: f64, exponent: f64) -> Self {
        Self { constant, exponent }
    }

    pub fn threshold(&self, reflectivity: f64) -> f64 {
        self.constant * reflectivity.powf(self.exponent)
    }

    pub fn accepts(&self, distance: f64, reflectivity: f64) -> bool {
        distance < self.threshold(reflectivity)
    }
}

/// Runs the acceptance test for every ray in parallel and replaces the
/// contents of `accepted` with the surviving, range-noised hit points.
///
/// `requests`, `results` and `range_noise` are indexed by the same ray. The
/// order of `accepted` is unspecified.
pub fn accept_hits(
    requests: &[RayCastRequest],
    results: &[RayCastResult],
    range_noise: &[f64],
    reflectivity: &ReflectivityIndex,
    model: &HitAcceptanceModel,
    accepted: &mut Vec<Point3<f64>>,
) {
    debug_assert_eq!(requests.len(), results.len());
    debug_assert_eq!(requests.len(), range_noise.len());

    accepted.clear();
    accepted.par_extend(
        results
            .par_iter()
            .zip(requests.par_iter())
            .zip(range_noise.par_iter())
            .filter_map(|((result, request), noise)| {
                let hit = result.as_ref()?;
                let r = reflectivity.coefficient(hit.object);
                model
                    .accepts(hit.distance, r)
                    .then(|| hit.point + request.direction * *noise)
            }),
    );
}
