// prism_core/src/noise.rs

use nalgebra::Vector2;
use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A pair of independent standard normal samples drawn with the Marsaglia
/// polar method.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarGaussian;

impl Distribution<Vector2<f64>> for PolarGaussian {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2<f64> {
        loop {
            let u: Vector2<f64> = Vector2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let s = u.norm_squared();
            if s > 0.0 && s < 1.0 {
                return u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }
}

/// The noise stream for one ray in one tick.
///
/// The seed is `master_seed + ray_index`; the tick selects an independent
/// ChaCha stream under that seed so consecutive sweeps do not replay the same
/// jitter, while any (seed, ray, tick) triple is reproducible.
pub fn ray_rng(master_seed: u64, ray_index: u64, tick: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(master_seed.wrapping_add(ray_index));
    rng.set_stream(tick);
    rng
}
