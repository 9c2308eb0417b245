//! Gaussian perturbation of the theoretical trend.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// One N(mean, sigma) draw.
pub(crate) fn gaussian(rng: &mut ChaCha8Rng, mean: f64, sigma: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + sigma * z
}

/// Adds zero-mean Gaussian noise to interior theoretical values, scaled to
/// the axis total so small movers stay smooth and large movers scatter.
#[derive(Debug, Clone, Copy)]
pub struct NoiseInjector {
    noise_fraction: f64,
}

impl NoiseInjector {
    pub fn new(noise_fraction: f64) -> Self {
        Self { noise_fraction }
    }

    /// Perturbs one theoretical value for an axis whose net displacement is
    /// `target`. Every call draws a fresh sample, so epochs and axes stay
    /// independent.
    pub fn perturb(&self, value: f64, target: f64, rng: &mut ChaCha8Rng) -> f64 {
        value + gaussian(rng, 0.0, self.noise_fraction * target.abs())
    }
}
