//! Rate clamping and cumulative re-integration.
//!
//! The perturbed theoretical series is only a proposal: the physically
//! admissible series is rebuilt step by step from per-epoch deltas, so the
//! running sum stays exact even after a delta is clipped.

use rand_chacha::ChaCha8Rng;

use crate::axis::{Axis, AxisTriple};
use crate::noise::gaussian;

/// One admissible per-axis observation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStep {
    pub delta_mm: f64,
    pub rate_mm_day: f64,
    pub cumulative_mm: f64,
}

impl AxisStep {
    /// The start-anchor step: no movement recorded yet.
    pub fn zero() -> Self {
        Self {
            delta_mm: 0.0,
            rate_mm_day: 0.0,
            cumulative_mm: 0.0,
        }
    }
}

/// Clips per-step rates to the axis maxima and keeps the cumulative series
/// consistent with the emitted deltas.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    max_rate_mm_day: AxisTriple<f64>,
    trim_mean: f64,
    trim_std: f64,
}

impl RateLimiter {
    pub fn new(max_rate_mm_day: AxisTriple<f64>, trim_mean: f64, trim_std: f64) -> Self {
        Self {
            max_rate_mm_day,
            trim_mean,
            trim_std,
        }
    }

    /// Interior-epoch step: derive the delta against the running cumulative,
    /// clip it when its implied rate exceeds the axis maximum, and re-derive
    /// the cumulative from the delta that was actually emitted.
    pub fn step(
        &self,
        axis: Axis,
        perturbed_mm: f64,
        prev_cumulative_mm: f64,
        interval_days: i64,
        rng: &mut ChaCha8Rng,
    ) -> AxisStep {
        if interval_days == 0 {
            // Duplicate calendar date: hold the series.
            return AxisStep {
                delta_mm: 0.0,
                rate_mm_day: 0.0,
                cumulative_mm: prev_cumulative_mm,
            };
        }

        let days = interval_days as f64;
        let mut delta = perturbed_mm - prev_cumulative_mm;
        let max_rate = self.max_rate_mm_day.get(axis);
        if (delta / days).abs() > max_rate {
            // Back the delta off the ceiling by a small random margin; the
            // trim always reduces the magnitude.
            let trim = gaussian(rng, self.trim_mean, self.trim_std).abs();
            delta = delta.signum() * (max_rate * days - trim);
        }

        AxisStep {
            delta_mm: delta,
            rate_mm_day: delta / days,
            cumulative_mm: prev_cumulative_mm + delta,
        }
    }

    /// End-anchor step: the cumulative is pinned to the exact total and the
    /// closing delta is exempt from clipping.
    pub fn final_step(&self, total_mm: f64, prev_cumulative_mm: f64, interval_days: i64) -> AxisStep {
        let delta = total_mm - prev_cumulative_mm;
        let rate = if interval_days == 0 {
            0.0
        } else {
            delta / interval_days as f64
        };
        AxisStep {
            delta_mm: delta,
            rate_mm_day: rate,
            cumulative_mm: total_mm,
        }
    }
}
