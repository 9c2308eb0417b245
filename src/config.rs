//! Runtime configuration for the series synthesis.

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, AxisTriple};

/// Tunables of the synthesis pipeline. The defaults carry the reference
/// monitoring constants; `seed` is `None` in production so every run draws a
/// fresh series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Maximum admissible displacement rate per axis [mm/day]
    pub max_rate_mm_day: AxisTriple<f64>,
    /// Interior-epoch noise sigma as a fraction of the axis |total|
    pub noise_fraction: f64,
    /// Length of the construction period inside the window [days]
    pub construction_days: f64,
    /// Mean of the clip-trim magnitude draw [mm]
    pub rate_trim_mean: f64,
    /// Std dev of the clip-trim magnitude draw [mm]
    pub rate_trim_std: f64,
    /// RNG seed; `Some` makes runs reproducible
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_rate_mm_day: AxisTriple::new(1.444823, 1.789352, 1.977057),
            noise_fraction: 0.005,
            construction_days: 98.0,
            rate_trim_mean: 0.2,
            rate_trim_std: 0.2,
            seed: None,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        for axis in Axis::ALL {
            anyhow::ensure!(
                self.max_rate_mm_day.get(axis) > 0.0,
                "max rate for axis {} must be > 0",
                axis.label()
            );
        }
        anyhow::ensure!(self.noise_fraction >= 0.0, "noise_fraction must be >= 0");
        anyhow::ensure!(
            self.construction_days > 0.0,
            "construction_days must be > 0"
        );
        anyhow::ensure!(self.rate_trim_std >= 0.0, "rate_trim_std must be >= 0");
        Ok(())
    }
}
