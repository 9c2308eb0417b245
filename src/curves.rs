//! Theoretical displacement-trend curve family.
//!
//! Each curve maps elapsed days to a cumulative displacement for one axis of
//! one point, pinned to `v(t <= 0) = 0` and `v(t >= total_days) = target` with
//! a monotone trend of `sign(target)` in between.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::axis::{Axis, AxisTriple};

/// Interior value substituted by the shifted-quadratic curve when an extreme
/// shift pushes the trend across zero [mm].
const SIGN_GUARD_MM: AxisTriple<f64> = AxisTriple {
    x: 0.03,
    y: 0.04,
    z: 0.05,
};

/// Invalid shape parameters. The selection policy fixes these internally, so
/// hitting one of these variants is a programming defect and aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("log base must be > 1, got {0}")]
    LogBase(f64),
    #[error("log offset must lie in (0, 0.1), got {0}")]
    LogOffset(f64),
    #[error("segment ratios must satisfy 0 <= r1, r2 <= 1 and r1 + r2 <= 1, got r1={r1}, r2={r2}")]
    SegmentRatios { r1: f64, r2: f64 },
    #[error("breakpoints must satisfy 0 < split1 < split2 < 1, got split1={split1}, split2={split2}")]
    Breakpoints { split1: f64, split2: f64 },
    #[error("ratio jitter must lie in [0, 0.3], got {0}")]
    Jitter(f64),
}

/// A theoretical cumulative-displacement trend.
///
/// `elapsed` and `total_days` are whole days since the start anchor; `target`
/// is the net displacement the curve reaches at the end anchor [mm]. The
/// generator is only consumed by curves with a stochastic component.
pub trait TrendCurve {
    fn cumulative(
        &self,
        axis: Axis,
        elapsed: f64,
        total_days: f64,
        target: f64,
        rng: &mut ChaCha8Rng,
    ) -> f64;

    /// Evaluates all three axes in one call. Curves with a stochastic
    /// component share one draw across the axes here; the per-axis entry
    /// point draws independently per call.
    fn cumulative_xyz(
        &self,
        elapsed: f64,
        total_days: f64,
        targets: AxisTriple<f64>,
        rng: &mut ChaCha8Rng,
    ) -> AxisTriple<f64> {
        AxisTriple::from_fn(|axis| {
            self.cumulative(axis, elapsed, total_days, targets.get(axis), rng)
        })
    }
}

/// Concave logarithmic trend: steep early movement that flattens out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogCurve {
    log_base: f64,
    offset: f64,
}

impl LogCurve {
    pub fn new(log_base: f64, offset: f64) -> Result<Self, CurveError> {
        if log_base <= 1.0 {
            return Err(CurveError::LogBase(log_base));
        }
        if offset <= 0.0 || offset >= 0.1 {
            return Err(CurveError::LogOffset(offset));
        }
        Ok(Self { log_base, offset })
    }
}

impl TrendCurve for LogCurve {
    fn cumulative(
        &self,
        _axis: Axis,
        elapsed: f64,
        total_days: f64,
        target: f64,
        _rng: &mut ChaCha8Rng,
    ) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }
        if elapsed >= total_days {
            return target;
        }
        let max_log = (total_days + self.offset).log(self.log_base);
        let current_log = (elapsed + self.offset + 1.0).log(self.log_base);
        target * current_log / max_log
    }
}

/// Three linear segments through two jittered interior breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseLinearCurve {
    ratio1: f64,
    ratio2: f64,
    split1: f64,
    split2: f64,
    jitter: f64,
}

impl PiecewiseLinearCurve {
    /// `ratio1`/`ratio2` are the displacement shares of the first two
    /// segments, `split1`/`split2` the breakpoint fractions of the window,
    /// `jitter` the relative bound of the per-call ratio perturbation.
    pub fn new(
        ratio1: f64,
        ratio2: f64,
        split1: f64,
        split2: f64,
        jitter: f64,
    ) -> Result<Self, CurveError> {
        if !(0.0..=1.0).contains(&ratio1) || !(0.0..=1.0).contains(&ratio2) || ratio1 + ratio2 > 1.0
        {
            return Err(CurveError::SegmentRatios {
                r1: ratio1,
                r2: ratio2,
            });
        }
        if !(split1 > 0.0 && split1 < split2 && split2 < 1.0) {
            return Err(CurveError::Breakpoints { split1, split2 });
        }
        if !(0.0..=0.3).contains(&jitter) {
            return Err(CurveError::Jitter(jitter));
        }
        Ok(Self {
            ratio1,
            ratio2,
            split1,
            split2,
            jitter,
        })
    }

    /// One jittered (ratio1', ratio2') draw, rescaled so the sum never
    /// exceeds 1.
    fn draw_ratios(&self, rng: &mut ChaCha8Rng) -> (f64, f64) {
        let mut r1 = self.ratio1 * (1.0 + rng.gen_range(-self.jitter..=self.jitter));
        let mut r2 = self.ratio2 * (1.0 + rng.gen_range(-self.jitter..=self.jitter));
        let sum = r1 + r2;
        if sum > 1.0 {
            r1 /= sum;
            r2 /= sum;
        }
        (r1, r2)
    }

    fn value_with_ratios(
        &self,
        elapsed: f64,
        total_days: f64,
        target: f64,
        r1: f64,
        r2: f64,
    ) -> f64 {
        let t1 = self.split1 * total_days;
        let t2 = self.split2 * total_days;
        let break1 = target * r1;
        let break2 = target * (r1 + r2);

        if elapsed <= t1 {
            break1 * (elapsed / t1)
        } else if elapsed <= t2 {
            break1 + (break2 - break1) * ((elapsed - t1) / (t2 - t1))
        } else {
            break2 + (target - break2) * ((elapsed - t2) / (total_days - t2))
        }
    }
}

impl TrendCurve for PiecewiseLinearCurve {
    fn cumulative(
        &self,
        _axis: Axis,
        elapsed: f64,
        total_days: f64,
        target: f64,
        rng: &mut ChaCha8Rng,
    ) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }
        if elapsed >= total_days {
            return target;
        }
        let (r1, r2) = self.draw_ratios(rng);
        self.value_with_ratios(elapsed, total_days, target, r1, r2)
    }

    fn cumulative_xyz(
        &self,
        elapsed: f64,
        total_days: f64,
        targets: AxisTriple<f64>,
        rng: &mut ChaCha8Rng,
    ) -> AxisTriple<f64> {
        if elapsed <= 0.0 {
            return AxisTriple::splat(0.0);
        }
        if elapsed >= total_days {
            return targets;
        }
        // One draw shared by all three axes, independent per-axis targets.
        let (r1, r2) = self.draw_ratios(rng);
        AxisTriple::from_fn(|axis| {
            self.value_with_ratios(elapsed, total_days, targets.get(axis), r1, r2)
        })
    }
}

/// Quadratic trend with an adjustable effective coefficient. Extreme shifts
/// can push interior values across zero; those are floored to a small signed
/// constant so the trend direction survives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftedQuadraticCurve {
    shift: f64,
}

impl ShiftedQuadraticCurve {
    /// `shift` adjusts the effective coefficient; useful values stay roughly
    /// within -4000..4000.
    pub fn new(shift: f64) -> Self {
        Self { shift }
    }
}

impl TrendCurve for ShiftedQuadraticCurve {
    fn cumulative(
        &self,
        axis: Axis,
        elapsed: f64,
        total_days: f64,
        target: f64,
        _rng: &mut ChaCha8Rng,
    ) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }
        if elapsed >= total_days {
            return target;
        }
        let ratio = target / (total_days * total_days - self.shift);
        let value = -ratio * (elapsed - total_days).powi(2) + target;
        if opposite_sign(value, target) {
            target.signum() * SIGN_GUARD_MM.get(axis)
        } else {
            value
        }
    }
}

/// Plain convex-decelerating quadratic trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadraticCurve;

impl TrendCurve for QuadraticCurve {
    fn cumulative(
        &self,
        _axis: Axis,
        elapsed: f64,
        total_days: f64,
        target: f64,
        _rng: &mut ChaCha8Rng,
    ) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }
        if elapsed >= total_days {
            return target;
        }
        let ratio = target / (total_days * total_days);
        -ratio * (elapsed - total_days).powi(2) + target
    }
}

fn opposite_sign(a: f64, b: f64) -> bool {
    (a >= 0.0) != (b >= 0.0)
}

/// Serializable descriptor of a trend curve and its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CurveKind {
    Logarithmic {
        log_base: f64,
        offset: f64,
    },
    PiecewiseLinear {
        ratio1: f64,
        ratio2: f64,
        split1: f64,
        split2: f64,
        jitter: f64,
    },
    ShiftedQuadratic {
        shift: f64,
    },
    Quadratic,
}

impl CurveKind {
    pub fn curve_type(&self) -> &'static str {
        match self {
            CurveKind::Logarithmic { .. } => "logarithmic",
            CurveKind::PiecewiseLinear { .. } => "piecewise_linear",
            CurveKind::ShiftedQuadratic { .. } => "shifted_quadratic",
            CurveKind::Quadratic => "quadratic",
        }
    }
}

pub fn build_curve(kind: &CurveKind) -> Result<Box<dyn TrendCurve>, CurveError> {
    match kind {
        CurveKind::Logarithmic { log_base, offset } => {
            Ok(Box::new(LogCurve::new(*log_base, *offset)?))
        }
        CurveKind::PiecewiseLinear {
            ratio1,
            ratio2,
            split1,
            split2,
            jitter,
        } => Ok(Box::new(PiecewiseLinearCurve::new(
            *ratio1, *ratio2, *split1, *split2, *jitter,
        )?)),
        CurveKind::ShiftedQuadratic { shift } => Ok(Box::new(ShiftedQuadraticCurve::new(*shift))),
        CurveKind::Quadratic => Ok(Box::new(QuadraticCurve)),
    }
}
