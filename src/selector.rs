//! Per-point trend-module selection policy.
//!
//! The assignment is a fixed table keyed on the point's numeric suffix, so a
//! survey network gets repeatable shapes with per-point parameter variation.

use crate::curves::{build_curve, CurveError, CurveKind, TrendCurve};
use crate::point::MonitoringPoint;

/// Picks the trend-curve descriptor for a point. `build_fraction` is the
/// construction-period share of the observation window and places the
/// piecewise breakpoints.
pub fn kind_for_point(point: &MonitoringPoint, build_fraction: f64) -> CurveKind {
    let n = f64::from(point.index());
    match point.index() {
        1..=3 => CurveKind::PiecewiseLinear {
            ratio1: 0.01 * (71.0 + n),
            ratio2: 0.01 * (20.0 - n),
            split1: build_fraction / 3.0,
            split2: build_fraction,
            jitter: 0.03,
        },
        4..=5 => CurveKind::ShiftedQuadratic {
            shift: 100.0 * (20.0 + n),
        },
        // TODO: confirm whether points 6-7 need their own tuning; today they
        // carry the same parameters as the catch-all arm below.
        6..=7 => CurveKind::PiecewiseLinear {
            ratio1: 0.01 * (6.0 + n),
            ratio2: 0.01 * (82.0 - n),
            split1: build_fraction / 4.0,
            split2: build_fraction,
            jitter: 0.03,
        },
        _ => CurveKind::PiecewiseLinear {
            ratio1: 0.01 * (6.0 + n),
            ratio2: 0.01 * (82.0 - n),
            split1: build_fraction / 4.0,
            split2: build_fraction,
            jitter: 0.03,
        },
    }
}

/// Builds the ready-to-evaluate curve for a point.
pub fn curve_for_point(
    point: &MonitoringPoint,
    build_fraction: f64,
) -> Result<Box<dyn TrendCurve>, CurveError> {
    build_curve(&kind_for_point(point, build_fraction))
}
