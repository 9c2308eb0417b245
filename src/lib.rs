//! settlegen - ground-settlement monitoring series synthesis.
//!
//! Backfills per-epoch readings (position, step, rate, cumulative) between
//! two real anchor measurements per survey point: a family of parametric
//! displacement-trend curves, a per-point selection policy, Gaussian
//! perturbation, and rate-limited re-integration that keeps every series
//! kinematically admissible.

pub mod axis;
pub mod calendar;
pub mod config;
pub mod curves;
pub mod limiter;
pub mod noise;
pub mod output;
pub mod point;
pub mod selector;
pub mod synthesis;

// Re-export main types
pub use axis::{Axis, AxisTriple};
pub use calendar::EpochCalendar;
pub use config::SynthConfig;
pub use curves::{
    build_curve, CurveError, CurveKind, LogCurve, PiecewiseLinearCurve, QuadraticCurve,
    ShiftedQuadraticCurve, TrendCurve,
};
pub use limiter::{AxisStep, RateLimiter};
pub use noise::NoiseInjector;
pub use output::{write_csv, write_summary, OutputFiles, PointCurve, RunSummary, SeriesRecord};
pub use point::MonitoringPoint;
pub use selector::{curve_for_point, kind_for_point};
pub use synthesis::{synthesize, synthesize_with_rng};
