//! Synthesized records and the CSV/JSON writers around them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;

use crate::axis::{Axis, AxisTriple};
use crate::config::SynthConfig;
use crate::limiter::AxisStep;
use crate::point::MonitoringPoint;

const MM_PER_M: f64 = 1000.0;

/// One synthesized observation row. Field order is the exported column
/// order: date, point, then per-axis groups of position [m], step [mm],
/// rate [mm/day], cumulative [mm].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    pub date: NaiveDate,
    pub point: String,

    pub x_position_m: f64,
    pub x_delta_mm: f64,
    pub x_rate_mm_day: f64,
    pub x_cumulative_mm: f64,

    pub y_position_m: f64,
    pub y_delta_mm: f64,
    pub y_rate_mm_day: f64,
    pub y_cumulative_mm: f64,

    pub z_position_m: f64,
    pub z_delta_mm: f64,
    pub z_rate_mm_day: f64,
    pub z_cumulative_mm: f64,
}

impl SeriesRecord {
    pub fn new(date: NaiveDate, point: &MonitoringPoint, steps: &AxisTriple<AxisStep>) -> Self {
        let position = |axis: Axis| {
            (point.start_mm.get(axis) - steps.get(axis).cumulative_mm) / MM_PER_M
        };
        Self {
            date,
            point: point.id.clone(),

            x_position_m: position(Axis::X),
            x_delta_mm: steps.x.delta_mm,
            x_rate_mm_day: steps.x.rate_mm_day,
            x_cumulative_mm: steps.x.cumulative_mm,

            y_position_m: position(Axis::Y),
            y_delta_mm: steps.y.delta_mm,
            y_rate_mm_day: steps.y.rate_mm_day,
            y_cumulative_mm: steps.y.cumulative_mm,

            z_position_m: position(Axis::Z),
            z_delta_mm: steps.z.delta_mm,
            z_rate_mm_day: steps.z.rate_mm_day,
            z_cumulative_mm: steps.z.cumulative_mm,
        }
    }

    pub fn position_m(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_position_m,
            Axis::Y => self.y_position_m,
            Axis::Z => self.z_position_m,
        }
    }

    pub fn delta_mm(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_delta_mm,
            Axis::Y => self.y_delta_mm,
            Axis::Z => self.z_delta_mm,
        }
    }

    pub fn rate_mm_day(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_rate_mm_day,
            Axis::Y => self.y_rate_mm_day,
            Axis::Z => self.z_rate_mm_day,
        }
    }

    pub fn cumulative_mm(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_cumulative_mm,
            Axis::Y => self.y_cumulative_mm,
            Axis::Z => self.z_cumulative_mm,
        }
    }
}

/// Which curve a point was assigned, for the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct PointCurve {
    pub point: String,
    pub curve: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub output_dir: PathBuf,
    pub csv_path: PathBuf,
    pub summary_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub config: SynthConfig,
    pub points: usize,
    pub epochs: usize,
    pub records: usize,
    pub curves: Vec<PointCurve>,
    pub outputs: OutputFiles,
}

pub fn write_csv(path: &Path, records: &[SeriesRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open CSV path {}", path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = serde_json::to_string_pretty(summary)?;
    fs::write(path, data)
        .with_context(|| format!("failed to write summary {}", path.display()))?;
    Ok(())
}
