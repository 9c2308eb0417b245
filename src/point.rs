//! Survey points and their synthesis targets.

use serde::{Deserialize, Serialize};

use crate::axis::AxisTriple;

/// One survey point, with the two real anchor readings collapsed into a
/// start value and a net displacement target per axis, both in millimetres.
/// The total is fixed before synthesis and is exactly the value the series
/// reaches at the end anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringPoint {
    pub id: String,
    /// Absolute reading at the start anchor [mm]
    pub start_mm: AxisTriple<f64>,
    /// Net displacement over the window, start - end [mm]
    pub total_mm: AxisTriple<f64>,
}

impl MonitoringPoint {
    pub fn new(id: impl Into<String>, start_mm: AxisTriple<f64>, total_mm: AxisTriple<f64>) -> Self {
        Self {
            id: id.into(),
            start_mm,
            total_mm,
        }
    }

    /// Collapses the two anchor readings into the synthesis target
    /// (total = start - end).
    pub fn from_anchor_readings(
        id: impl Into<String>,
        start_mm: AxisTriple<f64>,
        end_mm: AxisTriple<f64>,
    ) -> Self {
        let total_mm = AxisTriple::from_fn(|axis| start_mm.get(axis) - end_mm.get(axis));
        Self {
            id: id.into(),
            start_mm,
            total_mm,
        }
    }

    /// Numeric suffix of the identifier (JC07 -> 7). Identifiers without a
    /// suffix report 0 and take the selection policy's catch-all parameters.
    pub fn index(&self) -> u32 {
        let digits: Vec<char> = self
            .id
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits
            .into_iter()
            .rev()
            .collect::<String>()
            .parse()
            .unwrap_or(0)
    }
}
