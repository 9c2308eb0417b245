//! The shared observation calendar between the two anchor measurements.

use anyhow::ensure;
use chrono::{Duration, NaiveDate};

/// Ordered epoch dates spanning the observation window. The first date is the
/// start anchor, the last the end anchor; every point is synthesized against
/// the same calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochCalendar {
    epochs: Vec<NaiveDate>,
}

impl EpochCalendar {
    /// Builds a calendar from collaborator-supplied dates. Dates are sorted
    /// ascending; duplicates are kept and resolved by the zero-interval rule
    /// during integration.
    pub fn new(mut epochs: Vec<NaiveDate>) -> anyhow::Result<Self> {
        ensure!(
            epochs.len() >= 2,
            "calendar needs at least the two anchor epochs"
        );
        epochs.sort_unstable();
        ensure!(
            epochs[0] < epochs[epochs.len() - 1],
            "anchor epochs must span a positive number of days"
        );
        Ok(Self { epochs })
    }

    /// Evenly strided calendar from `start` to `end` inclusive.
    pub fn spanning(start: NaiveDate, end: NaiveDate, stride_days: u32) -> anyhow::Result<Self> {
        ensure!(stride_days >= 1, "stride_days must be >= 1");
        ensure!(start < end, "start anchor must precede end anchor");

        let mut epochs = Vec::new();
        let mut date = start;
        while date < end {
            epochs.push(date);
            date = date + Duration::days(i64::from(stride_days));
        }
        epochs.push(end);
        Self::new(epochs)
    }

    pub fn start(&self) -> NaiveDate {
        self.epochs[0]
    }

    pub fn end(&self) -> NaiveDate {
        self.epochs[self.epochs.len() - 1]
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Whole days between the start anchor and `date`.
    pub fn elapsed_days(&self, date: NaiveDate) -> i64 {
        date.signed_duration_since(self.start()).num_days()
    }

    /// Whole days covered by the full window.
    pub fn total_days(&self) -> f64 {
        self.elapsed_days(self.end()) as f64
    }

    /// Share of the window occupied by a construction period of the given
    /// length. Places the piecewise-curve breakpoints.
    pub fn build_fraction(&self, construction_days: f64) -> f64 {
        construction_days / self.total_days()
    }
}
