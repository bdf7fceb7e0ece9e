//! Regular annual count series
//!
//! `PeriodSeries` is the only input the forecasters accept. It always covers
//! every year between its first and last period; a year without events is a
//! real zero, not a gap.

use crate::data::EventRecord;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Gap-free sequence of `(year, count)` pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSeries {
    start: i32,
    counts: Vec<u64>,
}

impl PeriodSeries {
    /// Create a series whose first entry belongs to `start`
    pub fn new(start: i32, counts: Vec<u64>) -> Self {
        Self { start, counts }
    }

    /// Build a series from explicit pairs, rejecting gaps and disorder
    pub fn from_pairs(pairs: &[(i32, u64)]) -> Result<Self> {
        let Some(&(start, _)) = pairs.first() else {
            return Ok(Self::new(0, Vec::new()));
        };
        for (offset, &(period, _)) in pairs.iter().enumerate() {
            if period != start + offset as i32 {
                return Err(ForecastError::DataError(format!(
                    "Periods must increase by one: expected {}, found {}",
                    start + offset as i32,
                    period
                )));
            }
        }
        Ok(Self::new(start, pairs.iter().map(|&(_, c)| c).collect()))
    }

    /// First year, if any
    pub fn first_period(&self) -> Option<i32> {
        if self.counts.is_empty() {
            None
        } else {
            Some(self.start)
        }
    }

    /// Last year, if any
    pub fn last_period(&self) -> Option<i32> {
        if self.counts.is_empty() {
            None
        } else {
            Some(self.start + self.counts.len() as i32 - 1)
        }
    }

    /// Number of years covered
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True for a series with no years
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Years in order
    pub fn periods(&self) -> Vec<i32> {
        (0..self.counts.len())
            .map(|i| self.start + i as i32)
            .collect()
    }

    /// Event counts in period order
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Counts as floats, for model fitting
    pub fn values(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }

    /// `(year, count)` pairs
    pub fn pairs(&self) -> Vec<(i32, u64)> {
        self.periods()
            .into_iter()
            .zip(self.counts.iter().copied())
            .collect()
    }

    /// Count for one year
    pub fn get(&self, period: i32) -> Option<u64> {
        let offset = period.checked_sub(self.start)?;
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.counts.get(i).copied())
    }

    /// Sub-series covering `start..=end`, clipped to the available years
    pub fn between(&self, start: i32, end: i32) -> Self {
        let (Some(first), Some(last)) = (self.first_period(), self.last_period()) else {
            return self.clone();
        };
        let lo = start.max(first);
        let hi = end.min(last);
        if lo > hi {
            return Self::new(lo, Vec::new());
        }
        let from = (lo - first) as usize;
        let to = (hi - first) as usize + 1;
        Self::new(lo, self.counts[from..to].to_vec())
    }

    /// Sub-series of every year up to and including `period`
    pub fn until(&self, period: i32) -> Self {
        match self.first_period() {
            Some(first) => self.between(first, period),
            None => self.clone(),
        }
    }
}

/// Turns event timestamps into an annual count series
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSeriesAggregator;

impl TimeSeriesAggregator {
    /// Create an aggregator
    pub fn new() -> Self {
        Self
    }

    /// Count events per calendar year, zero-filling years without events
    pub fn aggregate(&self, records: &[EventRecord]) -> Result<PeriodSeries> {
        self.aggregate_timestamps(records.iter().map(|r| r.timestamp))
    }

    /// Count timestamps per calendar year, zero-filling years without events
    pub fn aggregate_timestamps<I>(&self, timestamps: I) -> Result<PeriodSeries>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut per_year: BTreeMap<i32, u64> = BTreeMap::new();
        for ts in timestamps {
            *per_year.entry(ts.year()).or_insert(0) += 1;
        }

        let (Some((&first, _)), Some((&last, _))) =
            (per_year.first_key_value(), per_year.last_key_value())
        else {
            return Err(ForecastError::EmptyInput(
                "No records with a valid timestamp".to_string(),
            ));
        };

        let counts: Vec<u64> = (first..=last)
            .map(|year| per_year.get(&year).copied().unwrap_or(0))
            .collect();
        let empty_years = counts.iter().filter(|&&c| c == 0).count();
        debug!(first, last, empty_years, "aggregated events per year");

        Ok(PeriodSeries::new(first, counts))
    }
}
