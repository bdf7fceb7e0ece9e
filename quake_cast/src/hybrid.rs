//! Unweighted ensemble of independently produced forecasts
//!
//! Forecast sets are inner-joined on period: a year survives only if every
//! input forecasts it. For each surviving year the central estimate is the
//! mean over all inputs. Each bound is the mean of the inputs that supply
//! that bound; if none do, it falls back to the combined estimate.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastPoint, ForecastSet};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A forecast set tagged with the model that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledForecast {
    pub label: String,
    pub forecast: ForecastSet,
}

impl LabeledForecast {
    pub fn new(label: impl Into<String>, forecast: ForecastSet) -> Self {
        Self {
            label: label.into(),
            forecast,
        }
    }
}

/// Result of combining several forecasts; every point carries both bounds
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedForecastSet {
    forecast: ForecastSet,
    contributors: Vec<String>,
}

impl CombinedForecastSet {
    /// The combined forecast
    pub fn forecast(&self) -> &ForecastSet {
        &self.forecast
    }

    /// Consume the result, keeping the forecast
    pub fn into_forecast(self) -> ForecastSet {
        self.forecast
    }

    /// Labels of the inputs, in the order they were given
    pub fn contributors(&self) -> &[String] {
        &self.contributors
    }

    /// Combined points in period order
    pub fn points(&self) -> &[ForecastPoint] {
        self.forecast.points()
    }

    /// Years kept by the join
    pub fn periods(&self) -> Vec<i32> {
        self.forecast.periods()
    }
}

/// Merges forecast sets by period
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridCombiner;

impl HybridCombiner {
    pub fn new() -> Self {
        Self
    }

    /// Combine one or more labelled forecasts.
    ///
    /// Fails with [`ForecastError::NoOverlap`] when `inputs` is empty or
    /// the inputs share no period. A single input combines to itself, with
    /// any missing bound filled from its estimate.
    pub fn combine(&self, inputs: &[LabeledForecast]) -> Result<CombinedForecastSet> {
        let Some(first) = inputs.first() else {
            return Err(ForecastError::NoOverlap);
        };

        let mut shared: BTreeSet<i32> = first.forecast.periods().into_iter().collect();
        for input in &inputs[1..] {
            let periods: BTreeSet<i32> = input.forecast.periods().into_iter().collect();
            shared.retain(|p| periods.contains(p));
        }
        if shared.is_empty() {
            return Err(ForecastError::NoOverlap);
        }

        let mut points = Vec::with_capacity(shared.len());
        for &period in &shared {
            let members: Vec<&ForecastPoint> = inputs
                .iter()
                .filter_map(|input| input.forecast.get(period))
                .collect();
            points.push(combine_point(period, &members));
        }

        let dropped: usize = inputs
            .iter()
            .map(|input| input.forecast.len() - shared.len())
            .sum();
        debug!(dropped, "periods dropped by the join");
        info!(
            inputs = inputs.len(),
            periods = points.len(),
            "combined forecasts"
        );

        Ok(CombinedForecastSet {
            forecast: ForecastSet::new(points)?,
            contributors: inputs.iter().map(|input| input.label.clone()).collect(),
        })
    }
}

fn combine_point(period: i32, members: &[&ForecastPoint]) -> ForecastPoint {
    let predicted = mean(members.iter().map(|p| p.predicted_value));
    let lower = mean_present(members.iter().map(|p| p.lower_bound)).unwrap_or(predicted);
    let upper = mean_present(members.iter().map(|p| p.upper_bound)).unwrap_or(predicted);
    ForecastPoint::with_bounds(period, predicted, lower, upper)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    sum / count as f64
}

/// Mean of the present values, `None` when every value is absent
fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(present.into_iter()))
    }
}
