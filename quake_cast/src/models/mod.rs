//! Forecasting models for annual count series

use crate::error::{ForecastError, Result};
use crate::series::PeriodSeries;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// One forecast period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecast year
    pub period: i32,
    /// Central estimate of the event count
    pub predicted_value: f64,
    /// Lower uncertainty bound, when the model produces one
    pub lower_bound: Option<f64>,
    /// Upper uncertainty bound, when the model produces one
    pub upper_bound: Option<f64>,
}

impl ForecastPoint {
    /// Point estimate without bounds
    pub fn new(period: i32, predicted_value: f64) -> Self {
        Self {
            period,
            predicted_value,
            lower_bound: None,
            upper_bound: None,
        }
    }

    /// Point estimate with both bounds
    pub fn with_bounds(period: i32, predicted_value: f64, lower: f64, upper: f64) -> Self {
        Self {
            period,
            predicted_value,
            lower_bound: Some(lower),
            upper_bound: Some(upper),
        }
    }
}

/// Forecast over contiguous, strictly increasing periods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSet {
    points: Vec<ForecastPoint>,
}

impl ForecastSet {
    /// Create a forecast set, rejecting gaps and duplicate periods
    pub fn new(points: Vec<ForecastPoint>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].period != pair[0].period + 1 {
                return Err(ForecastError::DataError(format!(
                    "Forecast periods must be contiguous: {} followed by {}",
                    pair[0].period, pair[1].period
                )));
            }
        }
        Ok(Self { points })
    }

    /// Bound-free forecast starting at `first_period`
    pub fn from_values(first_period: i32, values: &[f64]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ForecastPoint::new(first_period + i as i32, v))
            .collect();
        Self { points }
    }

    /// Forecast with `(lower, upper)` bounds starting at `first_period`
    pub fn from_values_with_bounds(
        first_period: i32,
        values: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<Self> {
        if values.len() != bounds.len() {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match bounds length ({})",
                values.len(),
                bounds.len()
            )));
        }
        let points = values
            .iter()
            .zip(bounds)
            .enumerate()
            .map(|(i, (&v, &(lo, hi)))| ForecastPoint::with_bounds(first_period + i as i32, v, lo, hi))
            .collect();
        Ok(Self { points })
    }

    /// Forecast points in period order
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Forecast years in order
    pub fn periods(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.period).collect()
    }

    /// Central estimates in period order
    pub fn predicted_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_value).collect()
    }

    /// True when every point carries both bounds
    pub fn has_bounds(&self) -> bool {
        !self.points.is_empty()
            && self
                .points
                .iter()
                .all(|p| p.lower_bound.is_some() && p.upper_bound.is_some())
    }

    /// Point for one year
    pub fn get(&self, period: i32) -> Option<&ForecastPoint> {
        let first = self.points.first()?.period;
        let offset = usize::try_from(period.checked_sub(first)?).ok()?;
        self.points.get(offset)
    }

    /// Number of forecast periods
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for an empty forecast
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Forecast the `horizon` years following the last training year
    fn forecast(&self, horizon: usize) -> Result<ForecastSet>;

    /// Last year of the training series
    fn last_period(&self) -> i32;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on an annual count series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a count series
    fn train(&self, series: &PeriodSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Reject a zero horizon, which no model can satisfy
pub(crate) fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Horizon must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub mod lstm;
pub mod sequence;
pub mod trend_seasonal;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_gaps_and_duplicates() {
        let gap = vec![ForecastPoint::new(2022, 1.0), ForecastPoint::new(2024, 1.0)];
        assert!(ForecastSet::new(gap).is_err());

        let dup = vec![ForecastPoint::new(2022, 1.0), ForecastPoint::new(2022, 2.0)];
        assert!(ForecastSet::new(dup).is_err());

        let ok = vec![ForecastPoint::new(2022, 1.0), ForecastPoint::new(2023, 2.0)];
        assert_eq!(ForecastSet::new(ok).unwrap().periods(), vec![2022, 2023]);
    }

    #[test]
    fn test_lookup_and_bounds() {
        let set =
            ForecastSet::from_values_with_bounds(2030, &[5.0, 6.0], &[(4.0, 6.0), (5.0, 7.0)])
                .unwrap();
        assert!(set.has_bounds());
        assert_eq!(set.get(2031).map(|p| p.predicted_value), Some(6.0));
        assert!(set.get(2029).is_none());
        assert!(set.get(2032).is_none());

        let bare = ForecastSet::from_values(2030, &[5.0]);
        assert!(!bare.has_bounds());
        assert_eq!(bare.get(2030).and_then(|p| p.lower_bound), None);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        assert!(check_horizon(0).is_err());
        assert!(check_horizon(1).is_ok());
    }
}
