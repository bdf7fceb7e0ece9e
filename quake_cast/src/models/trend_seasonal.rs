//! Piecewise-linear trend with optional Fourier seasonality
//!
//! The series is scaled by its largest absolute count and placed on a unit
//! time axis. The trend is a line plus hinge terms at candidate changepoints
//! spread over the first `changepoint_range` of the history; seasonal terms
//! are sine/cosine pairs on the number of elapsed periods. All coefficients
//! are estimated jointly by ridge-penalised least squares, where the hinge
//! and Fourier penalties play the role of the changepoint and seasonality
//! prior scales.
//!
//! Uncertainty bounds combine the residual scale with the drift implied by
//! the average size of the fitted slope changes, so the interval widens
//! with the forecast step and always brackets the point estimate.

use crate::config::{SeasonalityConfig, TrendSeasonalConfig};
use crate::error::{ForecastError, Result};
use crate::models::{check_horizon, ForecastModel, ForecastSet, TrainedForecastModel};
use crate::series::PeriodSeries;
use quake_math::fourier::fourier_terms;
use quake_math::penalized_least_squares;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Minimum number of periods needed to fit a trend
const MIN_POINTS: usize = 2;

/// Nominal noise level on the scaled series used to turn prior scales into
/// ridge penalties
const NOMINAL_NOISE: f64 = 0.1;

const MIN_RESIDUAL_SCALE: f64 = 1e-6;

/// Trend and seasonality decomposition forecaster
#[derive(Debug, Clone)]
pub struct TrendSeasonalForecaster {
    name: String,
    config: TrendSeasonalConfig,
}

/// Fitted decomposition model
#[derive(Debug, Clone)]
pub struct TrainedTrendSeasonal {
    name: String,
    first_period: i32,
    n_obs: usize,
    y_scale: f64,
    coefficients: Vec<f64>,
    changepoint_offsets: Vec<usize>,
    seasonalities: Vec<SeasonalityConfig>,
    fitted: Vec<f64>,
    residual_scale: f64,
    mean_abs_delta: f64,
    z_score: f64,
}

impl TrendSeasonalForecaster {
    /// Create a forecaster with the given settings
    pub fn new(config: TrendSeasonalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: "Trend/Seasonal".to_string(),
            config,
        })
    }

    /// Settings used for fitting
    pub fn config(&self) -> &TrendSeasonalConfig {
        &self.config
    }
}

impl Default for TrendSeasonalForecaster {
    fn default() -> Self {
        Self {
            name: "Trend/Seasonal".to_string(),
            config: TrendSeasonalConfig::default(),
        }
    }
}

/// Offsets of candidate changepoints within a history of `n_obs` periods.
///
/// Candidates are evenly spaced over the first `range` of the history; the
/// first period is never a changepoint.
pub fn changepoint_offsets(n_obs: usize, n_changepoints: usize, range: f64) -> Vec<usize> {
    let hist_size = (n_obs as f64 * range).floor() as usize;
    let n_cp = if n_changepoints + 1 > hist_size {
        hist_size.saturating_sub(1)
    } else {
        n_changepoints
    };
    if n_cp == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    let mut offsets: Vec<usize> = (1..=n_cp)
        .map(|k| (last * k as f64 / n_cp as f64).round() as usize)
        .collect();
    offsets.dedup();
    offsets
}

/// Design row for `offset` periods after the first training period
fn design_row(
    offset: f64,
    span: f64,
    changepoints: &[f64],
    seasonalities: &[SeasonalityConfig],
) -> Vec<f64> {
    let t = offset / span;
    let mut row = Vec::with_capacity(2 + changepoints.len());
    row.push(1.0);
    row.push(t);
    row.extend(changepoints.iter().map(|&s| (t - s).max(0.0)));
    for season in seasonalities {
        row.extend(fourier_terms(offset, season.period, season.fourier_order));
    }
    row
}

fn dot(row: &[f64], coefficients: &[f64]) -> f64 {
    row.iter().zip(coefficients).map(|(x, b)| x * b).sum()
}

impl ForecastModel for TrendSeasonalForecaster {
    type Trained = TrainedTrendSeasonal;

    fn train(&self, series: &PeriodSeries) -> Result<Self::Trained> {
        let n = series.len();
        if n < MIN_POINTS {
            return Err(ForecastError::InsufficientData {
                needed: MIN_POINTS,
                got: n,
            });
        }
        let first_period = series.first_period().ok_or_else(|| {
            ForecastError::EmptyInput("Training series has no periods".to_string())
        })?;

        let values = series.values();
        let max_abs = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };
        let target: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        let span = (n - 1) as f64;
        let offsets = changepoint_offsets(
            n,
            self.config.n_changepoints,
            self.config.changepoint_range,
        );
        let changepoints: Vec<f64> = offsets.iter().map(|&i| i as f64 / span).collect();

        let design: Vec<Vec<f64>> = (0..n)
            .map(|i| design_row(i as f64, span, &changepoints, &self.config.seasonalities))
            .collect();

        let delta_penalty = (NOMINAL_NOISE / self.config.changepoint_prior_scale).powi(2);
        let season_penalty = (NOMINAL_NOISE / self.config.seasonality_prior_scale).powi(2);
        let n_seasonal: usize = self
            .config
            .seasonalities
            .iter()
            .map(|s| 2 * s.fourier_order)
            .sum();
        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(delta_penalty).take(changepoints.len()));
        penalties.extend(std::iter::repeat(season_penalty).take(n_seasonal));

        let coefficients = penalized_least_squares(&design, &target, &penalties)?;

        let fitted_scaled: Vec<f64> = design.iter().map(|row| dot(row, &coefficients)).collect();
        let mse = fitted_scaled
            .iter()
            .zip(&target)
            .map(|(f, y)| (f - y).powi(2))
            .sum::<f64>()
            / n as f64;
        let residual_scale = mse.sqrt().max(MIN_RESIDUAL_SCALE);

        let deltas = &coefficients[2..2 + changepoints.len()];
        let mean_abs_delta = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64
        };

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let z_score = normal.inverse_cdf(0.5 + self.config.interval_width / 2.0);

        debug!(
            model = %self.name,
            n_obs = n,
            changepoints = offsets.len(),
            residual_scale,
            mean_abs_delta,
            "fitted trend/seasonal model"
        );

        Ok(TrainedTrendSeasonal {
            name: self.name.clone(),
            first_period,
            n_obs: n,
            y_scale,
            coefficients,
            changepoint_offsets: offsets,
            seasonalities: self.config.seasonalities.clone(),
            fitted: fitted_scaled.iter().map(|f| f * y_scale).collect(),
            residual_scale,
            mean_abs_delta,
            z_score,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedTrendSeasonal {
    /// In-sample estimates for the training periods
    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    /// Years at which the trend is allowed to change slope
    pub fn changepoints(&self) -> Vec<i32> {
        self.changepoint_offsets
            .iter()
            .map(|&i| self.first_period + i as i32)
            .collect()
    }

    /// Root mean squared in-sample residual, in counts
    pub fn residual_scale(&self) -> f64 {
        self.residual_scale * self.y_scale
    }

    fn changepoint_locations(&self) -> Vec<f64> {
        let span = (self.n_obs - 1) as f64;
        self.changepoint_offsets
            .iter()
            .map(|&i| i as f64 / span)
            .collect()
    }
}

impl TrainedForecastModel for TrainedTrendSeasonal {
    fn forecast(&self, horizon: usize) -> Result<ForecastSet> {
        check_horizon(horizon)?;

        let span = (self.n_obs - 1) as f64;
        let changepoints = self.changepoint_locations();
        let mut values = Vec::with_capacity(horizon);
        let mut bounds = Vec::with_capacity(horizon);

        for step in 1..=horizon {
            let offset = span + step as f64;
            let row = design_row(offset, span, &changepoints, &self.seasonalities);
            let predicted = dot(&row, &self.coefficients) * self.y_scale;

            let drift = self.mean_abs_delta * (offset / span - 1.0);
            let spread = (self.residual_scale.powi(2) + drift.powi(2)).sqrt();
            let margin = self.z_score * spread * self.y_scale;

            if !predicted.is_finite() || !margin.is_finite() {
                return Err(ForecastError::Math(quake_math::MathError::CalculationError(
                    format!("non-finite forecast at step {}", step),
                )));
            }
            values.push(predicted);
            bounds.push((predicted - margin, predicted + margin));
        }

        ForecastSet::from_values_with_bounds(self.last_period() + 1, &values, &bounds)
    }

    fn last_period(&self) -> i32 {
        self.first_period + self.n_obs as i32 - 1
    }

    fn name(&self) -> &str {
        &self.name
    }
}
