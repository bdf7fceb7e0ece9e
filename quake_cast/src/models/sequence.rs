//! Windowed recurrent forecaster
//!
//! Counts are min-max scaled on the training series, cut into sliding
//! windows of `window` inputs and one target, and used to train an
//! [`Lstm`]. Multi-step forecasts are recursive: each prediction is appended
//! to the input buffer and becomes part of the next window, so step `k`
//! depends only on the observed history and steps `0..k`.

use crate::config::SequenceConfig;
use crate::error::{ForecastError, Result};
use crate::models::lstm::{Lstm, TrainOptions};
use crate::models::{check_horizon, ForecastModel, ForecastSet, TrainedForecastModel};
use crate::series::PeriodSeries;
use quake_math::MinMaxScaler;
use tracing::debug;

/// LSTM-based forecaster over sliding windows of past counts
#[derive(Debug, Clone)]
pub struct SequenceForecaster {
    name: String,
    config: SequenceConfig,
}

/// Trained sequence forecaster
#[derive(Debug, Clone)]
pub struct TrainedSequence {
    name: String,
    last_period: i32,
    window: usize,
    scaler: MinMaxScaler,
    network: Lstm,
    /// Last `window` scaled observations
    history_tail: Vec<f64>,
    loss_history: Vec<f64>,
}

impl SequenceForecaster {
    /// Create a forecaster with the given settings
    pub fn new(config: SequenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: format!("Sequence (window={})", config.window),
            config,
        })
    }

    /// Settings used for training
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }
}

impl Default for SequenceForecaster {
    fn default() -> Self {
        let config = SequenceConfig::default();
        Self {
            name: format!("Sequence (window={})", config.window),
            config,
        }
    }
}

/// Split a series into `(values[i..i + window], values[i + window])` pairs
pub fn sliding_windows(values: &[f64], window: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    if window == 0 || values.len() <= window {
        return (Vec::new(), Vec::new());
    }
    values
        .windows(window + 1)
        .map(|w| (w[..window].to_vec(), w[window]))
        .unzip()
}

/// Roll a one-step predictor forward `horizon` times.
///
/// `seed` is the initial window. At each step `predict_next` receives the
/// step index and the current window, and its output is appended to the
/// buffer before the window advances by one.
pub fn recursive_forecast<F>(seed: &[f64], horizon: usize, mut predict_next: F) -> Vec<f64>
where
    F: FnMut(usize, &[f64]) -> f64,
{
    let window = seed.len();
    let mut buffer = Vec::with_capacity(window + horizon);
    buffer.extend_from_slice(seed);

    for step in 0..horizon {
        let next = predict_next(step, &buffer[step..step + window]);
        buffer.push(next);
    }

    buffer.split_off(window)
}

impl ForecastModel for SequenceForecaster {
    type Trained = TrainedSequence;

    fn train(&self, series: &PeriodSeries) -> Result<Self::Trained> {
        let window = self.config.window;
        let n = series.len();
        if n < window + 1 {
            return Err(ForecastError::InsufficientData {
                needed: window + 1,
                got: n,
            });
        }
        let last_period = series.last_period().ok_or_else(|| {
            ForecastError::EmptyInput("Training series has no periods".to_string())
        })?;

        let values = series.values();
        let scaler = MinMaxScaler::fit(&values)?;
        let scaled = scaler.transform(&values);
        let (inputs, targets) = sliding_windows(&scaled, window);

        let mut network = Lstm::new(
            self.config.hidden_units,
            self.config.activation,
            self.config.seed,
        )?;
        let options = TrainOptions {
            epochs: self.config.epochs,
            batch_size: self.config.batch_size,
            learning_rate: self.config.learning_rate,
            seed: self.config.seed,
        };
        let loss_history = network.fit(&inputs, &targets, &options)?;

        debug!(
            model = %self.name,
            samples = inputs.len(),
            final_loss = loss_history.last().copied().unwrap_or(f64::NAN),
            "trained sequence model"
        );

        Ok(TrainedSequence {
            name: self.name.clone(),
            last_period,
            window,
            scaler,
            network,
            history_tail: scaled[n - window..].to_vec(),
            loss_history,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSequence {
    /// Mean training loss (on the scaled series) after each epoch
    pub fn training_loss(&self) -> &[f64] {
        &self.loss_history
    }

    /// Number of past periods per prediction
    pub fn window(&self) -> usize {
        self.window
    }

    /// Scenario forecast in which some steps are pinned to given counts.
    ///
    /// Each override is `(step, count)` with `step` counted from zero. A
    /// pinned count replaces the model's prediction for that step and is fed
    /// into the following windows as if it had been predicted.
    pub fn forecast_with_overrides(
        &self,
        horizon: usize,
        overrides: &[(usize, f64)],
    ) -> Result<ForecastSet> {
        check_horizon(horizon)?;
        for &(step, count) in overrides {
            if step >= horizon {
                return Err(ForecastError::InvalidParameter(format!(
                    "Override step {} is outside the horizon of {}",
                    step, horizon
                )));
            }
            if !count.is_finite() {
                return Err(ForecastError::InvalidParameter(format!(
                    "Override for step {} is not finite",
                    step
                )));
            }
        }

        let scaled = recursive_forecast(&self.history_tail, horizon, |step, window| {
            match overrides.iter().rev().find(|(s, _)| *s == step) {
                Some(&(_, count)) => self.scaler.transform_value(count),
                None => self.network.predict(window),
            }
        });

        let values = self.scaler.inverse_transform(&scaled);
        if let Some(step) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::Math(quake_math::MathError::CalculationError(
                format!("non-finite forecast at step {}", step),
            )));
        }
        Ok(ForecastSet::from_values(self.last_period + 1, &values))
    }
}

impl TrainedForecastModel for TrainedSequence {
    fn forecast(&self, horizon: usize) -> Result<ForecastSet> {
        self.forecast_with_overrides(horizon, &[])
    }

    fn last_period(&self) -> i32 {
        self.last_period
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Activation;

    fn small_config() -> SequenceConfig {
        SequenceConfig {
            window: 3,
            hidden_units: 6,
            epochs: 15,
            batch_size: 4,
            learning_rate: 0.01,
            seed: 11,
            activation: Activation::Tanh,
        }
    }

    #[test]
    fn test_sliding_windows() {
        let (inputs, targets) = sliding_windows(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(inputs, vec![vec![1.0, 2.0, 3.0], vec![2.0, 3.0, 4.0]]);
        assert_eq!(targets, vec![4.0, 5.0]);

        let (inputs, targets) = sliding_windows(&[1.0, 2.0, 3.0], 3);
        assert!(inputs.is_empty() && targets.is_empty());
    }

    #[test]
    fn test_recursive_forecast_feeds_back_predictions() {
        // Next value = sum of the window
        let out = recursive_forecast(&[1.0, 1.0], 4, |_, w| w.iter().sum());
        assert_eq!(out, vec![2.0, 3.0, 5.0, 8.0]);
    }

    #[test]
    fn test_recursive_forecast_sees_each_step_once() {
        let mut seen = Vec::new();
        recursive_forecast(&[0.0, 0.0, 0.0], 3, |step, w| {
            seen.push((step, w.to_vec()));
            step as f64 + 1.0
        });
        assert_eq!(
            seen,
            vec![
                (0, vec![0.0, 0.0, 0.0]),
                (1, vec![0.0, 0.0, 1.0]),
                (2, vec![0.0, 1.0, 2.0]),
            ]
        );
    }

    #[test]
    fn test_needs_window_plus_one_points() {
        let model = SequenceForecaster::new(small_config()).unwrap();
        let series = PeriodSeries::new(2000, vec![1, 2, 3]);
        let err = model.train(&series).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData { needed: 4, got: 3 }
        ));

        let series = PeriodSeries::new(2000, vec![1, 2, 3, 4]);
        assert!(model.train(&series).is_ok());
    }

    #[test]
    fn test_training_is_reproducible() {
        let series = PeriodSeries::new(1990, vec![3, 5, 4, 6, 8, 7, 9, 12, 10, 11]);
        let model = SequenceForecaster::new(small_config()).unwrap();
        let a = model.train(&series).unwrap().forecast(3).unwrap();
        let b = model.train(&series).unwrap().forecast(3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.periods(), vec![2000, 2001, 2002]);
        assert!(!a.has_bounds());
    }

    #[test]
    fn test_override_outside_horizon_rejected() {
        let series = PeriodSeries::new(1990, vec![3, 5, 4, 6, 8, 7]);
        let trained = SequenceForecaster::new(small_config())
            .unwrap()
            .train(&series)
            .unwrap();
        assert!(trained.forecast_with_overrides(2, &[(2, 10.0)]).is_err());
        assert!(trained.forecast_with_overrides(2, &[(0, f64::NAN)]).is_err());
        assert_eq!(trained.training_loss().len(), 15);
    }
}
