//! Forecast shape and behaviour of both forecasters

use approx::assert_relative_eq;
use proptest::prelude::*;
use quake_cast::config::{Activation, SequenceConfig, TrendSeasonalConfig};
use quake_cast::models::sequence::{SequenceForecaster, TrainedSequence};
use quake_cast::models::trend_seasonal::TrendSeasonalForecaster;
use quake_cast::models::{ForecastModel, ForecastSet, TrainedForecastModel};
use quake_cast::series::PeriodSeries;
use quake_cast::ForecastError;
use rstest::rstest;

fn sample_series() -> PeriodSeries {
    PeriodSeries::new(
        2008,
        vec![142, 151, 139, 160, 171, 158, 175, 182, 169, 190, 201, 196, 210, 208],
    )
}

fn small_sequence_config() -> SequenceConfig {
    SequenceConfig {
        window: 3,
        hidden_units: 8,
        epochs: 20,
        batch_size: 4,
        learning_rate: 0.01,
        seed: 42,
        activation: Activation::Tanh,
    }
}

fn trained_sequence() -> TrainedSequence {
    SequenceForecaster::new(small_sequence_config())
        .unwrap()
        .train(&sample_series())
        .unwrap()
}

fn assert_contiguous_after(forecast: &ForecastSet, last_period: i32, horizon: usize) {
    let expected: Vec<i32> = (1..=horizon as i32).map(|h| last_period + h).collect();
    assert_eq!(forecast.periods(), expected);
    assert_eq!(forecast.len(), horizon);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn test_trend_seasonal_horizon_contiguity(#[case] horizon: usize) {
    let trained = TrendSeasonalForecaster::default()
        .train(&sample_series())
        .unwrap();
    let forecast = trained.forecast(horizon).unwrap();
    assert_eq!(trained.last_period(), 2021);
    assert_contiguous_after(&forecast, 2021, horizon);
    assert!(forecast.has_bounds());
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn test_sequence_horizon_contiguity(#[case] horizon: usize) {
    let trained = trained_sequence();
    let forecast = trained.forecast(horizon).unwrap();
    assert_contiguous_after(&forecast, 2021, horizon);
    assert!(!forecast.has_bounds());
    assert!(forecast.predicted_values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_zero_horizon_is_invalid() {
    let trained = TrendSeasonalForecaster::default()
        .train(&sample_series())
        .unwrap();
    assert!(matches!(
        trained.forecast(0),
        Err(ForecastError::InvalidParameter(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn trend_seasonal_bounds_bracket_estimate(
        counts in prop::collection::vec(0..2000_u64, 2..40),
        horizon in 1..8_usize,
        width in 0.5..0.99_f64,
    ) {
        let config = TrendSeasonalConfig {
            interval_width: width,
            ..TrendSeasonalConfig::default()
        };
        let series = PeriodSeries::new(1970, counts);
        let trained = TrendSeasonalForecaster::new(config).unwrap().train(&series).unwrap();
        let forecast = trained.forecast(horizon).unwrap();

        prop_assert_eq!(forecast.len(), horizon);
        for point in forecast.points() {
            let lower = point.lower_bound.unwrap();
            let upper = point.upper_bound.unwrap();
            prop_assert!(lower <= point.predicted_value);
            prop_assert!(point.predicted_value <= upper);
        }
    }
}

#[test]
fn test_wider_interval_gives_wider_bounds() {
    let narrow = TrendSeasonalConfig {
        interval_width: 0.5,
        ..TrendSeasonalConfig::default()
    };
    let wide = TrendSeasonalConfig {
        interval_width: 0.95,
        ..TrendSeasonalConfig::default()
    };
    let width = |config| {
        let forecast = TrendSeasonalForecaster::new(config)
            .unwrap()
            .train(&sample_series())
            .unwrap()
            .forecast(1)
            .unwrap();
        let p = forecast.points()[0];
        p.upper_bound.unwrap() - p.lower_bound.unwrap()
    };
    assert!(width(wide) > width(narrow));
}

#[test]
fn test_recursion_changes_later_steps_only() {
    let trained = trained_sequence();
    let baseline = trained.forecast(4).unwrap().predicted_values();

    let pinned = baseline[1] + 500.0;
    let scenario = trained
        .forecast_with_overrides(4, &[(1, pinned)])
        .unwrap()
        .predicted_values();

    // Earlier step untouched
    assert_eq!(scenario[0], baseline[0]);
    assert_relative_eq!(scenario[1], pinned, max_relative = 1e-9);
    // The pinned value is fed forward
    assert!((scenario[2] - baseline[2]).abs() > 1e-9);
}

#[test]
fn test_recursion_never_looks_backwards() {
    let trained = trained_sequence();
    let baseline = trained.forecast(5).unwrap().predicted_values();
    let scenario = trained
        .forecast_with_overrides(5, &[(3, 0.0)])
        .unwrap()
        .predicted_values();

    assert_eq!(&scenario[..3], &baseline[..3]);
    assert!((scenario[4] - baseline[4]).abs() > 1e-9);
}

#[test]
fn test_sequence_training_loss_recorded() {
    let trained = trained_sequence();
    let loss = trained.training_loss();
    assert_eq!(loss.len(), 20);
    assert!(loss.iter().all(|l| l.is_finite() && *l >= 0.0));
}

#[test]
fn test_sequence_insufficient_data() {
    let model = SequenceForecaster::new(SequenceConfig::default()).unwrap();
    let series = PeriodSeries::new(2019, vec![1, 2, 3, 4, 5]);
    let err = model.train(&series).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData { needed: 6, got: 5 }
    ));
}

#[test]
fn test_trend_seasonal_exposes_fit() {
    let trained = TrendSeasonalForecaster::default()
        .train(&sample_series())
        .unwrap();
    assert_eq!(trained.fitted_values().len(), 14);
    assert!(trained.residual_scale() > 0.0);
    let changepoints = trained.changepoints();
    assert!(!changepoints.is_empty());
    assert!(changepoints.iter().all(|&p| p > 2008 && p < 2021));
}
