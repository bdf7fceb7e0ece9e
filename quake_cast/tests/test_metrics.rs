use approx::assert_abs_diff_eq;
use quake_cast::metrics::Evaluator;
use quake_cast::models::ForecastSet;
use quake_cast::series::PeriodSeries;
use quake_cast::ForecastError;
use rstest::rstest;

#[test]
fn test_perfect_forecast_scores_exactly() {
    let forecast = ForecastSet::from_values(2022, &[10.0, 20.0, 30.0]);
    let actual = PeriodSeries::new(2022, vec![10, 20, 30]);

    let report = Evaluator::new().evaluate(&forecast, &actual).unwrap();

    assert_eq!(report.mean_absolute_error, 0.0);
    assert_eq!(report.root_mean_squared_error, 0.0);
    assert_eq!(report.coefficient_of_determination, 1.0);
}

#[test]
fn test_length_mismatch_is_misaligned() {
    let forecast = ForecastSet::from_values(2022, &[10.0, 20.0, 30.0]);
    let actual = PeriodSeries::new(2022, vec![10, 20]);

    let err = Evaluator::new().evaluate(&forecast, &actual).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::MisalignedInput {
            forecast: 3,
            actual: 2
        }
    ));
}

#[test]
fn test_shifted_periods_are_misaligned() {
    let forecast = ForecastSet::from_values(2023, &[10.0, 20.0]);
    let actual = PeriodSeries::new(2022, vec![10, 20]);

    assert!(matches!(
        Evaluator::new().evaluate(&forecast, &actual),
        Err(ForecastError::MisalignedInput { .. })
    ));
}

#[rstest]
#[case(&[12.0, 18.0], &[10.0, 20.0], 2.0, 2.0, 0.84)]
#[case(&[0.0, 0.0, 0.0, 0.0], &[1.0, 2.0, 3.0, 4.0], 2.5, 30.0_f64.sqrt() / 2.0, -5.0)]
fn test_known_values(
    #[case] predicted: &[f64],
    #[case] actual: &[f64],
    #[case] mae: f64,
    #[case] rmse: f64,
    #[case] r2: f64,
) {
    let report = Evaluator::new().evaluate_values(predicted, actual).unwrap();
    assert_abs_diff_eq!(report.mean_absolute_error, mae, epsilon = 1e-12);
    assert_abs_diff_eq!(report.root_mean_squared_error, rmse, epsilon = 1e-12);
    assert_abs_diff_eq!(report.coefficient_of_determination, r2, epsilon = 1e-12);
}

#[test]
fn test_single_point_r_squared_is_nan() {
    let forecast = ForecastSet::from_values(2022, &[5.0]);
    let actual = PeriodSeries::new(2022, vec![7]);
    let report = Evaluator::new().evaluate(&forecast, &actual).unwrap();
    assert_eq!(report.mean_absolute_error, 2.0);
    assert!(report.coefficient_of_determination.is_nan());
}
