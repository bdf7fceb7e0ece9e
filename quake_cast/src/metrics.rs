//! Metrics for evaluating forecast accuracy

use crate::error::{ForecastError, Result};
use crate::models::ForecastSet;
use crate::series::PeriodSeries;
use serde::Serialize;

/// Point-forecast accuracy against actual counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Mean absolute error
    pub mean_absolute_error: f64,
    /// Root mean squared error
    pub root_mean_squared_error: f64,
    /// R² against the mean of the actuals; NaN for fewer than 2 points
    pub coefficient_of_determination: f64,
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Evaluation:")?;
        writeln!(f, "  MAE:   {:.4}", self.mean_absolute_error)?;
        writeln!(f, "  RMSE:  {:.4}", self.root_mean_squared_error)?;
        writeln!(f, "  R²:    {:.4}", self.coefficient_of_determination)?;
        Ok(())
    }
}

/// Scores forecasts against aligned actuals
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a forecast against actuals covering exactly the same periods.
    ///
    /// Alignment is the caller's job (see [`crate::utils::align`]); any
    /// difference in length or period keys is reported, never truncated.
    pub fn evaluate(&self, forecast: &ForecastSet, actual: &PeriodSeries) -> Result<EvaluationReport> {
        if forecast.len() != actual.len() || forecast.periods() != actual.periods() {
            return Err(ForecastError::MisalignedInput {
                forecast: forecast.len(),
                actual: actual.len(),
            });
        }
        self.evaluate_values(&forecast.predicted_values(), &actual.values())
    }

    /// Evaluate raw predicted values against raw actual values
    pub fn evaluate_values(&self, predicted: &[f64], actual: &[f64]) -> Result<EvaluationReport> {
        if predicted.len() != actual.len() {
            return Err(ForecastError::MisalignedInput {
                forecast: predicted.len(),
                actual: actual.len(),
            });
        }
        if actual.is_empty() {
            return Err(ForecastError::EmptyInput(
                "Nothing to evaluate".to_string(),
            ));
        }

        let n = actual.len() as f64;
        let errors: Vec<f64> = predicted
            .iter()
            .zip(actual)
            .map(|(p, a)| a - p)
            .collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let rmse = quake_math::stats::root_mean_square(&errors);

        Ok(EvaluationReport {
            mean_absolute_error: mae,
            root_mean_squared_error: rmse,
            coefficient_of_determination: r_squared(predicted, actual),
        })
    }
}

/// Coefficient of determination.
///
/// Constant actuals score 1.0 for a perfect forecast and 0.0 otherwise.
pub fn r_squared(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.len() < 2 || predicted.len() != actual.len() {
        return f64::NAN;
    }
    let mean = quake_math::stats::mean(actual);
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res = quake_math::stats::sum_squared_error(actual, predicted);

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_known_errors() {
        let report = Evaluator::new()
            .evaluate_values(&[12.0, 18.0, 33.0], &[10.0, 20.0, 30.0])
            .unwrap();
        assert_abs_diff_eq!(report.mean_absolute_error, 7.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.root_mean_squared_error, (17.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(report.coefficient_of_determination, 1.0 - 17.0 / 200.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point_has_undefined_r_squared() {
        let report = Evaluator::new().evaluate_values(&[5.0], &[7.0]).unwrap();
        assert_eq!(report.mean_absolute_error, 2.0);
        assert!(report.coefficient_of_determination.is_nan());
    }

    #[test]
    fn test_constant_actuals() {
        assert_eq!(r_squared(&[4.0, 4.0], &[4.0, 4.0]), 1.0);
        assert_eq!(r_squared(&[3.0, 5.0], &[4.0, 4.0]), 0.0);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            Evaluator::new().evaluate_values(&[], &[]),
            Err(ForecastError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_display() {
        let report = EvaluationReport {
            mean_absolute_error: 1.5,
            root_mean_squared_error: 2.0,
            coefficient_of_determination: 0.25,
        };
        let text = report.to_string();
        assert!(text.contains("MAE:   1.5000"));
        assert!(text.contains("R²:    0.2500"));
    }
}
