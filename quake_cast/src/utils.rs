//! Utility functions for the quake_cast crate

use crate::error::{ForecastError, Result};
use crate::models::{ForecastPoint, ForecastSet};
use crate::series::PeriodSeries;

/// Split a series at `cutoff`.
///
/// The training part holds every period up to and including `cutoff`; the
/// test part holds at most `horizon` periods after it. A test part shorter
/// than `horizon` is returned as is.
pub fn train_test_split(
    series: &PeriodSeries,
    cutoff: i32,
    horizon: usize,
) -> Result<(PeriodSeries, PeriodSeries)> {
    let train = series.until(cutoff);
    if train.is_empty() {
        return Err(ForecastError::EmptyInput(format!(
            "No periods at or before {}",
            cutoff
        )));
    }
    let last_test = cutoff.saturating_add(i32::try_from(horizon).unwrap_or(i32::MAX));
    let test = series.between(cutoff + 1, last_test);
    Ok((train, test))
}

/// Restrict a forecast and the actual counts to their shared periods.
///
/// Both inputs are contiguous, so the shared periods are too. Fails with
/// [`ForecastError::MisalignedInput`] when nothing is shared.
pub fn align(forecast: &ForecastSet, actual: &PeriodSeries) -> Result<(ForecastSet, PeriodSeries)> {
    let misaligned = || ForecastError::MisalignedInput {
        forecast: forecast.len(),
        actual: actual.len(),
    };
    let (Some(f_first), Some(a_first), Some(a_last)) = (
        forecast.periods().first().copied(),
        actual.first_period(),
        actual.last_period(),
    ) else {
        return Err(misaligned());
    };
    let f_last = f_first + forecast.len() as i32 - 1;

    let start = f_first.max(a_first);
    let end = f_last.min(a_last);
    if start > end {
        return Err(misaligned());
    }

    let points: Vec<ForecastPoint> = forecast
        .points()
        .iter()
        .filter(|p| p.period >= start && p.period <= end)
        .copied()
        .collect();
    Ok((ForecastSet::new(points)?, actual.between(start, end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_cutoff() {
        let series = PeriodSeries::new(2015, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let (train, test) = train_test_split(&series, 2021, 3).unwrap();
        assert_eq!(train.last_period(), Some(2021));
        assert_eq!(train.len(), 7);
        assert_eq!(test.pairs(), vec![(2022, 8), (2023, 9), (2024, 10)]);
    }

    #[test]
    fn test_split_with_short_test_part() {
        let series = PeriodSeries::new(2015, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let (_, test) = train_test_split(&series, 2021, 3).unwrap();
        assert_eq!(test.periods(), vec![2022]);
    }

    #[test]
    fn test_split_before_history_fails() {
        let series = PeriodSeries::new(2015, vec![1, 2]);
        assert!(train_test_split(&series, 2000, 3).is_err());
    }

    #[test]
    fn test_align_keeps_shared_periods() {
        let forecast = ForecastSet::from_values(2022, &[1.0, 2.0, 3.0]);
        let actual = PeriodSeries::new(2020, vec![5, 5, 5, 5]);
        let (f, a) = align(&forecast, &actual).unwrap();
        assert_eq!(f.periods(), vec![2022, 2023]);
        assert_eq!(a.periods(), vec![2022, 2023]);
    }

    #[test]
    fn test_align_without_overlap_fails() {
        let forecast = ForecastSet::from_values(2030, &[1.0]);
        let actual = PeriodSeries::new(2020, vec![5, 5]);
        assert!(matches!(
            align(&forecast, &actual),
            Err(ForecastError::MisalignedInput { forecast: 1, actual: 2 })
        ));
    }
}
