use pretty_assertions::assert_eq;
use quake_cast::hybrid::{HybridCombiner, LabeledForecast};
use quake_cast::models::{ForecastPoint, ForecastSet};
use quake_cast::ForecastError;

#[test]
fn test_averaging_uses_only_present_bounds() {
    let a = ForecastSet::new(vec![ForecastPoint::with_bounds(2022, 100.0, 90.0, 110.0)]).unwrap();
    let b = ForecastSet::from_values(2022, &[120.0]);

    let combined = HybridCombiner::new()
        .combine(&[
            LabeledForecast::new("trend_seasonal", a),
            LabeledForecast::new("sequence", b),
        ])
        .unwrap();

    assert_eq!(
        combined.points(),
        &[ForecastPoint::with_bounds(2022, 110.0, 90.0, 110.0)]
    );
    assert_eq!(
        combined.contributors(),
        &["trend_seasonal".to_string(), "sequence".to_string()]
    );
}

#[test]
fn test_bounds_default_to_estimate_when_nobody_supplies_them() {
    let a = ForecastSet::from_values(2022, &[100.0]);
    let b = ForecastSet::from_values(2022, &[120.0]);

    let combined = HybridCombiner::new()
        .combine(&[LabeledForecast::new("a", a), LabeledForecast::new("b", b)])
        .unwrap();

    assert_eq!(
        combined.points(),
        &[ForecastPoint::with_bounds(2022, 110.0, 110.0, 110.0)]
    );
}

#[test]
fn test_both_bounds_averaged() {
    let a = ForecastSet::new(vec![ForecastPoint::with_bounds(2030, 10.0, 8.0, 12.0)]).unwrap();
    let b = ForecastSet::new(vec![ForecastPoint::with_bounds(2030, 20.0, 14.0, 30.0)]).unwrap();

    let combined = HybridCombiner::new()
        .combine(&[LabeledForecast::new("a", a), LabeledForecast::new("b", b)])
        .unwrap();

    assert_eq!(
        combined.points(),
        &[ForecastPoint::with_bounds(2030, 15.0, 11.0, 21.0)]
    );
}

#[test]
fn test_inner_join_drops_unshared_periods() {
    let a = ForecastSet::from_values(2022, &[1.0, 2.0]);
    let b = ForecastSet::from_values(2023, &[4.0, 5.0]);

    let combined = HybridCombiner::new()
        .combine(&[LabeledForecast::new("a", a), LabeledForecast::new("b", b)])
        .unwrap();

    assert_eq!(combined.periods(), vec![2023]);
    assert_eq!(combined.points()[0].predicted_value, 3.0);
}

#[test]
fn test_three_inputs_keep_common_core() {
    let a = ForecastSet::from_values(2020, &[1.0, 1.0, 1.0, 1.0]);
    let b = ForecastSet::from_values(2021, &[2.0, 2.0, 2.0]);
    let c = ForecastSet::from_values(2019, &[3.0, 3.0, 3.0, 3.0]);

    let combined = HybridCombiner::new()
        .combine(&[
            LabeledForecast::new("a", a),
            LabeledForecast::new("b", b),
            LabeledForecast::new("c", c),
        ])
        .unwrap();

    assert_eq!(combined.periods(), vec![2021, 2022]);
    assert!(combined.points().iter().all(|p| p.predicted_value == 2.0));
}

#[test]
fn test_disjoint_inputs_have_no_overlap() {
    let a = ForecastSet::from_values(2022, &[1.0]);
    let b = ForecastSet::from_values(2030, &[1.0]);

    let result = HybridCombiner::new()
        .combine(&[LabeledForecast::new("a", a), LabeledForecast::new("b", b)]);
    assert!(matches!(result, Err(ForecastError::NoOverlap)));
}
