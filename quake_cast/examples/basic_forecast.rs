use chrono::{Duration, TimeZone, Utc};
use quake_cast::config::{Activation, SequenceConfig};
use quake_cast::hybrid::{HybridCombiner, LabeledForecast};
use quake_cast::metrics::Evaluator;
use quake_cast::models::sequence::SequenceForecaster;
use quake_cast::models::trend_seasonal::TrendSeasonalForecaster;
use quake_cast::models::{ForecastModel, TrainedForecastModel};
use quake_cast::series::TimeSeriesAggregator;
use quake_cast::utils::{align, train_test_split};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Quake Cast: Basic Forecasting Example");
    println!("=====================================\n");

    // Synthetic catalogue: a slowly rising event rate with a quiet year
    let mut timestamps = Vec::new();
    for (offset, count) in [38, 41, 45, 0, 47, 52, 50, 55, 58, 57, 61, 64, 66, 63, 70]
        .iter()
        .enumerate()
    {
        let start = Utc.with_ymd_and_hms(2009 + offset as i32, 1, 1, 0, 0, 0).unwrap();
        for i in 0..*count {
            timestamps.push(start + Duration::hours(i as i64 * 100));
        }
    }

    let series = TimeSeriesAggregator::new().aggregate_timestamps(timestamps)?;
    println!("Annual counts: {:?}\n", series.pairs());

    let (train, test) = train_test_split(&series, 2020, 3)?;

    let trend_model = TrendSeasonalForecaster::default();
    let sequence_model = SequenceForecaster::new(SequenceConfig {
        window: 4,
        hidden_units: 16,
        epochs: 80,
        batch_size: 8,
        learning_rate: 0.01,
        seed: 42,
        activation: Activation::Tanh,
    })?;

    let trend = trend_model.train(&train)?.forecast(3)?;
    let sequence = sequence_model.train(&train)?.forecast(3)?;

    println!("Trend/seasonal forecast:");
    for p in trend.points() {
        println!(
            "  {}: {:.1} [{:.1}, {:.1}]",
            p.period,
            p.predicted_value,
            p.lower_bound.unwrap_or(f64::NAN),
            p.upper_bound.unwrap_or(f64::NAN)
        );
    }
    println!("Sequence forecast: {:?}\n", sequence.predicted_values());

    let combined = HybridCombiner::new().combine(&[
        LabeledForecast::new("trend_seasonal", trend.clone()),
        LabeledForecast::new("sequence", sequence.clone()),
    ])?;

    let evaluator = Evaluator::new();
    for (label, forecast) in [
        ("trend_seasonal", &trend),
        ("sequence", &sequence),
        ("hybrid", combined.forecast()),
    ] {
        let (forecast, actual) = align(forecast, &test)?;
        let report = evaluator.evaluate(&forecast, &actual)?;
        println!("[{}]\n{}", label, report);
    }

    Ok(())
}
