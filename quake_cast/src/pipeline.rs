//! Orchestration of one forecasting run
//!
//! The pipeline wires the components together and owns every side effect:
//! reading the catalogue, writing the exported tables. A forecaster that
//! fails for lack of data is logged and left out; any other failure ends
//! the run.

use crate::config::PipelineConfig;
use crate::data::{CatalogLoader, EventRecord, IngestSummary};
use crate::error::{ForecastError, Result};
use crate::export;
use crate::hybrid::{CombinedForecastSet, HybridCombiner, LabeledForecast};
use crate::metrics::{EvaluationReport, Evaluator};
use crate::models::sequence::SequenceForecaster;
use crate::models::trend_seasonal::TrendSeasonalForecaster;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::series::{PeriodSeries, TimeSeriesAggregator};
use crate::utils::{align, train_test_split};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TREND_SEASONAL_LABEL: &str = "trend_seasonal";
pub const SEQUENCE_LABEL: &str = "sequence";
pub const HYBRID_LABEL: &str = "hybrid";

/// Forecasts for the years after the full history
#[derive(Debug, Clone)]
pub struct ForecastRun {
    /// Individual model forecasts that succeeded
    pub forecasts: Vec<LabeledForecast>,
    /// Ensemble of `forecasts`
    pub combined: CombinedForecastSet,
}

/// Hold-out scores for each model and the ensemble
#[derive(Debug, Clone)]
pub struct EvaluationRun {
    pub train: PeriodSeries,
    pub test: PeriodSeries,
    /// Forecasts made from `train` only
    pub forecasts: Vec<LabeledForecast>,
    pub reports: Vec<(String, EvaluationReport)>,
}

/// Everything produced by [`ForecastPipeline::run_csv`]
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub summary: IngestSummary,
    pub records: Vec<EventRecord>,
    pub series: PeriodSeries,
    pub forecast: ForecastRun,
    pub evaluation: Option<EvaluationRun>,
}

impl PipelineOutput {
    /// Write every table into `dir`, creating it if needed.
    ///
    /// Returns the paths written.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let path = dir.join("cleaned_events.csv");
        export::write_events_csv(&path, &self.records)?;
        written.push(path);

        let path = dir.join("annual_counts.csv");
        export::write_series_csv(&path, &self.series)?;
        written.push(path);

        for labeled in &self.forecast.forecasts {
            let path = dir.join(format!("predicted_data_{}.csv", labeled.label));
            export::write_forecast_csv(&path, &labeled.forecast)?;
            written.push(path);
        }

        let path = dir.join("combined_forecast.csv");
        export::write_forecast_csv(&path, self.forecast.combined.forecast())?;
        written.push(path);

        if let Some(evaluation) = &self.evaluation {
            let path = dir.join("evaluation.csv");
            export::write_report_csv(&path, &evaluation.reports)?;
            written.push(path);
        }

        info!(dir = %dir.display(), files = written.len(), "exported results");
        Ok(written)
    }
}

/// Runs aggregation, both forecasters, the combiner and the evaluator
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: PipelineConfig,
    trend_seasonal: TrendSeasonalForecaster,
    sequence: SequenceForecaster,
}

impl ForecastPipeline {
    /// Create a pipeline, validating the configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let trend_seasonal = TrendSeasonalForecaster::new(config.trend_seasonal.clone())?;
        let sequence = SequenceForecaster::new(config.sequence.clone())?;
        Ok(Self {
            config,
            trend_seasonal,
            sequence,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a catalogue, forecast, and optionally evaluate on a hold-out
    pub fn run_csv<P: AsRef<Path>>(&self, path: P, evaluate: bool) -> Result<PipelineOutput> {
        let catalog = CatalogLoader::new(self.config.ingest.clone()).from_csv(path)?;
        let summary = catalog.summary();
        let records = catalog.into_records();

        let series = TimeSeriesAggregator::new().aggregate(&records)?;
        info!(
            first = ?series.first_period(),
            last = ?series.last_period(),
            periods = series.len(),
            "built annual series"
        );

        let forecast = self.forecast(&series)?;
        let evaluation = if evaluate {
            Some(self.evaluate(&series)?)
        } else {
            None
        };

        Ok(PipelineOutput {
            summary,
            records,
            series,
            forecast,
            evaluation,
        })
    }

    /// Forecast `horizon` years after the end of `series`
    pub fn forecast(&self, series: &PeriodSeries) -> Result<ForecastRun> {
        let forecasts = self.forecast_all(series, self.config.horizon)?;
        let combined = HybridCombiner::new().combine(&forecasts)?;
        Ok(ForecastRun {
            forecasts,
            combined,
        })
    }

    /// Fit on the years up to the cut-off and score the following years
    pub fn evaluate(&self, series: &PeriodSeries) -> Result<EvaluationRun> {
        let (train, test) =
            train_test_split(series, self.config.train_cutoff, self.config.evaluation_horizon)?;
        if test.is_empty() {
            return Err(ForecastError::EmptyInput(format!(
                "No periods after the cut-off {}",
                self.config.train_cutoff
            )));
        }

        let forecasts = self.forecast_all(&train, self.config.evaluation_horizon)?;
        let evaluator = Evaluator::new();
        let mut reports = Vec::with_capacity(forecasts.len() + 1);

        for labeled in &forecasts {
            if let Some(report) = skip_if_insufficient(&labeled.label, || {
                let (forecast, actual) = align(&labeled.forecast, &test)?;
                evaluator.evaluate(&forecast, &actual)
            })? {
                reports.push((labeled.label.clone(), report));
            }
        }

        if let Some(report) = skip_if_insufficient(HYBRID_LABEL, || {
            let combined = HybridCombiner::new().combine(&forecasts)?;
            let (forecast, actual) = align(combined.forecast(), &test)?;
            evaluator.evaluate(&forecast, &actual)
        })? {
            reports.push((HYBRID_LABEL.to_string(), report));
        }

        for (label, report) in &reports {
            info!(
                model = %label,
                mae = report.mean_absolute_error,
                rmse = report.root_mean_squared_error,
                r2 = report.coefficient_of_determination,
                "evaluated"
            );
        }

        Ok(EvaluationRun {
            train,
            test,
            forecasts,
            reports,
        })
    }

    fn forecast_all(&self, series: &PeriodSeries, horizon: usize) -> Result<Vec<LabeledForecast>> {
        let mut forecasts = Vec::with_capacity(2);
        if let Some(forecast) = run_model(&self.trend_seasonal, TREND_SEASONAL_LABEL, series, horizon)? {
            forecasts.push(forecast);
        }
        if let Some(forecast) = run_model(&self.sequence, SEQUENCE_LABEL, series, horizon)? {
            forecasts.push(forecast);
        }
        Ok(forecasts)
    }
}

/// Train `model` and forecast, treating data-sufficiency failures as a skip
fn run_model<M: ForecastModel>(
    model: &M,
    label: &str,
    series: &PeriodSeries,
    horizon: usize,
) -> Result<Option<LabeledForecast>> {
    let forecast = skip_if_insufficient(label, || {
        let trained = model.train(series)?;
        trained.forecast(horizon)
    })?;
    Ok(forecast.map(|forecast| {
        info!(model = label, periods = forecast.len(), "forecast produced");
        LabeledForecast::new(label, forecast)
    }))
}

fn skip_if_insufficient<T>(label: &str, step: impl FnOnce() -> Result<T>) -> Result<Option<T>> {
    match step() {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_data_sufficiency() => {
            warn!(model = label, error = %err, "skipped");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
