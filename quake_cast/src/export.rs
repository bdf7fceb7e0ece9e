//! Delimited-text export of forecasts, reports and intermediate tables

use crate::data::EventRecord;
use crate::error::Result;
use crate::metrics::EvaluationReport;
use crate::models::ForecastSet;
use crate::series::PeriodSeries;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize)]
struct CountRow {
    period: i32,
    count: u64,
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    model: &'a str,
    mean_absolute_error: f64,
    root_mean_squared_error: f64,
    coefficient_of_determination: f64,
}

/// Write `period,predicted_value,lower_bound,upper_bound`; absent bounds are
/// empty cells
pub fn write_forecast_csv<P: AsRef<Path>>(path: P, forecast: &ForecastSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for point in forecast.points() {
        writer.serialize(point)?;
    }
    writer.flush()?;
    debug!(path = %path.as_ref().display(), rows = forecast.len(), "wrote forecast");
    Ok(())
}

/// Write one evaluation row per labelled report
pub fn write_report_csv<P: AsRef<Path>>(
    path: P,
    reports: &[(String, EvaluationReport)],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for (model, report) in reports {
        writer.serialize(ReportRow {
            model,
            mean_absolute_error: report.mean_absolute_error,
            root_mean_squared_error: report.root_mean_squared_error,
            coefficient_of_determination: report.coefficient_of_determination,
        })?;
    }
    writer.flush()?;
    debug!(path = %path.as_ref().display(), rows = reports.len(), "wrote evaluation");
    Ok(())
}

/// Write the annual series as `period,count`
pub fn write_series_csv<P: AsRef<Path>>(path: P, series: &PeriodSeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for (period, count) in series.pairs() {
        writer.serialize(CountRow { period, count })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write cleaned event records
pub fn write_events_csv<P: AsRef<Path>>(path: P, records: &[EventRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!(path = %path.as_ref().display(), rows = records.len(), "wrote events");
    Ok(())
}
