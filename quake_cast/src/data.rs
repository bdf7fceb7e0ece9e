//! Seismic catalogue ingestion
//!
//! This is the boundary between raw tabular data and the forecasting core.
//! The core only ever needs an event's `timestamp`; the other attributes are
//! carried along for exports and exploration.

use crate::config::IngestConfig;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// One cleaned seismic event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Time of the event
    pub timestamp: DateTime<Utc>,
    /// Epicentre latitude in degrees
    pub latitude: Option<f64>,
    /// Epicentre longitude in degrees
    pub longitude: Option<f64>,
    /// Hypocentre depth in km
    pub depth: Option<f64>,
    /// Event magnitude
    pub magnitude: Option<f64>,
    /// Human readable location
    pub place: Option<String>,
}

impl EventRecord {
    /// Create a record carrying only a timestamp
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            latitude: None,
            longitude: None,
            depth: None,
            magnitude: None,
            place: None,
        }
    }
}

/// Row counts observed while cleaning a catalogue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Rows in the raw table
    pub rows_read: usize,
    /// Rows dropped because a required column was empty
    pub missing_required: usize,
    /// Rows dropped because the time could not be parsed
    pub unparseable_time: usize,
    /// Exact duplicates removed
    pub duplicates: usize,
}

/// Cleaned records together with what the cleaning removed
#[derive(Debug, Clone)]
pub struct EventCatalog {
    records: Vec<EventRecord>,
    summary: IngestSummary,
}

impl EventCatalog {
    /// Cleaned records in source order
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Consume the catalogue, keeping only the records
    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }

    /// Cleaning statistics
    pub fn summary(&self) -> IngestSummary {
        self.summary
    }

    /// Number of cleaned records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing survived cleaning
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loader for seismic catalogues
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    config: IngestConfig,
}

impl CatalogLoader {
    /// Create a loader with the given cleaning rules
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Load and clean a catalogue from a CSV file
    pub fn from_csv<P: AsRef<Path>>(&self, path: P) -> Result<EventCatalog> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        self.from_dataframe(df)
    }

    /// Clean an existing DataFrame
    pub fn from_dataframe(&self, mut df: DataFrame) -> Result<EventCatalog> {
        let normalized: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| normalize_column_name(name))
            .collect();
        df.set_column_names(&normalized)?;

        let excluded: Vec<String> = self
            .config
            .excluded_columns
            .iter()
            .map(|name| normalize_column_name(name))
            .filter(|name| normalized.contains(name))
            .collect();
        if !excluded.is_empty() {
            debug!(columns = ?excluded, "dropping excluded columns");
            df = df.drop_many(&excluded);
        }

        let time_column = normalize_column_name(&self.config.time_column);
        if df.column(&time_column).is_err() {
            return Err(ForecastError::DataError(format!(
                "Time column '{}' not found in catalogue",
                time_column
            )));
        }

        let height = df.height();
        let mut summary = IngestSummary {
            rows_read: height,
            ..IngestSummary::default()
        };

        let mut keep = vec![true; height];
        for name in &self.config.required_columns {
            let name = normalize_column_name(name);
            if let Ok(column) = df.column(&name) {
                for (row, is_null) in column.is_null().into_iter().enumerate() {
                    if is_null == Some(true) {
                        keep[row] = false;
                    }
                }
            }
        }

        let times = utf8_column(&df, &time_column)?;
        let latitudes = f64_column(&df, "latitude")?;
        let longitudes = f64_column(&df, "longitude")?;
        let depths = f64_column(&df, "depth")?;
        let magnitudes = f64_column(&df, "mag")?;
        let places = utf8_column(&df, "place")?;

        let mut records = Vec::with_capacity(height);
        for row in 0..height {
            if !keep[row] {
                summary.missing_required += 1;
                continue;
            }
            let Some(timestamp) = times[row].as_deref().and_then(parse_timestamp) else {
                summary.unparseable_time += 1;
                continue;
            };
            records.push(EventRecord {
                timestamp,
                latitude: latitudes[row],
                longitude: longitudes[row],
                depth: depths[row],
                magnitude: magnitudes[row],
                place: places[row].clone(),
            });
        }

        if self.config.fill_depth_with_median {
            let known: Vec<f64> = records.iter().filter_map(|r| r.depth).collect();
            if !known.is_empty() {
                let median = quake_math::stats::median(&known);
                for record in records.iter_mut().filter(|r| r.depth.is_none()) {
                    record.depth = Some(median);
                }
            }
        }

        for record in records.iter_mut().filter(|r| r.place.is_none()) {
            record.place = Some(self.config.unknown_place.clone());
        }

        if self.config.drop_duplicates {
            let before = records.len();
            let mut seen = HashSet::with_capacity(before);
            records.retain(|r| seen.insert(dedup_key(r)));
            summary.duplicates = before - records.len();
        }

        info!(
            rows_read = summary.rows_read,
            kept = records.len(),
            missing_required = summary.missing_required,
            unparseable_time = summary.unparseable_time,
            duplicates = summary.duplicates,
            "catalogue cleaned"
        );

        Ok(EventCatalog { records, summary })
    }
}

/// Lower-case a column name and replace spaces with underscores
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Parse the timestamp formats found in seismic catalogues.
///
/// Returns `None` for anything unparseable; such rows are excluded.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Read a column as optional strings; a missing column is all `None`
fn utf8_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    match df.column(name) {
        Ok(column) => {
            let cast = column.cast(&DataType::Utf8)?;
            Ok(cast
                .utf8()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect())
        }
        Err(_) => Ok(vec![None; df.height()]),
    }
}

/// Read a column as optional floats; a missing column is all `None`
fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    match df.column(name) {
        Ok(column) => {
            let cast = column.cast(&DataType::Float64).map_err(|e| {
                ForecastError::DataError(format!(
                    "Column '{}' cannot be converted to f64: {}",
                    name, e
                ))
            })?;
            Ok(cast.f64()?.into_iter().collect())
        }
        Err(_) => Ok(vec![None; df.height()]),
    }
}

type DedupKey = (
    DateTime<Utc>,
    Option<u64>,
    Option<u64>,
    Option<u64>,
    Option<u64>,
    Option<String>,
);

fn dedup_key(record: &EventRecord) -> DedupKey {
    (
        record.timestamp,
        record.latitude.map(f64::to_bits),
        record.longitude.map(f64::to_bits),
        record.depth.map(f64::to_bits),
        record.magnitude.map(f64::to_bits),
        record.place.clone(),
    )
}
