//! CSV loading for historical price and weather observations.
//!
//! The source file is a UTF-8 table with a date column, the four weather
//! columns and a target price column. Rows whose price is exactly zero are
//! missing-data sentinels and are dropped on load.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date formats accepted in the source file, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// A single weather reading, as it appears both in the source file and in
/// prediction requests. Field names on the wire keep the original column
/// spelling (`"avg temp"`, `"rainFall"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    #[serde(rename = "avg temp")]
    pub avg_temp: f64,
    #[serde(rename = "max temp")]
    pub max_temp: f64,
    #[serde(rename = "min temp")]
    pub min_temp: f64,
    #[serde(rename = "rainFall")]
    pub rainfall: f64,
}

/// One historical row: date, weather and the observed market price.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub weather: WeatherReading,
    pub price: f64,
}

/// Errors raised while loading the historical data file.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open data file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read data file: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing from the data file")]
    MissingColumn(String),

    #[error("row {row}: unrecognized date '{value}'")]
    BadDate { row: usize, value: String },

    #[error("row {row}, column '{column}': invalid number '{value}'")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },
}

/// Load all observations from `path`, preserving file order.
///
/// Row order in the file is the time axis: the moving averages and the
/// chronological train/test split downstream both depend on it, so rows are
/// never reordered here. Rows with a zero or non-finite price are dropped.
pub fn load_observations(path: &Path, target_column: &str) -> Result<Vec<Observation>, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        if matches!(e.kind(), csv::ErrorKind::Io(_)) {
            DataError::Open {
                path: path.display().to_string(),
                source: std::io::Error::other(e.to_string()),
            }
        } else {
            DataError::Csv(e)
        }
    })?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };

    let date_idx = column("date")?;
    let avg_idx = column("avg temp")?;
    let max_idx = column("max temp")?;
    let min_idx = column("min temp")?;
    let rain_idx = column("rainFall")?;
    let price_idx = column(target_column)?;

    let mut observations = Vec::new();
    let mut dropped = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record?;

        let date_raw = record.get(date_idx).unwrap_or("").trim();
        let date = parse_date(date_raw).ok_or_else(|| DataError::BadDate {
            row,
            value: date_raw.to_string(),
        })?;

        let cell = |idx: usize, name: &str| -> Result<f64, DataError> {
            parse_cell(record.get(idx).unwrap_or(""), row, name)
        };

        let weather = WeatherReading {
            avg_temp: cell(avg_idx, "avg temp")?,
            max_temp: cell(max_idx, "max temp")?,
            min_temp: cell(min_idx, "min temp")?,
            rainfall: cell(rain_idx, "rainFall")?,
        };
        let price = cell(price_idx, target_column)?;

        // Zero marks a day without a recorded price.
        if price == 0.0 || !price.is_finite() {
            dropped += 1;
            continue;
        }

        observations.push(Observation {
            date,
            weather,
            price,
        });
    }

    tracing::info!(
        kept = observations.len(),
        dropped,
        "loaded historical observations from {}",
        path.display()
    );

    Ok(observations)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parse a numeric cell. Empty cells become NaN and are left to the
/// feature engineering stage's backward fill.
fn parse_cell(raw: &str, row: usize, column: &str) -> Result<f64, DataError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| DataError::BadNumber {
        row,
        column: column.to_string(),
        value: trimmed.to_string(),
    })
}
