//! Feature engineering for price prediction.
//!
//! Turns the ordered observation sequence into the fixed 10-column feature
//! matrix the model is trained on. Column order is canonical: the same
//! `FeatureVector::to_vec` is used at training time and at prediction time.

use chrono::Datelike;

use crate::data::{Observation, WeatherReading};

/// Number of model input features.
pub const NUM_FEATURES: usize = 10;

/// Canonical feature order. Weather names keep the source column spelling.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "avg temp",
    "max temp",
    "min temp",
    "rainFall",
    "month",
    "day",
    "season",
    "temp_diff",
    "price_ma7",
    "price_ma30",
];

/// Trailing moving-average windows over the target price.
pub const MA_SHORT_WINDOW: usize = 7;
pub const MA_LONG_WINDOW: usize = 30;

/// Map a calendar month to its meteorological season:
/// spring (MAM) = 1, summer (JJA) = 2, autumn (SON) = 3, winter (DJF) = 4.
pub fn season_for_month(month: u32) -> u32 {
    match month {
        3..=5 => 1,
        6..=8 => 2,
        9..=11 => 3,
        _ => 4,
    }
}

/// The derived inputs for a single model row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub avg_temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub rainfall: f64,
    pub month: f64,
    pub day: f64,
    pub season: f64,
    pub temp_diff: f64,
    pub price_ma7: f64,
    pub price_ma30: f64,
}

impl FeatureVector {
    /// Assemble a feature vector from a weather reading and calendar
    /// position. Season and temperature spread are derived here so the
    /// training and prediction paths cannot diverge.
    pub fn assemble(
        weather: &WeatherReading,
        month: u32,
        day: u32,
        price_ma7: f64,
        price_ma30: f64,
    ) -> Self {
        Self {
            avg_temp: weather.avg_temp,
            max_temp: weather.max_temp,
            min_temp: weather.min_temp,
            rainfall: weather.rainfall,
            month: month as f64,
            day: day as f64,
            season: season_for_month(month) as f64,
            temp_diff: weather.max_temp - weather.min_temp,
            price_ma7,
            price_ma30,
        }
    }

    /// Flatten into the canonical column order of [`FEATURE_NAMES`].
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.avg_temp,
            self.max_temp,
            self.min_temp,
            self.rainfall,
            self.month,
            self.day,
            self.season,
            self.temp_diff,
            self.price_ma7,
            self.price_ma30,
        ]
    }
}

/// Build the feature matrix and target vector from chronologically ordered
/// observations. Applies the trailing moving averages and the backward fill
/// of empty cells; targets are the raw prices.
pub fn engineer_features(observations: &[Observation]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();

    let mut rows: Vec<Vec<f64>> = observations
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            FeatureVector::assemble(
                &obs.weather,
                obs.date.month(),
                obs.date.day(),
                trailing_mean(&prices, i, MA_SHORT_WINDOW),
                trailing_mean(&prices, i, MA_LONG_WINDOW),
            )
            .to_vec()
        })
        .collect();

    backward_fill(&mut rows);

    (rows, prices)
}

/// Trailing arithmetic mean of the up-to-`window` values ending at `index`,
/// inclusive. The window shrinks at the start of the series, so row 0's mean
/// is the row-0 value itself.
pub fn trailing_mean(values: &[f64], index: usize, window: usize) -> f64 {
    let start = (index + 1).saturating_sub(window);
    let slice = &values[start..=index];
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Fill NaN cells column-wise with the next valid value further down the
/// series. A trailing run of NaN has no later value and stays NaN, which the
/// trainer rejects before fitting.
fn backward_fill(rows: &mut [Vec<f64>]) {
    if rows.is_empty() {
        return;
    }
    let n_cols = rows[0].len();

    for col in 0..n_cols {
        let mut next_valid = f64::NAN;
        for row in rows.iter_mut().rev() {
            if row[col].is_nan() {
                row[col] = next_valid;
            } else {
                next_valid = row[col];
            }
        }
    }
}
