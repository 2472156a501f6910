//! Training pipeline: feature matrix, scaling, chronological split, forest
//! fit and the one-time holdout evaluation.

use thiserror::Error;

use crate::data::Observation;

use super::features::{engineer_features, FEATURE_NAMES};
use super::forest::{ForestParams, RandomForest};
use super::model::TrainedModel;
use super::scaler::StandardScaler;

/// Fewest observations accepted for a train/holdout split.
pub const MIN_TRAINING_ROWS: usize = 10;

/// Everything the trainer needs besides the data itself.
#[derive(Debug, Clone)]
pub struct TrainingParams {
    pub forest: ForestParams,
    /// Fraction of rows (chronologically first) used for fitting.
    pub train_ratio: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            forest: ForestParams::default(),
            train_ratio: 0.8,
        }
    }
}

/// Errors that can occur during model training.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("insufficient data for training: {0} rows (need at least {MIN_TRAINING_ROWS})")]
    InsufficientData(usize),

    #[error("train ratio {0} leaves no holdout rows")]
    EmptyHoldout(f64),

    #[error("feature '{column}' at row {row} is not a number after backward fill")]
    NonFinite { row: usize, column: String },
}

/// Fit the full pipeline on chronologically ordered observations.
///
/// The split is chronological: the first ceil(train_ratio · N) rows train
/// the forest, the remainder is evaluated exactly once for R² and RMSE.
pub fn train(
    observations: &[Observation],
    params: &TrainingParams,
) -> Result<TrainedModel, TrainingError> {
    let n = observations.len();
    if n < MIN_TRAINING_ROWS {
        return Err(TrainingError::InsufficientData(n));
    }

    let (rows, targets) = engineer_features(observations);
    check_finite(&rows)?;

    // The scaler is fit on the full matrix before the split, so holdout
    // statistics influence scaling. Kept from the original pipeline; see
    // DESIGN.md.
    let scaler = StandardScaler::fit(&rows);
    let scaled = scaler.transform(&rows);

    let train_size = split_index(n, params.train_ratio);
    if train_size >= n {
        return Err(TrainingError::EmptyHoldout(params.train_ratio));
    }

    let forest = RandomForest::fit(&scaled[..train_size], &targets[..train_size], &params.forest);

    let predictions = forest.predict(&scaled[train_size..]);
    let actuals = &targets[train_size..];
    let r2 = r_squared(&predictions, actuals);
    let rmse = root_mean_squared_error(&predictions, actuals);

    let price_mean = targets.iter().sum::<f64>() / n as f64;

    let mut importances: Vec<(String, f64)> = FEATURE_NAMES
        .iter()
        .map(|name| name.to_string())
        .zip(forest.importances().iter().copied())
        .collect();
    importances.sort_by(|a, b| b.1.total_cmp(&a.1));

    tracing::info!(
        train = train_size,
        holdout = n - train_size,
        "model trained: r2={r2:.4} rmse={rmse:.2}"
    );
    for (name, importance) in &importances {
        tracing::debug!("feature importance {name}: {importance:.4}");
    }

    Ok(TrainedModel::new(
        scaler,
        forest,
        r2,
        rmse,
        price_mean,
        importances,
        train_size,
        n - train_size,
    ))
}

/// First ceil(ratio · n) rows train, the rest is the holdout.
pub(crate) fn split_index(n: usize, ratio: f64) -> usize {
    (ratio * n as f64).ceil() as usize
}

fn check_finite(rows: &[Vec<f64>]) -> Result<(), TrainingError> {
    for (row, values) in rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(TrainingError::NonFinite {
                    row,
                    column: FEATURE_NAMES[col].to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Coefficient of determination. 1.0 is perfect; negative means worse than
/// predicting the holdout mean.
pub fn r_squared(predictions: &[f64], actuals: &[f64]) -> f64 {
    if actuals.is_empty() {
        return 0.0;
    }
    let mean = actuals.iter().sum::<f64>() / actuals.len() as f64;
    let ss_res: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actuals.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Root mean squared error, in target units.
pub fn root_mean_squared_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    if actuals.is_empty() {
        return 0.0;
    }
    let mse: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / actuals.len() as f64;
    mse.sqrt()
}
