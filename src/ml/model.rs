//! The trained model value shared by every prediction call.

use crate::data::WeatherReading;

use super::features::FeatureVector;
use super::forest::RandomForest;
use super::scaler::StandardScaler;

/// An immutable fitted model: scaler, forest and the one-time holdout
/// metrics. Constructed once at startup and only read afterwards; nothing is
/// persisted across process runs.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    scaler: StandardScaler,
    forest: RandomForest,
    /// Holdout R², computed exactly once and repeated verbatim in every
    /// prediction response.
    pub r2: f64,
    /// Holdout root mean squared error, in price units.
    pub rmse: f64,
    /// Dataset-wide mean price. Stands in for both trailing moving averages
    /// when predicting unseen dates, which have no trailing history.
    pub price_mean: f64,
    /// Per-feature importances, sorted descending. Diagnostics only.
    pub importances: Vec<(String, f64)>,
    pub training_samples: usize,
    pub holdout_samples: usize,
}

impl TrainedModel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scaler: StandardScaler,
        forest: RandomForest,
        r2: f64,
        rmse: f64,
        price_mean: f64,
        importances: Vec<(String, f64)>,
        training_samples: usize,
        holdout_samples: usize,
    ) -> Self {
        Self {
            scaler,
            forest,
            r2,
            rmse,
            price_mean,
            importances,
            training_samples,
            holdout_samples,
        }
    }

    /// Predict the market price for a weather reading on the given calendar
    /// date. The feature vector is assembled in the training column order,
    /// scaled with the fitted scaler and clamped at a floor of zero.
    pub fn predict_price(&self, weather: &WeatherReading, month: u32, day: u32) -> f64 {
        let features =
            FeatureVector::assemble(weather, month, day, self.price_mean, self.price_mean);
        let scaled = self.scaler.transform_row(&features.to_vec());
        self.forest.predict_one(&scaled).max(0.0)
    }

    /// One-line description for logging.
    pub fn info(&self) -> String {
        format!(
            "TrainedModel(train={}, holdout={}, r2={:.4}, rmse={:.2}, trees={})",
            self.training_samples,
            self.holdout_samples,
            self.r2,
            self.rmse,
            self.forest.n_trees()
        )
    }
}
