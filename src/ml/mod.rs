//! Machine learning for market price prediction.
//!
//! The pipeline mirrors the data flow of the application: engineered
//! features are standardized, a bagged ensemble of regression trees is fit
//! on the chronologically first slice, and the holdout metrics are cached on
//! the resulting [`TrainedModel`] for the lifetime of the process.

pub mod features;
pub mod forest;
pub mod model;
pub mod scaler;
pub mod training;
pub mod tree;

pub use features::{season_for_month, FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use forest::{ForestParams, RandomForest};
pub use model::TrainedModel;
pub use scaler::StandardScaler;
pub use training::{train, TrainingError, TrainingParams};
