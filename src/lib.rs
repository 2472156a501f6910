//! Crop Price Predictor Library
//!
//! This module exposes the core components of the price prediction pipeline
//! for testing and potential reuse: CSV loading, feature engineering, the
//! bagged-tree regressor and the JSON request handler.

pub mod config;
pub mod data;
pub mod ml;
pub mod request;
pub mod traits;

// Re-export commonly used types
pub use config::{AppConfig, DataConfig, ModelConfig};
pub use data::{load_observations, DataError, Observation, WeatherReading};
pub use ml::{
    season_for_month, train, FeatureVector, ForestParams, RandomForest, StandardScaler,
    TrainedModel, TrainingError, TrainingParams, FEATURE_NAMES, NUM_FEATURES,
};
pub use request::{
    handle_request, render_summary, respond, HorizonPrediction, PredictionRequest,
    PredictionResponse, RequestError,
};
pub use traits::{Clock, MockClock, SystemClock};
