//! Layered application configuration.
//!
//! Hard defaults reproduce the original pipeline exactly; a `config.toml`
//! next to the binary, one in the user config directory, or `CROP__`
//! environment variables can override them.

use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::ml::{ForestParams, TrainingParams};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Path to the historical CSV. Relative paths resolve against the
    /// executable's directory, not the working directory.
    pub path: PathBuf,
    /// Name of the target price column.
    pub target_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("testdata/Total.csv"),
            target_column: "tomato".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Chronological fraction of rows used for fitting.
    pub train_ratio: f64,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            train_ratio: 0.8,
            seed: 42,
        }
    }
}

impl From<&ModelConfig> for TrainingParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            forest: ForestParams {
                n_trees: config.n_trees,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
                seed: config.seed,
            },
            train_ratio: config.train_ratio,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crop-price-predictor");

        let builder = Config::builder()
            // 1. Defaults matching the original pipeline
            .set_default("data.path", "testdata/Total.csv")?
            .set_default("data.target_column", "tomato")?
            .set_default("model.n_trees", 200)?
            .set_default("model.max_depth", 15)?
            .set_default("model.min_samples_split", 5)?
            .set_default("model.min_samples_leaf", 2)?
            .set_default("model.train_ratio", 0.8)?
            .set_default("model.seed", 42)?
            // 2. Local config file (optional)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))
            // 3. User config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))
            // 4. Environment variables (CROP__MODEL__N_TREES=...)
            .add_source(Environment::with_prefix("CROP").separator("__"));

        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Training parameters derived from the model section.
    pub fn training_params(&self) -> TrainingParams {
        TrainingParams::from(&self.model)
    }

    /// The data file location with relative paths anchored at the
    /// executable's directory, so the default works from any working
    /// directory.
    pub fn data_path(&self) -> PathBuf {
        if self.data.path.is_absolute() {
            return self.data.path.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&self.data.path)))
            .unwrap_or_else(|| self.data.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_config_defaults() {
        let config = DataConfig::default();
        assert_eq!(config.path, PathBuf::from("testdata/Total.csv"));
        assert_eq!(config.target_column, "tomato");
    }

    #[test]
    fn test_model_config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.n_trees, 200);
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.min_samples_split, 5);
        assert_eq!(config.min_samples_leaf, 2);
        assert_eq!(config.train_ratio, 0.8);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_load_with_defaults() {
        let config = AppConfig::load().expect("config should load without files");

        assert_eq!(config.data.target_column, "tomato");
        assert_eq!(config.model.n_trees, 200);
    }

    #[test]
    fn test_training_params_mirror_model_section() {
        let config = AppConfig::load().expect("config should load");
        let params = config.training_params();

        assert_eq!(params.forest.n_trees, config.model.n_trees);
        assert_eq!(params.forest.max_depth, config.model.max_depth);
        assert_eq!(params.forest.seed, config.model.seed);
        assert_eq!(params.train_ratio, config.model.train_ratio);
    }

    #[test]
    fn test_data_path_resolves_relative_against_executable() {
        let config = AppConfig {
            data: DataConfig::default(),
            model: ModelConfig::default(),
        };

        let path = config.data_path();

        assert!(path.is_absolute());
        assert!(path.ends_with("testdata/Total.csv"));
    }

    #[test]
    fn test_data_path_keeps_absolute_paths() {
        let mut config = AppConfig {
            data: DataConfig::default(),
            model: ModelConfig::default(),
        };
        config.data.path = PathBuf::from("/var/data/prices.csv");

        assert_eq!(config.data_path(), PathBuf::from("/var/data/prices.csv"));
    }

    #[test]
    fn test_default_train_ratio_leaves_a_holdout() {
        let config = ModelConfig::default();
        assert!(config.train_ratio > 0.0 && config.train_ratio < 1.0);
    }
}
