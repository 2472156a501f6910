//! Bagged ensemble of regression trees.
//!
//! Each tree is fit on a bootstrap sample and considers √(n_features)
//! candidate features per split. Tree construction is parallelized with
//! rayon; each tree gets its own seeded RNG so fits are reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::tree::{RegressionTree, TreeParams};

/// Forest hyperparameters.
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

/// A fitted random forest regressor.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Fit `params.n_trees` trees on bootstrap samples of `x`/`y`.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Self {
        let n_samples = x.len();
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: sqrt_features(n_features),
        };

        let trees: Vec<RegressionTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let sample: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                RegressionTree::fit(x, y, &sample, &tree_params, &mut rng)
            })
            .collect();

        // Average per-tree contributions, then renormalize.
        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, &imp) in importances.iter_mut().zip(tree.importances()) {
                *total += imp;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }

        Self { trees, importances }
    }

    /// Predict a single row: the mean of all tree predictions.
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict a batch of rows.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.par_iter().map(|r| self.predict_one(r)).collect()
    }

    /// Normalized per-feature importances (summing to 1 when any split
    /// happened).
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// √(feature count) candidate features per split, truncated, at least 1.
fn sqrt_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt() as usize).max(1)
}
