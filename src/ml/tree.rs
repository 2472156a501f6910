//! Regression tree used as the base learner of the forest.
//!
//! Splits minimize the sum of squared errors of the target. Candidate
//! thresholds are midpoints between consecutive distinct feature values,
//! found with a single sorted sweep per feature.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Per-tree growth limits.
#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of candidate features considered at each split.
    pub max_features: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted regression tree.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Total SSE reduction achieved by the split.
    sse_reduction: f64,
}

impl RegressionTree {
    /// Fit a tree on the rows selected by `sample` (indices into `x`/`y`,
    /// duplicates allowed for bootstrap samples).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        sample: &[usize],
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let mut importances = vec![0.0; n_features];

        let root = build_node(x, y, sample, 0, params, rng, &mut importances);

        // Normalize split contributions so they sum to 1 per tree.
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self { root, importances }
    }

    /// Predict the target for a single feature row.
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Normalized per-feature split contributions.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    /// Depth of the fitted tree (a lone leaf has depth 1).
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }
}

fn build_node(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
    importances: &mut [f64],
) -> Node {
    let n = indices.len();
    let mean = node_mean(y, indices);
    let sse = node_sse(y, indices, mean);

    if depth >= params.max_depth || n < params.min_samples_split || sse <= 1e-10 {
        return Node::Leaf { value: mean };
    }

    let Some(split) = find_best_split(x, y, indices, sse, params, rng) else {
        return Node::Leaf { value: mean };
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[i][split.feature] <= split.threshold);

    importances[split.feature] += split.sse_reduction;

    let left = build_node(x, y, &left_indices, depth + 1, params, rng, importances);
    let right = build_node(x, y, &right_indices, depth + 1, params, rng, importances);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Scan a random subset of features for the split with the largest SSE
/// reduction, honoring the minimum leaf size on both sides.
fn find_best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    node_sse: f64,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> Option<BestSplit> {
    let n = indices.len();
    let n_features = x.first().map(|r| r.len()).unwrap_or(0);

    let mut candidates: Vec<usize> = (0..n_features).collect();
    candidates.shuffle(rng);
    candidates.truncate(params.max_features.max(1));

    let mut best: Option<BestSplit> = None;

    for feature in candidates {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (x[i][feature], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Sweep split positions with running sums on the left side.
        let total_sum: f64 = pairs.iter().map(|(_, t)| t).sum();
        let total_sq: f64 = pairs.iter().map(|(_, t)| t * t).sum();
        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for k in 1..n {
            let (value, target) = pairs[k - 1];
            left_sum += target;
            left_sq += target * target;

            // No threshold separates equal feature values.
            if value == pairs[k].0 {
                continue;
            }
            if k < params.min_samples_leaf || n - k < params.min_samples_leaf {
                continue;
            }

            let n_left = k as f64;
            let n_right = (n - k) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let sse_left = left_sq - left_sum * left_sum / n_left;
            let sse_right = right_sq - right_sum * right_sum / n_right;
            let reduction = node_sse - sse_left - sse_right;

            if reduction > best.as_ref().map(|b| b.sse_reduction).unwrap_or(1e-10) {
                best = Some(BestSplit {
                    feature,
                    threshold: (value + pairs[k].0) / 2.0,
                    sse_reduction: reduction,
                });
            }
        }
    }

    best
}

fn node_mean(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn node_sse(y: &[f64], indices: &[usize], mean: f64) -> f64 {
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum()
}
