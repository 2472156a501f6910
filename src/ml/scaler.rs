//! Per-feature standardization (z-score scaling).

/// A fitted standard scaler: per-column mean and scale.
///
/// Fit once, then `transform` applies the stored statistics without ever
/// re-fitting, so prediction-time inputs are scaled exactly like the
/// training matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and standard deviations on `rows`.
    ///
    /// Uses the population standard deviation. Columns with (near) zero
    /// variance get a scale of 1.0 and pass through centered but unscaled.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let n = rows.len() as f64;

        let mut means = vec![0.0; n_cols];
        let mut scales = vec![1.0; n_cols];

        if rows.is_empty() {
            return Self { means, scales };
        }

        for col in 0..n_cols {
            let mean = rows.iter().map(|r| r[col]).sum::<f64>() / n;
            let variance = rows.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();

            means[col] = mean;
            if std > 1e-12 {
                scales[col] = std;
            }
        }

        Self { means, scales }
    }

    /// Scale a single row with the fitted statistics.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }

    /// Scale a whole matrix with the fitted statistics.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_centers_and_scales() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0]];

        let scaler = StandardScaler::fit(&rows);
        let scaled = scaler.transform(&rows);

        let mean: f64 = scaled.iter().map(|r| r[0]).sum::<f64>() / 3.0;
        let var: f64 = scaled.iter().map(|r| r[0].powi(2)).sum::<f64>() / 3.0;

        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(var, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_variance_column_is_centered_only() {
        let rows = vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0]];

        let scaler = StandardScaler::fit(&rows);
        let scaled = scaler.transform(&rows);

        // Constant column: centered to 0, no division blow-up.
        assert!(scaled.iter().all(|r| r[0] == 0.0));
        assert!(scaled.iter().all(|r| r[1].is_finite()));
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 30.0], vec![5.0, 50.0]];
        let scaler = StandardScaler::fit(&rows);

        let single = scaler.transform_row(&rows[1]);
        let matrix = scaler.transform(&rows);

        assert_eq!(single, matrix[1]);
    }

    #[test]
    fn test_transform_uses_fitted_stats_for_new_rows() {
        let rows = vec![vec![0.0], vec![10.0]];
        let scaler = StandardScaler::fit(&rows);

        // Mean 5, std 5: an unseen value of 20 scales to 3.
        let scaled = scaler.transform_row(&[20.0]);
        assert_relative_eq!(scaled[0], 3.0);
    }

    #[test]
    fn test_empty_fit() {
        let scaler = StandardScaler::fit(&[]);
        assert_eq!(scaler.n_features(), 0);
    }
}
