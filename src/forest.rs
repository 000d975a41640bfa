use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random-forest regressor hyperparameters. Small by default: the feature
/// space is six trailing means, deeper forests only slow training down.
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 60,
            max_depth: 6,
            min_leaf: 4,
        }
    }
}

/// Bootstrap-aggregated variance-minimizing regression trees with mean
/// leaves. Training is fully determined by the seed: the same rows, params
/// and seed always produce the same forest.
#[derive(Debug, Clone)]
pub struct RegressionForest {
    trees: Vec<TreeNode>,
}

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl RegressionForest {
    /// Fit on `rows` (one feature slice per sample) against `targets`.
    /// Returns `None` when there is nothing to fit on; the caller decides
    /// whether that is an error.
    pub fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        params: &ForestParams,
        seed: u64,
    ) -> Option<RegressionForest> {
        if rows.is_empty() || rows.len() != targets.len() {
            return None;
        }

        let n_features = rows[0].len();
        if n_features == 0 {
            return None;
        }
        let features_per_split = ((n_features as f64).sqrt().ceil() as usize).max(1);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let n_samples = rows.len();
            let indices: Vec<usize> = (0..n_samples)
                .map(|_| rng.gen_range(0..n_samples))
                .collect();
            let boot_rows: Vec<&Vec<f64>> = indices.iter().map(|&i| &rows[i]).collect();
            let boot_targets: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();

            trees.push(build_tree(
                &boot_rows,
                &boot_targets,
                params.max_depth,
                params.min_leaf,
                features_per_split,
                &mut rng,
            ));
        }

        Some(RegressionForest { trees })
    }

    /// Mean of per-tree predictions.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| predict_tree(tree, features))
            .sum();
        sum / self.trees.len() as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

fn sum_squared_error(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum()
}

fn build_tree(
    rows: &[&Vec<f64>],
    targets: &[f64],
    depth_left: usize,
    min_leaf: usize,
    features_per_split: usize,
    rng: &mut StdRng,
) -> TreeNode {
    if depth_left == 0 || targets.len() < min_leaf.max(2) {
        return TreeNode::Leaf {
            value: mean(targets),
        };
    }

    let first = targets[0];
    if targets.iter().all(|&t| (t - first).abs() < 1e-10) {
        return TreeNode::Leaf { value: first };
    }

    let n_features = rows[0].len();
    let mut feature_indices: Vec<usize> = (0..n_features).collect();
    feature_indices.shuffle(rng);
    feature_indices.truncate(features_per_split);

    let parent_sse = sum_squared_error(targets);
    let mut best_sse = parent_sse;
    let mut best: Option<(usize, f64)> = None;

    for &feat_idx in &feature_indices {
        let mut values: Vec<f64> = rows.iter().map(|r| r[feat_idx]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        if values.len() < 2 {
            continue;
        }

        // Candidate thresholds at midpoints; subsample when the column has
        // many distinct values.
        let step = (values.len() / 16).max(1);
        for i in (0..values.len() - 1).step_by(step) {
            let threshold = (values[i] + values[i + 1]) / 2.0;
            let sse = split_sse(rows, targets, feat_idx, threshold);
            if sse < best_sse {
                best_sse = sse;
                best = Some((feat_idx, threshold));
            }
        }
    }

    let Some((feature_idx, threshold)) = best else {
        return TreeNode::Leaf {
            value: mean(targets),
        };
    };

    let mut left_rows = Vec::new();
    let mut left_targets = Vec::new();
    let mut right_rows = Vec::new();
    let mut right_targets = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if row[feature_idx] <= threshold {
            left_rows.push(*row);
            left_targets.push(targets[i]);
        } else {
            right_rows.push(*row);
            right_targets.push(targets[i]);
        }
    }

    if left_rows.is_empty() || right_rows.is_empty() {
        return TreeNode::Leaf {
            value: mean(targets),
        };
    }

    TreeNode::Split {
        feature_idx,
        threshold,
        left: Box::new(build_tree(
            &left_rows,
            &left_targets,
            depth_left - 1,
            min_leaf,
            features_per_split,
            rng,
        )),
        right: Box::new(build_tree(
            &right_rows,
            &right_targets,
            depth_left - 1,
            min_leaf,
            features_per_split,
            rng,
        )),
    }
}

fn split_sse(rows: &[&Vec<f64>], targets: &[f64], feature_idx: usize, threshold: f64) -> f64 {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if row[feature_idx] <= threshold {
            left.push(targets[i]);
        } else {
            right.push(targets[i]);
        }
    }
    if left.is_empty() || right.is_empty() {
        return f64::MAX;
    }
    sum_squared_error(&left) + sum_squared_error(&right)
}

fn predict_tree(node: &TreeNode, features: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
        } => {
            if features[*feature_idx] <= *threshold {
                predict_tree(left, features)
            } else {
                predict_tree(right, features)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_dataset(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        // target = 2 * x0 + noise-free offset from x1
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64, (i % 7) as f64, 3.0])
            .collect();
        let targets: Vec<f64> = rows.iter().map(|r| 2.0 * r[0] + 0.5 * r[1]).collect();
        (rows, targets)
    }

    #[test]
    fn constant_target_predicts_that_constant() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 1.0]).collect();
        let targets = vec![7.5; 20];
        let forest = RegressionForest::fit(&rows, &targets, &ForestParams::default(), 1).unwrap();
        let pred = forest.predict(&[3.0, 1.0]);
        assert!((pred - 7.5).abs() < 1e-9, "pred = {pred}");
    }

    #[test]
    fn same_seed_same_forest() {
        let (rows, targets) = linear_dataset(80);
        let params = ForestParams::default();
        let a = RegressionForest::fit(&rows, &targets, &params, 42).unwrap();
        let b = RegressionForest::fit(&rows, &targets, &params, 42).unwrap();
        for i in 0..80 {
            let x = vec![i as f64, (i % 7) as f64, 3.0];
            assert_eq!(a.predict(&x), b.predict(&x));
        }
    }

    #[test]
    fn learns_monotone_relationship() {
        let (rows, targets) = linear_dataset(120);
        let forest = RegressionForest::fit(&rows, &targets, &ForestParams::default(), 9).unwrap();
        let low = forest.predict(&[10.0, 3.0, 3.0]);
        let high = forest.predict(&[100.0, 3.0, 3.0]);
        assert!(high > low, "expected increasing prediction: {low} vs {high}");
    }

    #[test]
    fn empty_input_does_not_fit() {
        assert!(RegressionForest::fit(&[], &[], &ForestParams::default(), 0).is_none());
    }
}
