//! Bootstrap-aggregated regression trees
//!
//! A small random forest over the three demand features. Trees split on the
//! variance reduction of the target and fitting is fully deterministic for a
//! fixed seed, so retraining on identical data reproduces the same model
//! bit for bit.

use crate::error::{DemandError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Number of input features: weekday, hour, weather score.
pub const FEATURE_COUNT: usize = 3;

/// A node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal split: rows with `feature <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Leaf holding the mean target of the training rows that reached it.
    Leaf { value: f64 },
}

impl TreeNode {
    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// Forest fitting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of bootstrapped trees.
    pub trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum number of rows on each side of a split.
    pub min_leaf: usize,
    /// RNG seed for the bootstrap samples.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 10,
            min_leaf: 1,
            seed: 42,
        }
    }
}

/// Trained regression forest. Prediction is the mean over all trees and
/// cannot fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    trees: Vec<TreeNode>,
}

impl ForestRegressor {
    /// Fit a forest to `rows` and `targets`.
    pub fn fit(
        rows: &[[f64; FEATURE_COUNT]],
        targets: &[f64],
        params: &ForestParams,
    ) -> Result<Self> {
        if params.trees == 0 {
            return Err(DemandError::InvalidParameter(
                "Forest needs at least one tree".to_string(),
            ));
        }
        if rows.is_empty() {
            return Err(DemandError::TrainingError(
                "No training rows".to_string(),
            ));
        }
        if rows.len() != targets.len() {
            return Err(DemandError::TrainingError(format!(
                "Row count ({}) doesn't match target count ({})",
                rows.len(),
                targets.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.trees);
        for _ in 0..params.trees {
            let sample: Vec<usize> = (0..rows.len())
                .map(|_| rng.gen_range(0..rows.len()))
                .collect();
            trees.push(grow_tree(rows, targets, &sample, 0, params));
        }

        Ok(Self { trees })
    }

    /// Predicted target for one feature row: the mean over all trees.
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Number of trees in the forest.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn mean(targets: &[f64], subset: &[usize]) -> f64 {
    let sum: f64 = subset.iter().map(|&i| targets[i]).sum();
    sum / subset.len() as f64
}

/// Sum of squared errors around the subset mean.
fn sse(targets: &[f64], subset: &[usize]) -> f64 {
    let m = mean(targets, subset);
    subset.iter().map(|&i| (targets[i] - m).powi(2)).sum()
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    score: f64,
}

fn grow_tree(
    rows: &[[f64; FEATURE_COUNT]],
    targets: &[f64],
    subset: &[usize],
    depth: usize,
    params: &ForestParams,
) -> TreeNode {
    let leaf = TreeNode::Leaf {
        value: mean(targets, subset),
    };
    if depth >= params.max_depth || subset.len() < 2 * params.min_leaf.max(1) {
        return leaf;
    }

    let parent_sse = sse(targets, subset);
    if parent_sse <= f64::EPSILON {
        // All targets identical: nothing left to explain.
        return leaf;
    }

    let mut best: Option<BestSplit> = None;
    for feature in 0..FEATURE_COUNT {
        let mut values: Vec<f64> = subset.iter().map(|&i| rows[i][feature]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = subset
                .iter()
                .copied()
                .partition(|&i| rows[i][feature] <= threshold);
            if left.len() < params.min_leaf || right.len() < params.min_leaf {
                continue;
            }
            let score = sse(targets, &left) + sse(targets, &right);
            if best.as_ref().map_or(true, |b| score < b.score) {
                best = Some(BestSplit {
                    feature,
                    threshold,
                    left,
                    right,
                    score,
                });
            }
        }
    }

    match best {
        Some(split) if split.score < parent_sse => TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(grow_tree(rows, targets, &split.left, depth + 1, params)),
            right: Box::new(grow_tree(rows, targets, &split.right, depth + 1, params)),
        },
        _ => leaf,
    }
}
