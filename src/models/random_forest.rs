//! Random Forest implementation

use super::classifier::{check_training_data, Classifier};
use super::decision_tree::{DecisionTree, TreeConfig};
use crate::error::PipelineResult;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unbounded)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (floor of sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 0,
        }
    }
}

/// Random Forest model with soft voting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
    oob_score_value: Option<f64>,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_importances: Vec::new(),
            oob_score_value: None,
        }
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Per-tree RNG. Trees draw from independent streams so the fitted
    /// forest does not depend on how rayon schedules them.
    fn tree_rng(&self, tree_idx: usize) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(tree_idx as u64))
    }

    fn bootstrap_indices(rng: &mut ChaCha8Rng, n: usize) -> Vec<usize> {
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }

    /// Sample indices and tree seed for one tree, regenerated identically
    /// for the out-of-bag pass.
    fn tree_plan(&self, tree_idx: usize, n: usize) -> (Vec<usize>, u64) {
        let mut rng = self.tree_rng(tree_idx);
        let indices = if self.config.bootstrap {
            Self::bootstrap_indices(&mut rng, n)
        } else {
            (0..n).collect()
        };
        (indices, rng.gen())
    }

    fn calculate_oob_score(&mut self, features: &[Vec<f64>], labels: &[u8]) {
        let n = features.len();
        let mut votes: Vec<[f64; 2]> = vec![[0.0, 0.0]; n];
        let mut seen = vec![false; n];

        for (tree_idx, tree) in self.trees.iter().enumerate() {
            let (indices, _) = self.tree_plan(tree_idx, n);
            let mut in_bag = vec![false; n];
            for i in indices {
                in_bag[i] = true;
            }

            for i in (0..n).filter(|&i| !in_bag[i]) {
                let proba = tree.predict_proba_one(&features[i]);
                votes[i][0] += proba[0];
                votes[i][1] += proba[1];
                seen[i] = true;
            }
        }

        let scored: Vec<usize> = (0..n).filter(|&i| seen[i]).collect();
        if scored.is_empty() {
            self.oob_score_value = None;
            return;
        }

        let correct = scored
            .iter()
            .filter(|&&i| {
                let predicted = if votes[i][1] > votes[i][0] { 1 } else { 0 };
                predicted == labels[i]
            })
            .count();

        self.oob_score_value = Some(correct as f64 / scored.len() as f64);
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> PipelineResult<()> {
        let n_features = check_training_data(features, labels)?;
        let n = features.len();

        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features);

        // Build trees in parallel
        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let (indices, tree_seed) = self.tree_plan(i, n);
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: tree_seed,
                });
                tree.fit_indices(features, labels, &indices);
                tree
            })
            .collect();

        self.trees = trees;

        // Aggregate feature importances
        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        if self.config.bootstrap {
            self.calculate_oob_score(features, labels);
        }

        debug!(
            trees = self.trees.len(),
            max_features = max_features,
            oob_score = ?self.oob_score_value,
            "Random forest fitted"
        );

        Ok(())
    }

    fn predict_proba_one(&self, features: &[f64]) -> [f64; 2] {
        if self.trees.is_empty() {
            return [0.5, 0.5];
        }

        let mut total = [0.0, 0.0];
        for tree in &self.trees {
            let proba = tree.predict_proba_one(features);
            total[0] += proba[0];
            total[1] += proba[1];
        }

        let n = self.trees.len() as f64;
        [total[0] / n, total[1] / n]
    }

    fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Available after a bootstrapped fit
    fn oob_score(&self) -> Option<f64> {
        self.oob_score_value
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}
