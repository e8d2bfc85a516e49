//! CART decision tree for binary classification

use super::classifier::{check_training_data, Classifier};
use crate::error::PipelineResult;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for feature sampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 0,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Class probabilities `[p(0), p(1)]`
        class_probs: [f64; 2],
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        n_samples: usize,
        impurity: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn class_probs(&self, features: &[f64]) -> [f64; 2] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { class_probs, .. } => return *class_probs,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if features[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Best split found for one node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Weighted impurity decrease, `n * gini - n_l * gini_l - n_r * gini_r`
    decrease: f64,
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Train on the rows selected by `indices`.
    ///
    /// Indices may repeat, which is how bootstrap samples are passed in.
    pub(crate) fn fit_indices(&mut self, features: &[Vec<f64>], labels: &[u8], indices: &[usize]) {
        let n_features = features.first().map(|r| r.len()).unwrap_or(0);
        self.feature_importances = vec![0.0; n_features];

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let root = self.build_tree(features, labels, indices, 0, &mut rng);
        self.root = Some(root);

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    fn build_tree(
        &mut self,
        features: &[Vec<f64>],
        labels: &[u8],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let counts = class_counts(labels, indices);
        let impurity = gini(counts);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || impurity < 1e-12
        {
            return leaf(counts);
        }

        let Some(best) = self.find_best_split(features, labels, indices, counts, rng) else {
            return leaf(counts);
        };

        self.feature_importances[best.feature_idx] += best.decrease;

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| features[i][best.feature_idx] <= best.threshold);

        let left = self.build_tree(features, labels, &left_idx, depth + 1, rng);
        let right = self.build_tree(features, labels, &right_idx, depth + 1, rng);

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            n_samples: n,
            impurity,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Sweep each sampled feature in sorted order, keeping running class
    /// counts so every threshold is scored in constant time.
    fn find_best_split(
        &self,
        features: &[Vec<f64>],
        labels: &[u8],
        indices: &[usize],
        counts: [usize; 2],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = features[indices[0]].len();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);

        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let parent = n as f64 * gini(counts);

        let mut best: Option<SplitCandidate> = None;
        let mut order: Vec<usize> = indices.to_vec();
        let mut visited = 0;

        // Features that are constant within the node do not count toward
        // `max_features`; sampling continues until enough usable ones are seen.
        for &feature_idx in &feature_indices {
            if visited == max_features {
                break;
            }

            order.sort_by(|&a, &b| features[a][feature_idx].total_cmp(&features[b][feature_idx]));
            if features[order[0]][feature_idx] >= features[order[n - 1]][feature_idx] {
                continue;
            }
            visited += 1;

            let mut left = [0usize; 2];
            for k in 0..n - 1 {
                left[labels[order[k]] as usize] += 1;

                let value = features[order[k]][feature_idx];
                let next = features[order[k + 1]][feature_idx];
                if value >= next {
                    continue;
                }

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right = [counts[0] - left[0], counts[1] - left[1]];
                let decrease =
                    parent - n_left as f64 * gini(left) - n_right as f64 * gini(right);

                if best.as_ref().map_or(true, |b| decrease > b.decrease) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        decrease,
                    });
                }
            }
        }

        best
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> PipelineResult<()> {
        check_training_data(features, labels)?;
        let indices: Vec<usize> = (0..features.len()).collect();
        self.fit_indices(features, labels, &indices);
        Ok(())
    }

    fn predict_proba_one(&self, features: &[f64]) -> [f64; 2] {
        match &self.root {
            Some(node) => node.class_probs(features),
            None => [0.5, 0.5],
        }
    }

    fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }
}

fn class_counts(labels: &[u8], indices: &[usize]) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for &i in indices {
        counts[labels[i] as usize] += 1;
    }
    counts
}

fn gini(counts: [usize; 2]) -> f64 {
    let n = (counts[0] + counts[1]) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p = counts[1] as f64 / n;
    2.0 * p * (1.0 - p)
}

fn leaf(counts: [usize; 2]) -> TreeNode {
    let n = counts[0] + counts[1];
    let class_probs = if n == 0 {
        [0.5, 0.5]
    } else {
        [counts[0] as f64 / n as f64, counts[1] as f64 / n as f64]
    };
    TreeNode::Leaf {
        class_probs,
        n_samples: n,
    }
}
