//! Tree-based classifiers for risk prediction

pub mod classifier;
pub mod decision_tree;
pub mod random_forest;

pub use classifier::Classifier;
pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use random_forest::{ForestConfig, RandomForest};

use crate::config::{ClassifierKind, ModelConfig};

/// Build an unfitted classifier from configuration.
pub fn build_classifier(config: &ModelConfig) -> Box<dyn Classifier> {
    match config.classifier {
        ClassifierKind::RandomForest => Box::new(RandomForest::new(ForestConfig {
            n_trees: config.n_trees,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
            bootstrap: config.bootstrap,
            seed: config.seed,
        })),
        ClassifierKind::DecisionTree => Box::new(DecisionTree::new(TreeConfig {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
            seed: config.seed,
        })),
    }
}
