//! Classifier capability shared by the tree models

use crate::error::{PipelineError, PipelineResult};
use std::fmt::Debug;

/// A binary classifier over dense numeric feature rows.
///
/// Labels are 0 or 1. Probabilities are `[p(0), p(1)]`.
pub trait Classifier: Debug + Send + Sync {
    /// Fit the model on a feature matrix and its labels.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> PipelineResult<()>;

    /// Class probabilities for one feature row.
    fn predict_proba_one(&self, features: &[f64]) -> [f64; 2];

    /// Predicted label for one feature row. Ties resolve to class 0.
    fn predict_one(&self, features: &[f64]) -> u8 {
        let proba = self.predict_proba_one(features);
        if proba[1] > proba[0] {
            1
        } else {
            0
        }
    }

    /// Normalized impurity-based importance per feature column.
    fn feature_importances(&self) -> &[f64];

    /// Out-of-bag accuracy (0.0 - 1.0) for models trained on bootstrap samples.
    fn oob_score(&self) -> Option<f64> {
        None
    }

    /// Short model name for logs
    fn name(&self) -> &'static str;
}

/// Reject training data that cannot produce a binary classifier.
pub(crate) fn check_training_data(features: &[Vec<f64>], labels: &[u8]) -> PipelineResult<usize> {
    if features.is_empty() {
        return Err(PipelineError::TrainingFailure(
            "training set is empty".to_string(),
        ));
    }
    if features.len() != labels.len() {
        return Err(PipelineError::TrainingFailure(format!(
            "{} feature rows but {} labels",
            features.len(),
            labels.len()
        )));
    }

    let n_features = features[0].len();
    if n_features == 0 {
        return Err(PipelineError::TrainingFailure(
            "feature rows are empty".to_string(),
        ));
    }
    if let Some(row) = features.iter().position(|r| r.len() != n_features) {
        return Err(PipelineError::TrainingFailure(format!(
            "row {} has {} features, expected {}",
            row,
            features[row].len(),
            n_features
        )));
    }
    if let Some(bad) = labels.iter().find(|&&l| l > 1) {
        return Err(PipelineError::TrainingFailure(format!(
            "label {} is not binary",
            bad
        )));
    }

    let positives = labels.iter().filter(|&&l| l == 1).count();
    if positives == 0 || positives == labels.len() {
        return Err(PipelineError::TrainingFailure(
            "training set contains a single outcome class".to_string(),
        ));
    }

    Ok(n_features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_class_rejected() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![1, 1];
        assert!(matches!(
            check_training_data(&features, &labels),
            Err(PipelineError::TrainingFailure(_))
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0];
        assert!(check_training_data(&features, &labels).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let features = vec![vec![1.0, 2.0], vec![2.0]];
        let labels = vec![0, 1];
        assert!(check_training_data(&features, &labels).is_err());
    }

    #[test]
    fn test_valid_data_accepted() {
        let features = vec![vec![1.0, 0.0], vec![2.0, 1.0]];
        let labels = vec![0, 1];
        assert_eq!(check_training_data(&features, &labels).unwrap(), 2);
    }
}
