//! Train-once, classify-many risk pipeline

use crate::config::{ModelConfig, SplitConfig};
use crate::dataset::{LabeledDataset, Split};
use crate::error::{PipelineError, PipelineResult};
use crate::feature_extractor::FeatureExtractor;
use crate::metrics::{ConfusionMatrix, EvaluationReport};
use crate::models::{build_classifier, Classifier};
use crate::types::assessment::{RiskAssessment, RiskLabel};
use crate::types::record::FeatureRecord;
use std::time::Instant;
use tracing::{debug, info};

/// A fitted classifier plus the held-out subset it is scored on.
///
/// Immutable once built; share it by reference across requests.
#[derive(Debug)]
pub struct TrainedModel {
    classifier: Box<dyn Classifier>,
    extractor: FeatureExtractor,
    split: Split,
    eval_features: Vec<Vec<f64>>,
    eval_labels: Vec<u8>,
}

impl TrainedModel {
    /// Split the dataset and fit the configured classifier on the training part.
    pub fn train(
        dataset: &LabeledDataset,
        split: &SplitConfig,
        model: &ModelConfig,
    ) -> PipelineResult<Self> {
        Self::with_classifier(dataset, split, build_classifier(model))
    }

    /// Split the dataset and fit a caller-supplied classifier.
    pub fn with_classifier(
        dataset: &LabeledDataset,
        split_config: &SplitConfig,
        mut classifier: Box<dyn Classifier>,
    ) -> PipelineResult<Self> {
        let test_ratio = split_config.test_ratio;
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(PipelineError::TrainingFailure(format!(
                "test ratio must be in (0, 1), got {}",
                test_ratio
            )));
        }

        let split = dataset.split(test_ratio, split_config.seed);
        if split.train.is_empty() || split.test.is_empty() {
            return Err(PipelineError::TrainingFailure(format!(
                "{} records cannot be split into non-empty train and evaluation subsets",
                dataset.len()
            )));
        }

        info!(
            train = split.train.len(),
            test = split.test.len(),
            seed = split_config.seed,
            "Dataset split"
        );

        let extractor = FeatureExtractor::new();
        let (train_features, train_labels) = Self::materialize(dataset, &split.train, &extractor);
        let (eval_features, eval_labels) = Self::materialize(dataset, &split.test, &extractor);

        let started = Instant::now();
        classifier.fit(&train_features, &train_labels)?;

        info!(
            classifier = classifier.name(),
            training_time_ms = started.elapsed().as_millis() as u64,
            "Classifier trained"
        );

        Ok(Self {
            classifier,
            extractor,
            split,
            eval_features,
            eval_labels,
        })
    }

    fn materialize(
        dataset: &LabeledDataset,
        indices: &[usize],
        extractor: &FeatureExtractor,
    ) -> (Vec<Vec<f64>>, Vec<u8>) {
        let records = dataset.records();
        indices
            .iter()
            .map(|&i| (extractor.extract(&records[i].record), records[i].outcome))
            .unzip()
    }

    /// Predicted outcome (0 or 1) for one record.
    pub fn classify(&self, record: &FeatureRecord) -> PipelineResult<u8> {
        record.validate()?;
        Ok(self.classifier.predict_one(&self.extractor.extract(record)))
    }

    /// Probability of the high-risk class for one record.
    pub fn high_risk_probability(&self, record: &FeatureRecord) -> PipelineResult<f64> {
        record.validate()?;
        Ok(self.classifier.predict_proba_one(&self.extractor.extract(record))[1])
    }

    /// Held-out accuracy as a percentage (0 - 100).
    pub fn evaluate(&self) -> f64 {
        self.confusion_matrix().accuracy() * 100.0
    }

    fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix::from_pairs(
            self.eval_features
                .iter()
                .zip(&self.eval_labels)
                .map(|(features, &actual)| (self.classifier.predict_one(features), actual)),
        )
    }

    /// Classify one record and package the result with the model accuracy.
    pub fn assess(&self, record: &FeatureRecord) -> PipelineResult<RiskAssessment> {
        record.validate()?;

        let features = self.extractor.extract(record);
        let proba = self.classifier.predict_proba_one(&features);
        let label = RiskLabel::from_outcome(self.classifier.predict_one(&features));
        let assessment = RiskAssessment::new(label, proba[1], self.evaluate());

        debug!(
            assessment_id = %assessment.assessment_id,
            label = %assessment.label,
            high_risk_probability = assessment.high_risk_probability,
            "Record assessed"
        );

        Ok(assessment)
    }

    /// Feature names with normalized importances, most important first.
    pub fn feature_importances(&self) -> Vec<(&'static str, f64)> {
        let mut ranking: Vec<(&'static str, f64)> = self
            .extractor
            .feature_names()
            .iter()
            .copied()
            .zip(self.classifier.feature_importances().iter().copied())
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Full evaluation over the held-out subset.
    pub fn evaluation_report(&self) -> EvaluationReport {
        let confusion = self.confusion_matrix();
        EvaluationReport {
            classifier: self.classifier.name(),
            train_size: self.split.train.len(),
            test_size: self.split.test.len(),
            confusion,
            accuracy_percent: confusion.accuracy() * 100.0,
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            oob_score: self.classifier.oob_score(),
            feature_importances: self.feature_importances(),
        }
    }

    /// Index partition fixed at construction.
    pub fn split(&self) -> &Split {
        &self.split
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierKind;
    use crate::dataset::LabeledRecord;

    /// Glucose above 140 marks the positive class, with one record in seven flipped.
    fn synthetic_dataset(n: usize) -> LabeledDataset {
        let records = (0..n)
            .map(|i| {
                let glucose = 60 + (i * 7919 % 140) as u32;
                let mut outcome = u8::from(glucose > 140);
                if i % 7 == 3 {
                    outcome = 1 - outcome;
                }
                LabeledRecord {
                    record: FeatureRecord {
                        pregnancies: (i % 9) as u32,
                        glucose,
                        blood_pressure: 50 + (i % 40) as u32,
                        bmi: 18.0 + (i % 25) as f64,
                        age: 21 + (i % 50) as u32,
                        ..Default::default()
                    },
                    outcome,
                }
            })
            .collect();
        LabeledDataset::from_records(records).unwrap()
    }

    fn small_forest() -> ModelConfig {
        ModelConfig {
            n_trees: 15,
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let dataset = synthetic_dataset(300);
        let model = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest()).unwrap();

        let first = model.evaluate();
        assert_eq!(first, model.evaluate());
        assert!((0.0..=100.0).contains(&first));

        let retrained =
            TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest()).unwrap();
        assert_eq!(first, retrained.evaluate());
    }

    #[test]
    fn test_split_partitions_dataset() {
        let dataset = synthetic_dataset(300);
        let model = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest()).unwrap();

        assert_eq!(model.split().test.len(), 60);
        assert_eq!(model.split().train.len(), 240);
    }

    #[test]
    fn test_classify_returns_binary_outcome() {
        let dataset = synthetic_dataset(300);
        let model = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest()).unwrap();

        for glucose in [0, 60, 120, 160, 200] {
            let record = FeatureRecord {
                glucose,
                ..Default::default()
            };
            let outcome = model.classify(&record).unwrap();
            assert!(outcome == 0 || outcome == 1);
        }

        let high = FeatureRecord {
            glucose: 195,
            ..Default::default()
        };
        assert!(model.high_risk_probability(&high).unwrap() > 0.5);
    }

    #[test]
    fn test_classify_rejects_invalid_input() {
        let dataset = synthetic_dataset(100);
        let model = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest()).unwrap();

        let record = FeatureRecord {
            bmi: -3.0,
            ..Default::default()
        };
        assert!(matches!(
            model.classify(&record),
            Err(PipelineError::InvalidInput { field: "bmi", .. })
        ));
        assert!(model.assess(&record).is_err());
    }

    #[test]
    fn test_assess_packages_accuracy() {
        let dataset = synthetic_dataset(300);
        let model = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest()).unwrap();

        let assessment = model.assess(&FeatureRecord::default()).unwrap();
        assert_eq!(assessment.accuracy_percent, model.evaluate());
        assert!((0.0..=1.0).contains(&assessment.high_risk_probability));
        assert_eq!(
            assessment.label.outcome(),
            model.classify(&FeatureRecord::default()).unwrap()
        );
    }

    #[test]
    fn test_report_ranks_glucose_first() {
        let dataset = synthetic_dataset(300);
        let model = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest()).unwrap();

        let report = model.evaluation_report();
        assert_eq!(report.classifier, "random_forest");
        assert_eq!(report.confusion.total(), 60);
        assert_eq!(report.accuracy_percent, model.evaluate());
        assert_eq!(report.feature_importances.len(), 8);
        assert_eq!(report.feature_importances[0].0, "Glucose");

        let oob = report.oob_score.unwrap();
        assert!((0.5..=1.0).contains(&oob));
    }

    #[test]
    fn test_decision_tree_pipeline() {
        let dataset = synthetic_dataset(200);
        let model_config = ModelConfig {
            classifier: ClassifierKind::DecisionTree,
            max_depth: Some(4),
            ..Default::default()
        };

        let model = TrainedModel::train(&dataset, &SplitConfig::default(), &model_config).unwrap();
        assert_eq!(model.classifier_name(), "decision_tree");
        assert!(model.evaluation_report().oob_score.is_none());
        assert!(model.evaluate() > 50.0);
    }

    #[test]
    fn test_single_class_dataset_fails_training() {
        let records = (0..50)
            .map(|i| LabeledRecord {
                record: FeatureRecord {
                    glucose: i,
                    ..Default::default()
                },
                outcome: 0,
            })
            .collect();
        let dataset = LabeledDataset::from_records(records).unwrap();

        let result = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest());
        assert!(matches!(result, Err(PipelineError::TrainingFailure(_))));
    }

    #[test]
    fn test_tiny_dataset_fails_training() {
        let dataset = synthetic_dataset(2);
        let result = TrainedModel::train(&dataset, &SplitConfig::default(), &small_forest());
        assert!(matches!(result, Err(PipelineError::TrainingFailure(_))));
    }
}
