//! Held-out evaluation statistics for a trained model.

use serde::Serialize;
use tracing::info;

/// Binary confusion matrix, positive class = outcome 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally (predicted, actual) outcome pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut matrix = Self::default();
        for (predicted, actual) in pairs {
            matrix.record(predicted, actual);
        }
        matrix
    }

    pub fn record(&mut self, predicted: u8, actual: u8) {
        match (predicted == 1, actual == 1) {
            (true, true) => self.true_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Fraction of correct predictions (0.0 - 1.0); 0 for an empty matrix
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Text width inside the summary box borders
const SUMMARY_WIDTH: usize = 58;

/// Evaluation summary of a trained model over its held-out subset
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub classifier: &'static str,
    pub train_size: usize,
    pub test_size: usize,
    pub confusion: ConfusionMatrix,
    /// Accuracy as a percentage (0 - 100)
    pub accuracy_percent: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Out-of-bag accuracy (0.0 - 1.0) when the classifier bootstraps
    pub oob_score: Option<f64>,
    /// (feature name, normalized importance), most important first
    pub feature_importances: Vec<(&'static str, f64)>,
}

impl EvaluationReport {
    /// Boxed summary, one string per line, every line the same width
    pub fn summary_lines(&self) -> Vec<String> {
        let c = &self.confusion;
        let rule = "═".repeat(SUMMARY_WIDTH);
        let row = |text: String| format!("║ {:<width$} ║", text, width = SUMMARY_WIDTH - 2);

        let mut lines = vec![
            format!("╔{}╗", rule),
            row(format!(
                "{:^width$}",
                "DIABETES RISK MODEL - EVALUATION SUMMARY",
                width = SUMMARY_WIDTH - 2
            )),
            format!("╠{}╣", rule),
            row(format!(
                "Classifier: {:<16} Train: {:>5}  Test: {:>5}",
                self.classifier, self.train_size, self.test_size
            )),
            row(format!(
                "Accuracy: {:>6.2}%  Precision: {:>5.3}  Recall: {:>5.3}",
                self.accuracy_percent, self.precision, self.recall
            )),
            row(match self.oob_score {
                Some(oob) => format!(
                    "F1: {:>5.3}  Out-of-bag accuracy: {:>6.2}%",
                    self.f1,
                    oob * 100.0
                ),
                None => format!("F1: {:>5.3}", self.f1),
            }),
            format!("╠{}╣", rule),
            row("Confusion Matrix:     predicted 0   predicted 1".to_string()),
            row(format!(
                "  actual 0            {:>11}   {:>11}",
                c.true_negatives, c.false_positives
            )),
            row(format!(
                "  actual 1            {:>11}   {:>11}",
                c.false_negatives, c.true_positives
            )),
            format!("╠{}╣", rule),
            row("Feature Importances:".to_string()),
        ];

        for (name, importance) in &self.feature_importances {
            let bar = "█".repeat(((importance * 40.0) as usize).min(20));
            lines.push(row(format!("  {:<24} {:>6.3} {}", name, importance, bar)));
        }

        lines.push(format!("╚{}╝", rule));
        lines
    }

    /// Log the report as a boxed summary
    pub fn print_summary(&self) {
        for line in self.summary_lines() {
            info!("{}", line);
        }
    }
}
