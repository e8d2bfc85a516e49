//! Feature extraction for model training and inference.
//!
//! Features are laid out in the column order of the reference dataset so
//! that a record submitted at inference time lines up with the training
//! matrix.

use crate::types::record::FeatureRecord;

/// Number of features per record.
pub const FEATURE_COUNT: usize = 8;

/// Feature names in dataset column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

/// Transforms records into classifier input vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the feature vector for one record.
    pub fn extract(&self, record: &FeatureRecord) -> Vec<f64> {
        vec![
            record.pregnancies as f64,
            record.glucose as f64,
            record.blood_pressure as f64,
            record.skin_thickness as f64,
            record.insulin as f64,
            record.bmi,
            record.diabetes_pedigree_function,
            record.age as f64,
        ]
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}
