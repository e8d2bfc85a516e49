//! Labeled dataset loading and train/test partitioning

use crate::error::{PipelineError, PipelineResult};
use crate::types::record::FeatureRecord;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Reference resource compiled into the library.
const BUNDLED_CSV: &str = include_str!("../data/diabetes.csv");

/// One historical observation with its known outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledRecord {
    pub record: FeatureRecord,
    /// 0 = no diabetes, 1 = diabetes
    pub outcome: u8,
}

/// Row layout of the reference CSV resource.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Pregnancies")]
    pregnancies: u32,
    #[serde(rename = "Glucose")]
    glucose: u32,
    #[serde(rename = "BloodPressure")]
    blood_pressure: u32,
    #[serde(rename = "SkinThickness")]
    skin_thickness: u32,
    #[serde(rename = "Insulin")]
    insulin: u32,
    #[serde(rename = "BMI")]
    bmi: f64,
    #[serde(rename = "DiabetesPedigreeFunction")]
    diabetes_pedigree_function: f64,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Outcome")]
    outcome: u8,
}

impl CsvRow {
    fn into_labeled(self) -> LabeledRecord {
        LabeledRecord {
            record: FeatureRecord {
                pregnancies: self.pregnancies,
                glucose: self.glucose,
                blood_pressure: self.blood_pressure,
                skin_thickness: self.skin_thickness,
                insulin: self.insulin,
                bmi: self.bmi,
                diabetes_pedigree_function: self.diabetes_pedigree_function,
                age: self.age,
            },
            outcome: self.outcome,
        }
    }
}

/// Immutable ordered collection of labeled records.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    records: Vec<LabeledRecord>,
}

/// Index partition of a dataset into training and evaluation subsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl LabeledDataset {
    /// Build a dataset from records already in memory.
    pub fn from_records(records: Vec<LabeledRecord>) -> PipelineResult<Self> {
        if records.is_empty() {
            return Err(PipelineError::DataUnavailable(
                "dataset contains no records".to_string(),
            ));
        }

        for (row, labeled) in records.iter().enumerate() {
            // Row numbers are 1-based and skip the header line.
            let line = row + 2;
            if labeled.outcome > 1 {
                return Err(PipelineError::DataUnavailable(format!(
                    "line {}: outcome must be 0 or 1, got {}",
                    line, labeled.outcome
                )));
            }
            labeled.record.validate().map_err(|e| {
                PipelineError::DataUnavailable(format!("line {}: {}", line, e))
            })?;
        }

        Ok(Self { records })
    }

    /// Load the dataset from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading dataset");

        let file = File::open(path).map_err(|e| {
            PipelineError::DataUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;

        let dataset = Self::from_reader(file)?;
        dataset.log_loaded();
        Ok(dataset)
    }

    /// Load the reference dataset shipped inside the library.
    pub fn bundled() -> PipelineResult<Self> {
        info!(path = "data/diabetes.csv", "Loading bundled dataset");
        let dataset = Self::from_reader(BUNDLED_CSV.as_bytes())?;
        dataset.log_loaded();
        Ok(dataset)
    }

    fn log_loaded(&self) {
        let (negatives, positives) = self.class_counts();
        info!(
            records = self.len(),
            negatives = negatives,
            positives = positives,
            "Dataset loaded"
        );
    }

    /// Parse a CSV resource with a header row.
    ///
    /// Either every row parses or the whole load fails.
    pub fn from_reader<R: Read>(reader: R) -> PipelineResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = csv_reader
            .deserialize::<CsvRow>()
            .map(|row| row.map(CsvRow::into_labeled))
            .collect::<Result<Vec<_>, csv::Error>>()?;

        debug!(rows = records.len(), "Parsed dataset rows");
        Self::from_records(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&LabeledRecord> {
        self.records.get(index)
    }

    /// Count of (outcome 0, outcome 1) records.
    pub fn class_counts(&self) -> (usize, usize) {
        let positives = self.records.iter().filter(|r| r.outcome == 1).count();
        (self.records.len() - positives, positives)
    }

    /// Shuffle indices with a seeded RNG and reserve `round(test_ratio * n)`
    /// of them for evaluation.
    ///
    /// The same seed and record order always yield the same partition.
    pub fn split(&self, test_ratio: f64, seed: u64) -> Split {
        let n = self.records.len();
        let mut indices: Vec<usize> = (0..n).collect();

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test_size = ((test_ratio * n as f64).round() as usize).min(n);
        let train = indices.split_off(test_size);

        Split {
            train,
            test: indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome
6,148,72,35,0,33.6,0.627,50,1
1,85,66,29,0,26.6,0.351,31,0
8,183,64,0,0,23.3,0.672,32,1
1,89,66,23,94,28.1,0.167,21,0
0,137,40,35,168,43.1,2.288,33,1
";

    #[test]
    fn test_load_from_reader() {
        let dataset = LabeledDataset::from_reader(SAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.class_counts(), (2, 3));

        let first = dataset.get(0).unwrap();
        assert_eq!(first.record.glucose, 148);
        assert_eq!(first.record.bmi, 33.6);
        assert_eq!(first.outcome, 1);
    }

    #[test]
    fn test_missing_outcome_column_rejected() {
        let csv = "\
Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age
6,148,72,35,0,33.6,0.627,50
";
        let result = LabeledDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(PipelineError::DataUnavailable(_))));
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let csv = "\
Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome
6,high,72,35,0,33.6,0.627,50,1
";
        let result = LabeledDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(PipelineError::DataUnavailable(_))));
    }

    #[test]
    fn test_invalid_outcome_rejected() {
        let csv = "\
Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome
6,148,72,35,0,33.6,0.627,50,2
";
        let result = LabeledDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(PipelineError::DataUnavailable(_))));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let csv = "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome\n";
        let result = LabeledDataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(PipelineError::DataUnavailable(_))));
    }

    #[test]
    fn test_missing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = LabeledDataset::load(dir.path().join("absent.csv"));
        assert!(matches!(result, Err(PipelineError::DataUnavailable(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();

        let dataset = LabeledDataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 5);
    }

    #[test]
    fn test_bundled_dataset_matches_reference_shape() {
        let dataset = LabeledDataset::bundled().unwrap();
        assert_eq!(dataset.len(), 768);
        assert_eq!(dataset.class_counts(), (500, 268));
    }

    fn dataset_of(n: usize) -> LabeledDataset {
        let records = (0..n)
            .map(|i| LabeledRecord {
                record: FeatureRecord {
                    glucose: i as u32,
                    ..Default::default()
                },
                outcome: (i % 2) as u8,
            })
            .collect();
        LabeledDataset::from_records(records).unwrap()
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let dataset = dataset_of(768);
        let split = dataset.split(0.2, 0);

        assert_eq!(split.test.len(), 154); // round(0.2 * 768)
        assert_eq!(split.train.len(), 768 - 154);

        let train: HashSet<usize> = split.train.iter().copied().collect();
        let test: HashSet<usize> = split.test.iter().copied().collect();
        assert!(train.is_disjoint(&test));

        let union: HashSet<usize> = train.union(&test).copied().collect();
        assert_eq!(union.len(), 768);
        assert!(union.iter().all(|&i| i < 768));
    }

    #[test]
    fn test_split_rounds_to_nearest() {
        assert_eq!(dataset_of(11).split(0.2, 0).test.len(), 2); // 2.2
        assert_eq!(dataset_of(13).split(0.2, 0).test.len(), 3); // 2.6
    }

    #[test]
    fn test_split_is_deterministic() {
        let dataset = dataset_of(100);
        assert_eq!(dataset.split(0.2, 0), dataset.split(0.2, 0));
        assert_ne!(dataset.split(0.2, 0), dataset.split(0.2, 1));
    }
}
