//! Diabetes Risk Pipeline Library
//!
//! Trains a random forest on a labeled table of patient measurements and
//! classifies new records as low or high diabetes risk, reporting the
//! model's held-out accuracy alongside each result.

pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod types;

pub use crate::config::AppConfig;
pub use dataset::{LabeledDataset, LabeledRecord, Split};
pub use error::{PipelineError, PipelineResult};
pub use feature_extractor::FeatureExtractor;
pub use pipeline::TrainedModel;
pub use types::{FeatureRecord, RiskAssessment, RiskLabel};
