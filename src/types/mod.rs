//! Type definitions for the risk pipeline

pub mod assessment;
pub mod record;

pub use assessment::{RiskAssessment, RiskLabel};
pub use record::FeatureRecord;
