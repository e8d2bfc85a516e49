//! Configuration management for the risk pipeline

use anyhow::{bail, Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Classifier used by the pipeline
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Bagged ensemble of decision trees with soft voting
    #[default]
    RandomForest,
    /// Single CART tree, mostly useful as a baseline
    DecisionTree,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub split: SplitConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// Training resource location
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file with the 8 feature columns and `Outcome`; the bundled
    /// reference resource is used when absent
    pub path: Option<String>,
}

/// Train/evaluation partitioning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of records held out for evaluation
    pub test_ratio: f64,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 0,
        }
    }
}

/// Classifier hyperparameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub classifier: ClassifierKind,
    /// Number of trees (random forest only)
    pub n_trees: usize,
    /// Maximum tree depth, unbounded when absent
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; floor(sqrt(n)) for forests when absent
    pub max_features: Option<usize>,
    /// Bootstrap sampling (random forest only)
    pub bootstrap: bool,
    /// Seed for bagging and feature sampling
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::RandomForest,
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

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Default configuration file location
    pub const DEFAULT_PATH: &'static str = "config/config.toml";

    /// Load configuration from the default file, falling back to built-in
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        if Path::new(Self::DEFAULT_PATH).exists() {
            Self::load_from_path(Self::DEFAULT_PATH)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a usable model.
    pub fn validate(&self) -> Result<()> {
        if !(self.split.test_ratio > 0.0 && self.split.test_ratio < 1.0) {
            bail!(
                "split.test_ratio must be in (0, 1), got {}",
                self.split.test_ratio
            );
        }
        if self.model.classifier == ClassifierKind::RandomForest && self.model.n_trees == 0 {
            bail!("model.n_trees must be at least 1");
        }
        if self.model.min_samples_split < 2 {
            bail!("model.min_samples_split must be at least 2");
        }
        if self.model.min_samples_leaf < 1 {
            bail!("model.min_samples_leaf must be at least 1");
        }
        if self.model.max_features == Some(0) {
            bail!("model.max_features must be at least 1");
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => bail!("logging.format must be `json` or `pretty`, got `{}`", other),
        }
    }
}
